//! Typed error hierarchy for the board engine.
//!
//! Transport failures are `TrackerError` (see `board::github`). Everything the
//! engine surfaces to a caller is a `BoardError`, whose display string names the
//! failed high-level operation rather than the raw transport detail.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::board::github::TrackerError;

const AUTH_MESSAGE: &str = "GitHub rejected the credentials. Re-authenticate and try again.";
const FETCH_MESSAGE: &str = "Failed to fetch issues.";

/// The remote write that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOperation {
    Move,
    Create,
    Update,
}

impl WriteOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for WriteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse error classification, stable for matching in tests and UIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Auth,
    Fetch,
    Write,
    LabelConflict,
    InvalidInput,
}

/// Errors surfaced by the board engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// Credential invalid or expired; the caller must re-authenticate.
    #[error("{0}")]
    Auth(String),

    /// Listing or paginating the remote collection failed. Board state is untouched.
    #[error("{0}")]
    Fetch(String),

    /// A create/update/move write failed. Optimistic move state is not reverted.
    #[error("{message}")]
    Write {
        operation: WriteOperation,
        number: Option<u64>,
        message: String,
    },

    /// A label the bootstrapper tried to create already exists.
    #[error("Label '{0}' already exists")]
    LabelConflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl BoardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth(_) => ErrorKind::Auth,
            Self::Fetch(_) => ErrorKind::Fetch,
            Self::Write { .. } => ErrorKind::Write,
            Self::LabelConflict(_) => ErrorKind::LabelConflict,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }

    pub fn auth() -> Self {
        Self::Auth(AUTH_MESSAGE.to_string())
    }

    /// Classify a transport failure that happened while fetching issues.
    pub fn fetch(err: &TrackerError) -> Self {
        Self::fetch_with(FETCH_MESSAGE, err)
    }

    /// Like [`BoardError::fetch`], for other listings ("Failed to fetch repositories.").
    pub fn fetch_with(message: &str, err: &TrackerError) -> Self {
        if err.is_unauthorized() {
            Self::auth()
        } else {
            Self::Fetch(message.to_string())
        }
    }

    /// Classify a transport failure that happened during a remote write.
    pub fn write(operation: WriteOperation, number: Option<u64>, err: &TrackerError) -> Self {
        if err.is_unauthorized() {
            return Self::auth();
        }
        let message = match (operation, number) {
            (WriteOperation::Move, Some(n)) => format!(
                "Failed to move issue #{}. The move may not have persisted; refresh the board.",
                n
            ),
            (WriteOperation::Move, None) => {
                "Failed to move issue. The move may not have persisted; refresh the board."
                    .to_string()
            }
            (WriteOperation::Create, _) => "Failed to create issue.".to_string(),
            (WriteOperation::Update, Some(n)) => format!("Failed to update issue #{}.", n),
            (WriteOperation::Update, None) => "Failed to update issue.".to_string(),
        };
        Self::Write {
            operation,
            number,
            message,
        }
    }
}
