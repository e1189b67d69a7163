//! Credential/session layer: holds the authenticated client handle the engine
//! pulls from. The engine never sees a token, only `Option<Arc<dyn IssueTracker>>`.

use std::sync::{Arc, PoisonError, RwLock};

use super::github::{ClientOptions, GitHubClient, GitHubUser, IssueTracker, is_valid_github_token};
use crate::errors::BoardError;

const INVALID_TOKEN_MESSAGE: &str = "Invalid token. Please check and try again.";

/// Factory yielding the current authenticated client, or `None` when signed out.
pub trait ClientSource: Send + Sync {
    fn client(&self) -> Option<Arc<dyn IssueTracker>>;
}

/// A fixed handle, mostly for tests and one-shot commands.
impl ClientSource for Option<Arc<dyn IssueTracker>> {
    fn client(&self) -> Option<Arc<dyn IssueTracker>> {
        self.clone()
    }
}

pub struct Session {
    options: ClientOptions,
    handle: RwLock<Option<Arc<dyn IssueTracker>>>,
    user: RwLock<Option<GitHubUser>>,
}

impl Session {
    pub fn new(options: ClientOptions) -> Self {
        Self {
            options,
            handle: RwLock::new(None),
            user: RwLock::new(None),
        }
    }

    /// Build a `GitHubClient` for `token` and verify it against the remote.
    pub async fn connect(&self, token: &str) -> Result<GitHubUser, BoardError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(BoardError::InvalidInput("token is empty".into()));
        }
        if !is_valid_github_token(token) {
            tracing::warn!("Token does not have a known GitHub prefix; trying it anyway");
        }

        let client = GitHubClient::new(token, &self.options).map_err(|e| {
            tracing::warn!(error = %e, "Failed to build HTTP client");
            BoardError::Fetch("Failed to verify token.".into())
        })?;
        self.connect_with(Arc::new(client)).await
    }

    /// Verify an already-built tracker and adopt it as the session handle.
    pub async fn connect_with(
        &self,
        tracker: Arc<dyn IssueTracker>,
    ) -> Result<GitHubUser, BoardError> {
        match tracker.authenticated_user().await {
            Ok(user) => {
                tracing::info!(login = %user.login, "Signed in");
                *self.handle.write().unwrap_or_else(PoisonError::into_inner) = Some(tracker);
                *self.user.write().unwrap_or_else(PoisonError::into_inner) = Some(user.clone());
                Ok(user)
            }
            Err(e) if e.is_unauthorized() => {
                self.disconnect();
                Err(BoardError::Auth(INVALID_TOKEN_MESSAGE.into()))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token verification failed");
                self.disconnect();
                Err(BoardError::Fetch("Failed to verify token.".into()))
            }
        }
    }

    pub fn disconnect(&self) {
        *self.handle.write().unwrap_or_else(PoisonError::into_inner) = None;
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn user(&self) -> Option<GitHubUser> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.handle
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl ClientSource for Session {
    fn client(&self) -> Option<Arc<dyn IssueTracker>> {
        self.handle
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
