use serde::Serialize;
use tokio::sync::broadcast;

use super::models::{Column, Issue, RepoScope};
use crate::errors::WriteOperation;

/// Capacity of the board event channel.
pub const EVENT_CAPACITY: usize = 256;

/// Changes to Board State, for a rendering layer to follow.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum BoardEvent {
    /// The board was cleared for a new scope (or no scope).
    ScopeChanged {
        scope: Option<RepoScope>,
    },
    /// A refresh replaced the whole board.
    BoardReplaced {
        total: usize,
    },
    IssueMoved {
        number: u64,
        from: Column,
        to: Column,
    },
    IssueCreated {
        issue: Issue,
    },
    IssueUpdated {
        issue: Issue,
    },
    WriteFailed {
        operation: WriteOperation,
        number: Option<u64>,
        message: String,
    },
}

/// Send to every subscriber. Having none is not an error.
pub fn broadcast_event(tx: &broadcast::Sender<BoardEvent>, event: BoardEvent) {
    let _ = tx.send(event);
}
