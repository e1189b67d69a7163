//! Kanban board over GitHub issues.
//!
//! ## Overview
//!
//! GitHub has no notion of a column. A card's position is derived from a
//! `kanban:<column>` label on the issue, and moving a card is a label rewrite
//! on the remote. This module keeps a local board that responds instantly and
//! converges on what GitHub confirms.
//!
//! ## Module Map
//!
//! ```text
//! ┌───────────┐ client() ┌──────────────────────────────────────────────────┐
//! │ session   │ ───────> │  engine.rs  (BoardEngine: state, loading, error) │
//! └───────────┘          │     │ refresh()            │ move/create/update  │
//!                        │     v                      v                     │
//!                        │  pipeline.rs           mapper.rs (labels <->     │
//!                        │   ├─ bootstrap.rs        Column / IssueKind)     │
//!                        │   └─ paginate + group                            │
//!                        │     │                                            │
//!                        │     v                                            │
//!                        │  github.rs  (IssueTracker trait, GitHubClient)   │
//!                        └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Supporting Modules
//!
//! | Module    | Responsibility                                              |
//! |-----------|-------------------------------------------------------------|
//! | `models`  | `Issue`, `Label`, `Column`, `IssueKind`, `BoardState`       |
//! | `events`  | `BoardEvent` enum + `broadcast_event()` helper              |
//! | `session` | `Session` and the `ClientSource` factory the engine reads   |

pub mod bootstrap;
pub mod engine;
pub mod events;
pub mod github;
pub mod mapper;
pub mod models;
pub mod pipeline;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::BoardEngine;
pub use events::BoardEvent;
pub use github::{ClientOptions, GitHubClient, IssueTracker, TrackerError};
pub use models::{BoardState, Column, DropTarget, Issue, IssueKind, Label, RepoScope};
pub use pipeline::FetchOptions;
pub use session::{ClientSource, Session};
