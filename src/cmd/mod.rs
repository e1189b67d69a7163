//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module    | Commands handled                              |
//! |-----------|-----------------------------------------------|
//! | `board`   | `Board`, `Move`, `Create`, `Edit`, `Labels`   |
//! | `account` | `Repos`, `Whoami`                             |
//! | `config`  | `Config`                                      |
//!
//! `connect` holds the sign-in and engine wiring they share.

pub mod account;
pub mod board;
pub mod config;
pub mod connect;

pub use account::{cmd_repos, cmd_whoami};
pub use board::{EditArgs, cmd_board, cmd_create, cmd_edit, cmd_labels, cmd_move};
pub use config::cmd_config;
