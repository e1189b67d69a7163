//! Sign-in and engine wiring shared by the commands.

use anyhow::{Context, Result};
use std::sync::Arc;

use gh_kanban::board::{BoardEngine, ClientSource, RepoScope, Session};
use gh_kanban::config::KanbanConfig;
use gh_kanban::ui::Spinner;

/// Verify the configured token and return a signed-in session.
pub async fn sign_in(config: &KanbanConfig) -> Result<Arc<Session>> {
    let token = config.token().context(
        "No GitHub token found. Set GITHUB_TOKEN (or GH_TOKEN), or add github.token to .gh-kanban/config.toml",
    )?;

    let session = Arc::new(Session::new(config.client_options()));
    let spinner = Spinner::start("Signing in to GitHub...");
    match session.connect(&token).await {
        Ok(user) => {
            spinner.clear();
            tracing::debug!(login = %user.login, "Session ready");
            Ok(session)
        }
        Err(e) => {
            spinner.fail(e.to_string());
            Err(e.into())
        }
    }
}

pub fn require_repo(config: &KanbanConfig) -> Result<RepoScope> {
    config.repo()?.context(
        "No repository selected. Pass --repo owner/name, set GH_KANBAN_REPO, or add board.repo to .gh-kanban/config.toml",
    )
}

/// Signed-in engine bound to the configured repository, with the board loaded.
pub async fn open_board(config: &KanbanConfig) -> Result<(BoardEngine, RepoScope)> {
    let scope = require_repo(config)?;
    let session = sign_in(config).await?;
    let source: Arc<dyn ClientSource> = session;
    let engine = BoardEngine::new(source, config.fetch_options());
    engine.select_scope(scope.clone());

    let spinner = Spinner::start(format!("Loading {}...", scope));
    match engine.refresh().await {
        Ok(()) => spinner.clear(),
        Err(e) => {
            spinner.fail(e.to_string());
            return Err(e.into());
        }
    }
    Ok((engine, scope))
}
