//! Account commands: `repos`, `whoami`.

use anyhow::{Context, Result};

use gh_kanban::board::ClientSource;
use gh_kanban::board::pipeline;
use gh_kanban::config::KanbanConfig;
use gh_kanban::ui::board_view;

use super::connect::sign_in;

pub async fn cmd_repos(config: &KanbanConfig) -> Result<()> {
    let session = sign_in(config).await?;
    let tracker = session.client().context("Not connected")?;
    let repos = pipeline::fetch_repositories(tracker.as_ref(), config.fetch_options().max_pages).await?;
    print!("{}", board_view::render_repos(&repos));
    Ok(())
}

pub async fn cmd_whoami(config: &KanbanConfig) -> Result<()> {
    let session = sign_in(config).await?;
    let user = session.user().context("Not connected")?;
    println!("{}", board_view::render_user(&user));
    Ok(())
}
