//! Board commands: `board`, `move`, `create`, `edit`, `labels`.

use anyhow::{Context, Result, bail};

use gh_kanban::board::bootstrap;
use gh_kanban::board::{Column, ClientSource, IssueKind};
use gh_kanban::config::KanbanConfig;
use gh_kanban::ui::{Spinner, board_view};
use gh_kanban::ui::icons::WARN;

use super::connect::{open_board, require_repo, sign_in};

pub async fn cmd_board(config: &KanbanConfig, json: bool) -> Result<()> {
    let (engine, scope) = open_board(config).await?;
    let state = engine.snapshot();

    if json {
        let out = serde_json::to_string_pretty(&state).context("Failed to serialize board")?;
        println!("{}", out);
    } else {
        print!("{}", board_view::render_board(&scope, &state));
    }
    Ok(())
}

pub async fn cmd_move(config: &KanbanConfig, number: u64, to: Column) -> Result<()> {
    let (engine, _scope) = open_board(config).await?;
    let from = engine
        .snapshot()
        .locate(number)
        .with_context(|| format!("Issue #{} is not an open issue on this board", number))?;

    let Some(write) = engine.move_issue(number, from, to) else {
        println!("#{} is already in {}", number, to.title());
        return Ok(());
    };
    write.await.context("Move task panicked")??;
    println!("{}", board_view::render_move(number, from, to));
    Ok(())
}

pub async fn cmd_create(
    config: &KanbanConfig,
    title: &str,
    body: &str,
    column: Column,
    kind: Option<IssueKind>,
) -> Result<()> {
    let (engine, _scope) = open_board(config).await?;
    let Some(issue) = engine.create_issue(title, body, column, kind).await? else {
        bail!("Not connected");
    };
    println!("{}", board_view::render_created(&issue, column));
    Ok(())
}

/// What `edit` changes. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct EditArgs {
    pub title: Option<String>,
    pub body: Option<String>,
    pub kind: Option<IssueKind>,
    pub clear_kind: bool,
}

pub async fn cmd_edit(config: &KanbanConfig, number: u64, edit: EditArgs) -> Result<()> {
    let (engine, _scope) = open_board(config).await?;
    let current = engine
        .snapshot()
        .get(number)
        .cloned()
        .with_context(|| format!("Issue #{} is not an open issue on this board", number))?;

    let title = edit.title.unwrap_or(current.title.clone());
    let body = edit.body.or(current.body.clone()).unwrap_or_default();
    let kind = if edit.clear_kind {
        None
    } else {
        edit.kind.or(current.kind())
    };

    let Some(updated) = engine.update_issue(number, &title, &body, kind).await? else {
        bail!("Not connected");
    };
    println!("{}", board_view::render_updated(&updated));
    Ok(())
}

pub async fn cmd_labels(config: &KanbanConfig) -> Result<()> {
    let scope = require_repo(config)?;
    let session = sign_in(config).await?;
    let tracker = session.client().context("Not connected")?;

    let spinner = Spinner::start(format!("Checking labels in {}...", scope));
    let report = match bootstrap::ensure_labels(
        tracker.as_ref(),
        &scope,
        config.fetch_options().include_kinds,
    )
    .await
    {
        Ok(report) => {
            spinner.succeed(format!("{} label(s) created", report.created.len()));
            report
        }
        Err(e) => {
            spinner.fail(e.to_string());
            return Err(e.into());
        }
    };
    print!("{}", board_view::render_bootstrap(&scope, &report));
    if !report.skipped.is_empty() {
        eprintln!(
            "{}{} label(s) could not be created; check the token's permissions",
            WARN,
            report.skipped.len()
        );
    }
    Ok(())
}
