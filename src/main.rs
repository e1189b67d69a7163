use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use gh_kanban::board::{Column, IssueKind};
use gh_kanban::config::KanbanConfig;

mod cmd;

#[derive(Parser)]
#[command(name = "gh-kanban")]
#[command(version, about = "Kanban board over GitHub issues, driven by labels")]
pub struct Cli {
    /// Debug logging (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format (logs go to stderr)
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    /// Repository as owner/name or a github.com URL. Overrides board.repo.
    #[arg(long, global = true)]
    pub repo: Option<String>,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the board
    Board {
        /// Print the board as JSON
        #[arg(long)]
        json: bool,
    },
    /// Move an issue to another column
    Move {
        number: u64,
        /// backlog, todo, doing or done
        column: Column,
    },
    /// Create an issue
    Create {
        title: String,
        #[arg(short, long, default_value = "")]
        body: String,
        #[arg(short, long, default_value = "backlog")]
        column: Column,
        /// epic, feature, task or bug
        #[arg(short, long)]
        kind: Option<IssueKind>,
    },
    /// Edit title, body or kind of an issue
    Edit {
        number: u64,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        body: Option<String>,
        #[arg(short, long, conflicts_with = "no_kind")]
        kind: Option<IssueKind>,
        /// Remove the kind label
        #[arg(long)]
        no_kind: bool,
    },
    /// Create any missing board labels in the repository
    Labels,
    /// List your repositories, most recently updated first
    Repos,
    /// Show the account the token belongs to
    Whoami,
    /// View or initialize configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration (token redacted)
    Show,
    /// Write a default .gh-kanban/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(verbose: bool, format: LogFormat) {
    let default = if verbose {
        "gh_kanban=debug"
    } else {
        "gh_kanban=info"
    };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
    );

    // stdout carries board output; logs go to stderr
    match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let config = KanbanConfig::with_cli_args(project_dir, cli.repo.clone())?;

    match &cli.command {
        Commands::Board { json } => cmd::cmd_board(&config, *json).await?,
        Commands::Move { number, column } => cmd::cmd_move(&config, *number, *column).await?,
        Commands::Create {
            title,
            body,
            column,
            kind,
        } => cmd::cmd_create(&config, title, body, *column, *kind).await?,
        Commands::Edit {
            number,
            title,
            body,
            kind,
            no_kind,
        } => {
            let edit = cmd::EditArgs {
                title: title.clone(),
                body: body.clone(),
                kind: *kind,
                clear_kind: *no_kind,
            };
            cmd::cmd_edit(&config, *number, edit).await?
        }
        Commands::Labels => cmd::cmd_labels(&config).await?,
        Commands::Repos => cmd::cmd_repos(&config).await?,
        Commands::Whoami => cmd::cmd_whoami(&config).await?,
        Commands::Config { command } => cmd::cmd_config(&config, command.clone())?,
    }

    Ok(())
}
