//! Configuration commands: `gh-kanban config`.

use anyhow::{Context, Result, bail};

use gh_kanban::config::{KanbanConfig, KanbanToml};
use gh_kanban::ui::icons::{CHECK, WARN};

use super::super::ConfigCommands;

pub fn cmd_config(config: &KanbanConfig, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            match &config.source {
                Some(path) => println!("# Config file: {}", path.display()),
                None => println!("# No config file found; using defaults"),
            }
            let shown = toml::to_string_pretty(&config.effective())
                .context("Failed to serialize configuration")?;
            print!("{}", shown);

            for warning in config.validate() {
                eprintln!("{}{}", WARN, warning);
            }
        }
        Some(ConfigCommands::Init { force }) => {
            let path = config.project_config_file();
            if path.exists() && !force {
                bail!(
                    "{} already exists. Use --force to overwrite it.",
                    path.display()
                );
            }
            let mut toml = KanbanToml::default();
            if let Ok(Some(repo)) = config.repo() {
                toml.board.repo = Some(repo.to_string());
            }
            toml.save(&path)?;
            println!("{}Wrote {}", CHECK, path.display());
        }
    }
    Ok(())
}
