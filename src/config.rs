//! Configuration for gh-kanban.
//!
//! Settings are read from `.gh-kanban/config.toml` in the project directory,
//! falling back to `<user config dir>/gh-kanban/config.toml`. Layering is
//! file → environment → CLI.
//!
//! # Configuration File Format
//!
//! ```toml
//! [github]
//! api_url = "https://api.github.com"
//! user_agent = "gh-kanban"
//! timeout_secs = 30
//! # token = "ghp_..."   prefer GITHUB_TOKEN
//!
//! [board]
//! repo = "owner/name"
//! max_pages = 50
//! item_types = true
//! ```
//!
//! # Environment
//!
//! | Variable                      | Overrides          |
//! |-------------------------------|--------------------|
//! | `GITHUB_TOKEN` / `GH_TOKEN`   | `github.token`     |
//! | `GH_KANBAN_API_URL`           | `github.api_url`   |
//! | `GH_KANBAN_REPO`              | `board.repo`       |

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::board::github::{ClientOptions, DEFAULT_API_URL, DEFAULT_USER_AGENT};
use crate::board::models::RepoScope;
use crate::board::pipeline::{DEFAULT_MAX_PAGES, FetchOptions};

pub const CONFIG_DIR: &str = ".gh-kanban";
pub const CONFIG_FILE: &str = "config.toml";

const TOKEN_VARS: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN"];
const API_URL_VAR: &str = "GH_KANBAN_API_URL";
const REPO_VAR: &str = "GH_KANBAN_REPO";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

fn default_item_types() -> bool {
    true
}

/// `[github]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubSection {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Stored token. Discouraged; the environment wins when both are set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for GitHubSection {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            token: None,
        }
    }
}

/// `[board]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSection {
    /// `owner/name` or a github.com URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    /// Page guard for every paginated listing.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Bootstrap and use the `type:` labels.
    #[serde(default = "default_item_types")]
    pub item_types: bool,
}

impl Default for BoardSection {
    fn default() -> Self {
        Self {
            repo: None,
            max_pages: default_max_pages(),
            item_types: default_item_types(),
        }
    }
}

/// Parsed `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KanbanToml {
    #[serde(default)]
    pub github: GitHubSection,
    #[serde(default)]
    pub board: BoardSection,
}

impl KanbanToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config.toml")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Problems worth warning about. Empty when the file is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.github.api_url.starts_with("http://") && !self.github.api_url.starts_with("https://")
        {
            warnings.push(format!(
                "github.api_url '{}' is not an http(s) URL",
                self.github.api_url
            ));
        }
        if self.github.timeout_secs == 0 {
            warnings.push("github.timeout_secs must be greater than 0".to_string());
        }
        if self.board.max_pages == 0 {
            warnings.push("board.max_pages must be greater than 0".to_string());
        }
        if let Some(Err(e)) = self.board.repo.as_ref().map(|r| r.parse::<RepoScope>()) {
            warnings.push(format!("board.repo: {}", e));
        }
        if self.github.token.is_some() {
            warnings.push(
                "github.token is stored in plain text; prefer the GITHUB_TOKEN environment variable"
                    .to_string(),
            );
        }
        warnings
    }
}

/// `<user config dir>/gh-kanban`, e.g. `~/.config/gh-kanban` on Linux.
pub fn user_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gh-kanban"))
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Show a token's prefix only.
pub fn redact_token(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    format!("{}****", visible)
}

/// Effective configuration: file, environment and CLI flags combined.
#[derive(Debug, Clone)]
pub struct KanbanConfig {
    pub project_dir: PathBuf,
    /// File the settings came from, if any.
    pub source: Option<PathBuf>,
    pub toml: KanbanToml,
    /// CLI override for `board.repo`.
    pub cli_repo: Option<String>,
}

impl KanbanConfig {
    pub fn new(project_dir: PathBuf) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .context("Failed to resolve project directory")?;

        let candidates = std::iter::once(project_dir.join(CONFIG_DIR))
            .chain(user_config_dir())
            .map(|dir| dir.join(CONFIG_FILE));
        let mut source = None;
        let mut toml = KanbanToml::default();
        for path in candidates {
            if path.exists() {
                toml = KanbanToml::load(&path)?;
                source = Some(path);
                break;
            }
        }

        Ok(Self {
            project_dir,
            source,
            toml,
            cli_repo: None,
        })
    }

    pub fn with_cli_args(project_dir: PathBuf, repo: Option<String>) -> Result<Self> {
        let mut config = Self::new(project_dir)?;
        config.cli_repo = repo;
        Ok(config)
    }

    /// Where `config init` writes.
    pub fn project_config_file(&self) -> PathBuf {
        self.project_dir.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Token (env → file).
    pub fn token(&self) -> Option<String> {
        TOKEN_VARS
            .iter()
            .find_map(|name| env_non_empty(name))
            .or_else(|| {
                self.toml
                    .github
                    .token
                    .as_ref()
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
            })
    }

    /// API base URL (env → file).
    pub fn api_url(&self) -> String {
        env_non_empty(API_URL_VAR).unwrap_or_else(|| self.toml.github.api_url.clone())
    }

    /// Repository (CLI → env → file), parsed.
    pub fn repo(&self) -> Result<Option<RepoScope>> {
        let raw = self
            .cli_repo
            .clone()
            .or_else(|| env_non_empty(REPO_VAR))
            .or_else(|| self.toml.board.repo.clone());
        raw.map(|r| r.parse::<RepoScope>().map_err(anyhow::Error::msg))
            .transpose()
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            api_url: self.api_url(),
            user_agent: self.toml.github.user_agent.clone(),
            timeout: Duration::from_secs(self.toml.github.timeout_secs.max(1)),
        }
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            max_pages: self.toml.board.max_pages.max(1),
            include_kinds: self.toml.board.item_types,
        }
    }

    /// The effective settings as TOML, token redacted, for `config show`.
    pub fn effective(&self) -> KanbanToml {
        let mut toml = self.toml.clone();
        toml.github.api_url = self.api_url();
        toml.github.token = self.token().map(|t| redact_token(&t));
        if let Ok(Some(repo)) = self.repo() {
            toml.board.repo = Some(repo.to_string());
        }
        toml
    }

    pub fn validate(&self) -> Vec<String> {
        self.toml.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_VARS: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN", "GH_KANBAN_API_URL", "GH_KANBAN_REPO"];

    /// Clears the variables this module reads and restores them on drop.
    struct EnvGuard {
        saved: Vec<(&'static str, Option<String>)>,
    }

    impl EnvGuard {
        fn clean() -> Self {
            let saved = ENV_VARS
                .iter()
                .map(|name| (*name, std::env::var(name).ok()))
                .collect();
            for name in ENV_VARS {
                unsafe { std::env::remove_var(name) };
            }
            Self { saved }
        }

        fn set(&self, name: &str, value: &str) {
            unsafe { std::env::set_var(name, value) };
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => unsafe { std::env::set_var(name, v) },
                    None => unsafe { std::env::remove_var(name) },
                }
            }
        }
    }

    fn project_with(content: &str) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        let config_dir = dir.path().join(CONFIG_DIR);
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join(CONFIG_FILE), content).unwrap();
        dir
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let toml = KanbanToml::parse("").unwrap();
        assert_eq!(toml.github.api_url, "https://api.github.com");
        assert_eq!(toml.github.user_agent, "gh-kanban");
        assert_eq!(toml.github.timeout_secs, 30);
        assert_eq!(toml.board.max_pages, 50);
        assert!(toml.board.item_types);
        assert!(toml.board.repo.is_none());
    }

    #[test]
    fn test_parse_sections() {
        let content = r#"
[github]
api_url = "http://localhost:8080"
timeout_secs = 5

[board]
repo = "octo/widgets"
max_pages = 3
item_types = false
"#;
        let toml = KanbanToml::parse(content).unwrap();
        assert_eq!(toml.github.api_url, "http://localhost:8080");
        assert_eq!(toml.github.timeout_secs, 5);
        assert_eq!(toml.github.user_agent, "gh-kanban");
        assert_eq!(toml.board.repo.as_deref(), Some("octo/widgets"));
        assert_eq!(toml.board.max_pages, 3);
        assert!(!toml.board.item_types);
    }

    #[test]
    fn test_parse_invalid_toml() {
        assert!(KanbanToml::parse("[board\nrepo = ").is_err());
    }

    #[test]
    fn test_validate() {
        assert!(KanbanToml::default().validate().is_empty());

        let mut toml = KanbanToml::default();
        toml.github.api_url = "ftp://example.com".into();
        toml.board.max_pages = 0;
        toml.board.repo = Some("not-a-repo".into());
        toml.github.token = Some("ghp_x".into());
        let warnings = toml.validate();
        assert_eq!(warnings.len(), 4);
        assert!(warnings.iter().any(|w| w.contains("board.repo")));
    }

    #[test]
    fn test_validate_checks_board_repo_slug() {
        let mut toml = KanbanToml::default();
        toml.board.repo = Some("https://github.com/octo/widgets".into());
        assert!(toml.validate().is_empty());

        toml.board.repo = Some("octo".into());
        let warnings = toml.validate();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("board.repo: "));
    }

    #[test]
    fn test_load_and_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_DIR).join(CONFIG_FILE);

        let mut toml = KanbanToml::default();
        toml.board.repo = Some("octo/widgets".into());
        toml.board.max_pages = 7;
        toml.save(&path).unwrap();

        let loaded = KanbanToml::load(&path).unwrap();
        assert_eq!(loaded, toml);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("token"));
    }

    #[test]
    fn test_redact_token() {
        assert_eq!(redact_token("ghp_abcdef123456"), "ghp_****");
        assert_eq!(redact_token("ab"), "ab****");
    }

    #[test]
    fn test_token_env_wins_over_file() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let env = EnvGuard::clean();
        let dir = project_with("[github]\ntoken = \"ghp_fromfile\"\n");

        let config = KanbanConfig::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(config.token().as_deref(), Some("ghp_fromfile"));

        env.set("GH_TOKEN", "ghp_fromgh");
        assert_eq!(config.token().as_deref(), Some("ghp_fromgh"));

        env.set("GITHUB_TOKEN", "ghp_fromgithub");
        assert_eq!(config.token().as_deref(), Some("ghp_fromgithub"));
    }

    #[test]
    fn test_blank_token_is_none() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let env = EnvGuard::clean();
        env.set("GITHUB_TOKEN", "   ");
        let dir = project_with("");
        let config = KanbanConfig::new(dir.path().to_path_buf()).unwrap();
        assert!(config.token().is_none());
    }

    #[test]
    fn test_repo_priority_cli_env_file() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let env = EnvGuard::clean();
        let dir = project_with("[board]\nrepo = \"file/repo\"\n");

        let config = KanbanConfig::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(config.repo().unwrap(), Some(RepoScope::new("file", "repo")));

        env.set("GH_KANBAN_REPO", "https://github.com/env/repo.git");
        assert_eq!(config.repo().unwrap(), Some(RepoScope::new("env", "repo")));

        let config =
            KanbanConfig::with_cli_args(dir.path().to_path_buf(), Some("cli/repo".into())).unwrap();
        assert_eq!(config.repo().unwrap(), Some(RepoScope::new("cli", "repo")));
    }

    #[test]
    fn test_invalid_repo_is_error() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let _env = EnvGuard::clean();
        let dir = project_with("");
        let config =
            KanbanConfig::with_cli_args(dir.path().to_path_buf(), Some("nope".into())).unwrap();
        assert!(config.repo().is_err());
    }

    #[test]
    fn test_client_and_fetch_options() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let env = EnvGuard::clean();
        let dir = project_with("[github]\ntimeout_secs = 9\n[board]\nmax_pages = 2\nitem_types = false\n");
        let config = KanbanConfig::new(dir.path().to_path_buf()).unwrap();

        let options = config.client_options();
        assert_eq!(options.api_url, "https://api.github.com");
        assert_eq!(options.timeout, Duration::from_secs(9));

        let fetch = config.fetch_options();
        assert_eq!(fetch.max_pages, 2);
        assert!(!fetch.include_kinds);

        env.set("GH_KANBAN_API_URL", "http://127.0.0.1:9999");
        assert_eq!(config.client_options().api_url, "http://127.0.0.1:9999");
    }

    #[test]
    fn test_effective_redacts_token() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let env = EnvGuard::clean();
        env.set("GITHUB_TOKEN", "ghp_secretsecret");
        let dir = project_with("");
        let config = KanbanConfig::new(dir.path().to_path_buf()).unwrap();

        let shown = toml::to_string_pretty(&config.effective()).unwrap();
        assert!(shown.contains("ghp_****"));
        assert!(!shown.contains("secretsecret"));
    }

    #[test]
    fn test_project_config_file_path() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let _env = EnvGuard::clean();
        let dir = project_with("");
        let config = KanbanConfig::new(dir.path().to_path_buf()).unwrap();
        assert!(config.project_config_file().ends_with(".gh-kanban/config.toml"));
        assert_eq!(config.source.as_deref(), Some(config.project_config_file().as_path()));
    }
}
