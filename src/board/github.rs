use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::mapper::LabelSpec;
use super::models::{Issue, Label, RepoScope};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_USER_AGENT: &str = "gh-kanban";

/// Transport-level failures talking to the issue tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized: token missing, invalid or expired")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    /// 409/422, e.g. creating a label that already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("GitHub returned {status}: {body}")]
    Status { status: u16, body: String },
}

impl TrackerError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

fn classify(status: StatusCode, body: String) -> TrackerError {
    match status {
        StatusCode::UNAUTHORIZED => TrackerError::Unauthorized,
        StatusCode::NOT_FOUND => TrackerError::NotFound(body),
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => TrackerError::Conflict(body),
        _ => TrackerError::Status {
            status: status.as_u16(),
            body,
        },
    }
}

/// The authenticated account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoOwner {
    pub login: String,
}

/// A GitHub repository (subset of fields we care about).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub full_name: String,
    pub name: String,
    pub owner: RepoOwner,
    #[serde(default)]
    pub private: bool,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub open_issues_count: u64,
}

impl GitHubRepo {
    pub fn scope(&self) -> RepoScope {
        RepoScope::new(self.owner.login.clone(), self.name.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateIssueInput {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

/// PATCH payload; absent fields are left untouched by GitHub.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateIssueInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

/// Abstraction over the remote issue tracker so the engine can run against a fake.
/// Real implementation: `GitHubClient`.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn authenticated_user(&self) -> Result<GitHubUser, TrackerError>;

    /// Repositories of the authenticated user, most recently updated first.
    async fn list_repos(&self, page: u32, per_page: u32) -> Result<Vec<GitHubRepo>, TrackerError>;

    /// First page (100) of repository labels.
    async fn list_labels(&self, scope: &RepoScope) -> Result<Vec<Label>, TrackerError>;

    async fn create_label(&self, scope: &RepoScope, spec: &LabelSpec) -> Result<Label, TrackerError>;

    /// One page of open issues (pull requests included, as the API returns them).
    async fn list_open_issues(
        &self,
        scope: &RepoScope,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Issue>, TrackerError>;

    async fn get_issue(&self, scope: &RepoScope, number: u64) -> Result<Issue, TrackerError>;

    async fn create_issue(
        &self,
        scope: &RepoScope,
        input: &CreateIssueInput,
    ) -> Result<Issue, TrackerError>;

    async fn update_issue(
        &self,
        scope: &RepoScope,
        number: u64,
        input: &UpdateIssueInput,
    ) -> Result<Issue, TrackerError>;
}

/// Known GitHub token prefixes.
/// See: https://github.blog/2021-04-05-behind-githubs-new-authentication-token-formats/
const GITHUB_TOKEN_PREFIXES: &[&str] = &[
    "ghp_",        // Personal access tokens (classic)
    "github_pat_", // Fine-grained personal access tokens
    "gho_",        // OAuth access tokens
    "ghu_",        // GitHub App user-to-server tokens
    "ghs_",        // GitHub App server-to-server tokens
    "ghr_",        // GitHub App refresh tokens
];

/// Format check only; does not verify the token is active or has the `repo` scope.
pub fn is_valid_github_token(token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    GITHUB_TOKEN_PREFIXES
        .iter()
        .any(|prefix| token.starts_with(prefix))
}

/// Connection settings for [`GitHubClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub api_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// REST client for the GitHub issues and labels API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    base_url: String,
    token: String,
    client: Client,
}

impl GitHubClient {
    pub fn new(token: impl Into<String>, options: &ClientOptions) -> Result<Self, TrackerError> {
        let client = Client::builder()
            .user_agent(options.user_agent.clone())
            .timeout(options.timeout)
            .build()?;
        Ok(Self {
            base_url: options.api_url.trim_end_matches('/').to_string(),
            token: token.into(),
            client,
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, &url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, TrackerError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(classify(status, body))
        }
    }

    fn repo_path(scope: &RepoScope, rest: &str) -> String {
        format!("/repos/{}/{}{}", scope.owner, scope.name, rest)
    }
}

#[async_trait]
impl IssueTracker for GitHubClient {
    async fn authenticated_user(&self) -> Result<GitHubUser, TrackerError> {
        let response = self.request(Method::GET, "/user").send().await?;
        self.handle_response(response).await
    }

    async fn list_repos(&self, page: u32, per_page: u32) -> Result<Vec<GitHubRepo>, TrackerError> {
        let response = self
            .request(Method::GET, "/user/repos")
            .query(&[
                ("sort", "updated".to_string()),
                ("direction", "desc".to_string()),
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ])
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn list_labels(&self, scope: &RepoScope) -> Result<Vec<Label>, TrackerError> {
        let response = self
            .request(Method::GET, &Self::repo_path(scope, "/labels"))
            .query(&[("per_page", "100")])
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn create_label(&self, scope: &RepoScope, spec: &LabelSpec) -> Result<Label, TrackerError> {
        let response = self
            .request(Method::POST, &Self::repo_path(scope, "/labels"))
            .json(spec)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn list_open_issues(
        &self,
        scope: &RepoScope,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Issue>, TrackerError> {
        let response = self
            .request(Method::GET, &Self::repo_path(scope, "/issues"))
            .query(&[
                ("state", "open".to_string()),
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ])
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn get_issue(&self, scope: &RepoScope, number: u64) -> Result<Issue, TrackerError> {
        let response = self
            .request(
                Method::GET,
                &Self::repo_path(scope, &format!("/issues/{}", number)),
            )
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn create_issue(
        &self,
        scope: &RepoScope,
        input: &CreateIssueInput,
    ) -> Result<Issue, TrackerError> {
        let response = self
            .request(Method::POST, &Self::repo_path(scope, "/issues"))
            .json(input)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn update_issue(
        &self,
        scope: &RepoScope,
        number: u64,
        input: &UpdateIssueInput,
    ) -> Result<Issue, TrackerError> {
        let response = self
            .request(
                Method::PATCH,
                &Self::repo_path(scope, &format!("/issues/{}", number)),
            )
            .json(input)
            .send()
            .await?;
        self.handle_response(response).await
    }
}
