//! In-memory `IssueTracker` double that records every call.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::github::{
    CreateIssueInput, GitHubRepo, GitHubUser, IssueTracker, RepoOwner, TrackerError,
    UpdateIssueInput,
};
use super::mapper::LabelSpec;
use super::models::{Issue, Label, RepoScope};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    AuthenticatedUser,
    ListRepos { page: u32 },
    ListLabels,
    CreateLabel(String),
    ListIssues { page: u32 },
    GetIssue(u64),
    CreateIssue(CreateIssueInput),
    UpdateIssue(u64, UpdateIssueInput),
}

/// Which calls should fail, and how.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Failure {
    #[default]
    None,
    Unauthorized,
    Server,
    Conflict,
}

impl Failure {
    fn check(self) -> Result<(), TrackerError> {
        match self {
            Failure::None => Ok(()),
            Failure::Unauthorized => Err(TrackerError::Unauthorized),
            Failure::Server => Err(TrackerError::Status {
                status: 500,
                body: "boom".into(),
            }),
            Failure::Conflict => Err(TrackerError::Conflict("already_exists".into())),
        }
    }
}

#[derive(Default)]
struct FakeState {
    issues: Vec<Issue>,
    labels: Vec<Label>,
    repos: Vec<GitHubRepo>,
    calls: Vec<Call>,
    next_number: u64,
    fail_user: Failure,
    fail_labels: Failure,
    fail_create_label: Failure,
    fail_list_page: Option<(u32, Failure)>,
    fail_get: Failure,
    fail_create: Failure,
    fail_update: Failure,
    /// Every page is full, whatever the page number.
    endless: bool,
    /// Issue pushed to the front of the listing once the given page was served.
    insert_after_page: Option<(u32, Issue)>,
    listings_started: u32,
}

#[derive(Default)]
pub struct FakeTracker {
    state: Mutex<FakeState>,
    /// When set, the first issue listing waits here until notified.
    listing_gate: Option<Arc<Notify>>,
}

pub fn issue(number: u64, labels: &[&str]) -> Issue {
    Issue {
        number,
        title: format!("Issue {}", number),
        body: Some(String::new()),
        labels: labels.iter().map(|l| Label::new(*l)).collect(),
        assignees: Vec::new(),
        html_url: format!("https://github.com/o/r/issues/{}", number),
        updated_at: None,
        pull_request: None,
    }
}

pub fn pull_request(number: u64) -> Issue {
    let mut pr = issue(number, &[]);
    pr.pull_request = Some(serde_json::json!({"url": "https://api.github.com/pulls/1"}));
    pr
}

pub fn repo(owner: &str, name: &str) -> GitHubRepo {
    GitHubRepo {
        full_name: format!("{}/{}", owner, name),
        name: name.to_string(),
        owner: RepoOwner {
            login: owner.to_string(),
        },
        private: false,
        html_url: format!("https://github.com/{}/{}", owner, name),
        description: None,
        open_issues_count: 0,
    }
}

pub fn scope() -> RepoScope {
    RepoScope::new("o", "r")
}

impl FakeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issues(issues: Vec<Issue>) -> Self {
        let tracker = Self::new();
        {
            let mut state = tracker.state();
            state.next_number = issues.iter().map(|i| i.number).max().unwrap_or(0) + 1;
            state.issues = issues;
        }
        tracker
    }

    pub fn with_listing_gate(mut self, gate: Arc<Notify>) -> Self {
        self.listing_gate = Some(gate);
        self
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn list_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::ListIssues { .. }))
            .count()
    }

    pub fn set_labels(&self, names: &[&str]) {
        self.state().labels = names.iter().map(|n| Label::new(*n)).collect();
    }

    pub fn set_repos(&self, repos: Vec<GitHubRepo>) {
        self.state().repos = repos;
    }

    /// Simulate another actor relabeling an issue behind the board's back.
    pub fn set_remote_labels(&self, number: u64, names: &[&str]) {
        let mut state = self.state();
        if let Some(issue) = state.issues.iter_mut().find(|i| i.number == number) {
            issue.labels = names.iter().map(|n| Label::new(*n)).collect();
        }
    }

    pub fn push_remote_issue(&self, issue: Issue) {
        self.state().issues.insert(0, issue);
    }

    /// Simulate an issue created between two page requests: once `page` has been
    /// served, `issue` lands at the front and every later page shifts by one.
    pub fn insert_after_page(&self, page: u32, issue: Issue) {
        self.state().insert_after_page = Some((page, issue));
    }

    pub fn remote_issue(&self, number: u64) -> Option<Issue> {
        self.state().issues.iter().find(|i| i.number == number).cloned()
    }

    pub fn fail_user(&self, failure: Failure) {
        self.state().fail_user = failure;
    }

    pub fn fail_labels(&self, failure: Failure) {
        self.state().fail_labels = failure;
    }

    pub fn fail_create_label(&self, failure: Failure) {
        self.state().fail_create_label = failure;
    }

    pub fn fail_list_page(&self, page: u32, failure: Failure) {
        self.state().fail_list_page = Some((page, failure));
    }

    pub fn fail_get(&self, failure: Failure) {
        self.state().fail_get = failure;
    }

    pub fn fail_create(&self, failure: Failure) {
        self.state().fail_create = failure;
    }

    pub fn fail_update(&self, failure: Failure) {
        self.state().fail_update = failure;
    }

    pub fn endless(&self) {
        self.state().endless = true;
    }
}

fn page_of<T: Clone>(items: &[T], page: u32, per_page: u32) -> Vec<T> {
    let start = (page.saturating_sub(1) * per_page) as usize;
    items
        .iter()
        .skip(start)
        .take(per_page as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn authenticated_user(&self) -> Result<GitHubUser, TrackerError> {
        let mut state = self.state();
        state.calls.push(Call::AuthenticatedUser);
        state.fail_user.check()?;
        Ok(GitHubUser {
            login: "octocat".into(),
            name: Some("The Octocat".into()),
            avatar_url: None,
        })
    }

    async fn list_repos(&self, page: u32, per_page: u32) -> Result<Vec<GitHubRepo>, TrackerError> {
        let mut state = self.state();
        state.calls.push(Call::ListRepos { page });
        Ok(page_of(&state.repos, page, per_page))
    }

    async fn list_labels(&self, _scope: &RepoScope) -> Result<Vec<Label>, TrackerError> {
        let mut state = self.state();
        state.calls.push(Call::ListLabels);
        state.fail_labels.check()?;
        Ok(state.labels.clone())
    }

    async fn create_label(&self, _scope: &RepoScope, spec: &LabelSpec) -> Result<Label, TrackerError> {
        let mut state = self.state();
        state.calls.push(Call::CreateLabel(spec.name.clone()));
        state.fail_create_label.check()?;
        let label = Label {
            name: spec.name.clone(),
            color: Some(spec.color.to_string()),
        };
        state.labels.push(label.clone());
        Ok(label)
    }

    async fn list_open_issues(
        &self,
        _scope: &RepoScope,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Issue>, TrackerError> {
        let wait = {
            let mut state = self.state();
            state.listings_started += u32::from(page == 1);
            page == 1 && state.listings_started == 1
        };
        if wait {
            if let Some(gate) = &self.listing_gate {
                gate.notified().await;
            }
        }

        let mut state = self.state();
        state.calls.push(Call::ListIssues { page });
        if let Some((failing_page, failure)) = state.fail_list_page {
            if failing_page == page {
                failure.check()?;
            }
        }
        if state.endless {
            return Ok((0..u64::from(per_page))
                .map(|n| issue(u64::from(page) * 1000 + n, &[]))
                .collect());
        }
        let served = page_of(&state.issues, page, per_page);
        if state.insert_after_page.as_ref().is_some_and(|(p, _)| *p == page) {
            if let Some((_, created)) = state.insert_after_page.take() {
                state.issues.insert(0, created);
            }
        }
        Ok(served)
    }

    async fn get_issue(&self, _scope: &RepoScope, number: u64) -> Result<Issue, TrackerError> {
        let mut state = self.state();
        state.calls.push(Call::GetIssue(number));
        state.fail_get.check()?;
        state
            .issues
            .iter()
            .find(|i| i.number == number)
            .cloned()
            .ok_or_else(|| TrackerError::NotFound(format!("issue {}", number)))
    }

    async fn create_issue(
        &self,
        _scope: &RepoScope,
        input: &CreateIssueInput,
    ) -> Result<Issue, TrackerError> {
        let mut state = self.state();
        state.calls.push(Call::CreateIssue(input.clone()));
        state.fail_create.check()?;
        let number = state.next_number.max(1);
        state.next_number = number + 1;
        let mut created = issue(number, &[]);
        created.title = input.title.clone();
        created.body = Some(input.body.clone());
        created.labels = input.labels.iter().map(Label::new).collect();
        state.issues.insert(0, created.clone());
        Ok(created)
    }

    async fn update_issue(
        &self,
        _scope: &RepoScope,
        number: u64,
        input: &UpdateIssueInput,
    ) -> Result<Issue, TrackerError> {
        let mut state = self.state();
        state.calls.push(Call::UpdateIssue(number, input.clone()));
        state.fail_update.check()?;
        let issue = state
            .issues
            .iter_mut()
            .find(|i| i.number == number)
            .ok_or_else(|| TrackerError::NotFound(format!("issue {}", number)))?;
        if let Some(title) = &input.title {
            issue.title = title.clone();
        }
        if let Some(body) = &input.body {
            issue.body = Some(body.clone());
        }
        if let Some(labels) = &input.labels {
            issue.labels = labels.iter().map(Label::new).collect();
        }
        Ok(issue.clone())
    }
}
