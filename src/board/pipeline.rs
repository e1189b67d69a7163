//! Fetch/Group Pipeline: bootstrap labels, page through open issues, drop pull
//! requests, and partition the rest into a fresh [`BoardState`].

use std::collections::HashSet;
use std::future::Future;

use super::bootstrap;
use super::github::{GitHubRepo, IssueTracker, TrackerError};
use super::models::{BoardState, Issue, RepoScope};
use crate::errors::BoardError;

/// Fixed page size of the remote listing endpoints.
pub const PAGE_SIZE: u32 = 100;

/// Upper bound on pages fetched per listing (5 000 items at [`PAGE_SIZE`]).
pub const DEFAULT_MAX_PAGES: u32 = 50;

const REPOS_MESSAGE: &str = "Failed to fetch repositories.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub max_pages: u32,
    /// Bootstrap the `type:` vocabulary as well as the column labels.
    pub include_kinds: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            include_kinds: true,
        }
    }
}

enum PageError {
    Tracker(TrackerError),
    Limit(u32),
}

/// Call `fetch_page(1)`, `fetch_page(2)`, ... until a page comes back shorter than
/// [`PAGE_SIZE`]. A full page at `max_pages` is an error, never a truncated result.
async fn paginate<T, F, Fut>(max_pages: u32, mut fetch_page: F) -> Result<Vec<T>, PageError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>, TrackerError>>,
{
    let mut all = Vec::new();
    let mut page = 1u32;

    loop {
        let batch = fetch_page(page).await.map_err(PageError::Tracker)?;
        let count = batch.len();
        tracing::debug!(page, count, "Fetched page");
        all.extend(batch);

        if count < PAGE_SIZE as usize {
            return Ok(all);
        }
        if page >= max_pages {
            return Err(PageError::Limit(max_pages));
        }
        page += 1;
    }
}

fn page_error(message: &str, scope: Option<&RepoScope>, err: PageError) -> BoardError {
    match err {
        PageError::Tracker(e) => {
            tracing::warn!(scope = ?scope.map(ToString::to_string), error = %e, "{}", message);
            BoardError::fetch_with(message, &e)
        }
        PageError::Limit(max_pages) => {
            tracing::warn!(
                scope = ?scope.map(ToString::to_string),
                max_pages,
                "Page limit reached before the listing ended"
            );
            BoardError::Fetch(format!(
                "{} More than {} pages; raise board.max_pages.",
                message, max_pages
            ))
        }
    }
}

/// Every open issue in the scope, in remote order, without pull requests.
///
/// Pages can overlap when the remote order shifts mid-listing; an issue seen
/// twice keeps its first (most recent) position.
pub async fn fetch_open_issues(
    tracker: &dyn IssueTracker,
    scope: &RepoScope,
    max_pages: u32,
) -> Result<Vec<Issue>, BoardError> {
    let issues = paginate(max_pages, move |page| {
        tracker.list_open_issues(scope, page, PAGE_SIZE)
    })
    .await
    .map_err(|e| page_error("Failed to fetch issues.", Some(scope), e))?;

    let mut seen = HashSet::new();
    let issues: Vec<Issue> = issues
        .into_iter()
        .filter(|i| !i.is_pull_request() && seen.insert(i.number))
        .collect();
    Ok(issues)
}

/// Partition issues by column, keeping their input order within each column.
pub fn group(issues: Vec<Issue>) -> BoardState {
    let mut state = BoardState::new();
    for issue in issues {
        let column = issue.column();
        state.push_back(column, issue);
    }
    state
}

/// Full refresh: bootstrap, fetch every page, group. On any failure nothing is
/// returned, so the caller's prior state stays as it was.
pub async fn refresh(
    tracker: &dyn IssueTracker,
    scope: &RepoScope,
    options: FetchOptions,
) -> Result<BoardState, BoardError> {
    bootstrap::ensure_labels(tracker, scope, options.include_kinds).await?;
    let issues = fetch_open_issues(tracker, scope, options.max_pages).await?;
    let state = group(issues);
    tracing::info!(scope = %scope, issues = state.len(), "Fetched board");
    Ok(state)
}

/// Repositories of the authenticated user, most recently updated first.
pub async fn fetch_repositories(
    tracker: &dyn IssueTracker,
    max_pages: u32,
) -> Result<Vec<GitHubRepo>, BoardError> {
    paginate(max_pages, move |page| tracker.list_repos(page, PAGE_SIZE))
        .await
        .map_err(|e| page_error(REPOS_MESSAGE, None, e))
}
