//! Plain-terminal rendering of the board and its side listings.
//!
//! Everything here returns a `String`; callers decide where it goes.

use console::style;
use std::fmt::Write as _;

use crate::board::bootstrap::BootstrapReport;
use crate::board::github::{GitHubRepo, GitHubUser};
use crate::board::mapper;
use crate::board::models::{BoardState, Column, Issue, RepoScope};
use crate::ui::icons::{ARROW, CHECK, COLUMN, LOCK, SPARKLE, USER};

/// One card: `#42 Title [type:bug, ui] @alice`.
pub fn render_issue_line(issue: &Issue) -> String {
    let mut line = format!(
        "{} {}",
        style(format!("#{}", issue.number)).dim(),
        issue.title
    );

    let labels: Vec<&str> = mapper::display_labels(&issue.labels)
        .map(|l| l.name.as_str())
        .collect();
    if !labels.is_empty() {
        let _ = write!(line, " {}", style(format!("[{}]", labels.join(", "))).yellow());
    }

    for assignee in &issue.assignees {
        let _ = write!(line, " {}", style(format!("@{}", assignee.login)).green());
    }
    line
}

/// Four columns, top to bottom, each with title and count.
pub fn render_board(scope: &RepoScope, state: &BoardState) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} open)",
        style(scope.to_string()).bold(),
        state.len()
    );

    for column in Column::ALL {
        let issues = state.column(column);
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{}{} {}",
            COLUMN,
            style(column.title()).bold().cyan(),
            style(format!("({})", issues.len())).dim()
        );
        if issues.is_empty() {
            let _ = writeln!(out, "  {}", style("(empty)").dim());
        }
        for issue in issues {
            let _ = writeln!(out, "  {}", render_issue_line(issue));
        }
    }
    out
}

pub fn render_move(number: u64, from: Column, to: Column) -> String {
    format!(
        "{}Moved #{} {} {} {}",
        CHECK,
        number,
        style(from.title()).dim(),
        ARROW,
        style(to.title()).bold()
    )
}

pub fn render_created(issue: &Issue, column: Column) -> String {
    format!(
        "{}Created #{} in {}: {}",
        SPARKLE,
        issue.number,
        style(column.title()).bold(),
        issue.title
    )
}

pub fn render_updated(issue: &Issue) -> String {
    format!("{}Updated #{}: {}", CHECK, issue.number, issue.title)
}

pub fn render_repos(repos: &[GitHubRepo]) -> String {
    if repos.is_empty() {
        return format!("{}\n", style("No repositories found.").dim());
    }
    let mut out = String::new();
    for repo in repos {
        let lock = if repo.private { LOCK.to_string() } else { String::new() };
        let _ = write!(out, "{}{}", lock, style(&repo.full_name).bold());
        let _ = write!(out, " {}", style(format!("({} open)", repo.open_issues_count)).dim());
        if let Some(description) = repo.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = write!(out, "  {}", description);
        }
        let _ = writeln!(out);
    }
    out
}

pub fn render_bootstrap(scope: &RepoScope, report: &BootstrapReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Labels for {}", style(scope.to_string()).bold());
    for name in &report.existing {
        let _ = writeln!(out, "  {} {}", style("exists ").dim(), name);
    }
    for name in &report.created {
        let _ = writeln!(out, "  {} {}", style("created").green(), name);
    }
    for conflict in &report.conflicts {
        let _ = writeln!(out, "  {} {}", style("raced  ").yellow(), conflict);
    }
    for name in &report.skipped {
        let _ = writeln!(out, "  {} {}", style("skipped").red(), name);
    }
    out
}

pub fn render_user(user: &GitHubUser) -> String {
    match &user.name {
        Some(name) => format!("{}{} ({})", USER, style(&user.login).bold(), name),
        None => format!("{}{}", USER, style(&user.login).bold()),
    }
}
