use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::mapper;

/// A board column. Declaration order is display order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    #[default]
    Backlog,
    Todo,
    Doing,
    Done,
}

impl Column {
    pub const ALL: [Column; 4] = [Self::Backlog, Self::Todo, Self::Doing, Self::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Done => "done",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::Todo => "To Do",
            Self::Doing => "In Progress",
            Self::Done => "Done",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "backlog" => Ok(Self::Backlog),
            "todo" => Ok(Self::Todo),
            "doing" => Ok(Self::Doing),
            "done" => Ok(Self::Done),
            _ => Err(format!(
                "Invalid column '{}'. Valid values: backlog, todo, doing, done",
                s
            )),
        }
    }
}

/// Item classification carried in the `type:` label namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Epic,
    Feature,
    Task,
    Bug,
}

impl IssueKind {
    pub const ALL: [IssueKind; 4] = [Self::Epic, Self::Feature, Self::Task, Self::Bug];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Epic => "epic",
            Self::Feature => "feature",
            Self::Task => "task",
            Self::Bug => "bug",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Epic => "Epic",
            Self::Feature => "Feature",
            Self::Task => "Task",
            Self::Bug => "Bug",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "epic" => Ok(Self::Epic),
            "feature" => Ok(Self::Feature),
            "task" => Ok(Self::Task),
            "bug" => Ok(Self::Bug),
            _ => Err(format!(
                "Invalid issue type '{}'. Valid values: epic, feature, task, bug",
                s
            )),
        }
    }
}

/// A label as attached to an issue. Opaque outside the `kanban:`/`type:` namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LabelRepr")]
pub struct Label {
    pub name: String,
    /// Hex color without the leading `#`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
        }
    }
}

/// The issues API returns label objects; create/update payloads may echo bare names.
#[derive(Deserialize)]
#[serde(untagged)]
enum LabelRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        color: Option<String>,
    },
}

impl From<LabelRepr> for Label {
    fn from(repr: LabelRepr) -> Self {
        match repr {
            LabelRepr::Name(name) => Self { name, color: None },
            LabelRepr::Full { name, color } => Self { name, color },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A GitHub issue (subset of fields), the unit placed on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub assignees: Vec<Assignee>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Pull requests also come through the issues endpoint; filter them out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    pub fn column(&self) -> Column {
        mapper::column_of(&self.labels)
    }

    pub fn kind(&self) -> Option<IssueKind> {
        mapper::kind_of(&self.labels)
    }
}

/// `owner/name` of the repository the board is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoScope {
    pub owner: String,
    pub name: String,
}

impl RepoScope {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoScope {
    type Err = String;

    /// Accepts `owner/name`, `https://github.com/owner/name` and the `.git` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let path = trimmed
            .strip_prefix("https://github.com/")
            .or_else(|| trimmed.strip_prefix("http://github.com/"))
            .or_else(|| trimmed.strip_prefix("github.com/"))
            .unwrap_or(trimmed);
        let path = path.trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);

        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() == 2 && !parts[0].is_empty() && !parts[1].is_empty() {
            Ok(Self::new(parts[0], parts[1]))
        } else {
            Err(format!(
                "Invalid repository '{}'. Expected owner/name or a github.com URL",
                s
            ))
        }
    }
}

/// Where a card was dropped: a column, or another card inside some column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Column(Column),
    Card(u64),
}

/// Column -> ordered issues. Every issue number appears in at most one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardState {
    columns: BTreeMap<Column, Vec<Issue>>,
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardState {
    pub fn new() -> Self {
        Self {
            columns: Column::ALL.iter().map(|c| (*c, Vec::new())).collect(),
        }
    }

    pub fn column(&self, column: Column) -> &[Issue] {
        self.columns.get(&column).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn columns(&self) -> impl Iterator<Item = (Column, &[Issue])> {
        self.columns.iter().map(|(c, issues)| (*c, issues.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.columns.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column currently holding `number`, if any.
    pub fn locate(&self, number: u64) -> Option<Column> {
        self.columns
            .iter()
            .find(|(_, issues)| issues.iter().any(|i| i.number == number))
            .map(|(c, _)| *c)
    }

    pub fn get(&self, number: u64) -> Option<&Issue> {
        self.columns
            .values()
            .flat_map(|issues| issues.iter())
            .find(|i| i.number == number)
    }

    /// Remove `number` from `column`. `None` if it is not there.
    pub fn take(&mut self, column: Column, number: u64) -> Option<Issue> {
        let issues = self.columns.get_mut(&column)?;
        let idx = issues.iter().position(|i| i.number == number)?;
        Some(issues.remove(idx))
    }

    pub fn push_front(&mut self, column: Column, issue: Issue) {
        self.columns.entry(column).or_default().insert(0, issue);
    }

    pub fn push_back(&mut self, column: Column, issue: Issue) {
        self.columns.entry(column).or_default().push(issue);
    }

    /// Replace the entry with the same number wherever it lives. Returns its column.
    pub fn replace(&mut self, issue: Issue) -> Option<Column> {
        for (column, issues) in self.columns.iter_mut() {
            if let Some(slot) = issues.iter_mut().find(|i| i.number == issue.number) {
                *slot = issue;
                return Some(*column);
            }
        }
        None
    }

    pub fn resolve_drop(&self, target: DropTarget) -> Option<Column> {
        match target {
            DropTarget::Column(column) => Some(column),
            DropTarget::Card(number) => self.locate(number),
        }
    }

    /// All issue numbers in column order.
    pub fn numbers(&self) -> Vec<u64> {
        self.columns
            .values()
            .flat_map(|issues| issues.iter().map(|i| i.number))
            .collect()
    }
}
