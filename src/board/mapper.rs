//! Column Mapper: the only place that reads or writes the `kanban:` and `type:`
//! label namespaces. Pure, no I/O.
//!
//! Everything past this module works with [`Column`] and [`IssueKind`]; raw
//! namespace strings never leave it.

use serde::Serialize;

use super::models::{Column, IssueKind, Label};

const KANBAN_PREFIX: &str = "kanban:";
const TYPE_PREFIX: &str = "type:";

/// A label the board needs to exist in the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelSpec {
    pub name: String,
    pub color: &'static str,
    pub description: &'static str,
}

pub fn column_label(column: Column) -> String {
    format!("{}{}", KANBAN_PREFIX, column.as_str())
}

pub fn kind_label(kind: IssueKind) -> String {
    format!("{}{}", TYPE_PREFIX, kind.as_str())
}

fn column_color(column: Column) -> &'static str {
    match column {
        Column::Backlog => "6B7280",
        Column::Todo => "3B82F6",
        Column::Doing => "F59E0B",
        Column::Done => "10B981",
    }
}

fn kind_color(kind: IssueKind) -> &'static str {
    match kind {
        IssueKind::Epic => "7C3AED",
        IssueKind::Feature => "2563EB",
        IssueKind::Task => "6B7280",
        IssueKind::Bug => "DC2626",
    }
}

/// Every label the mapping relies on: one per column, plus one per kind if typing is on.
pub fn vocabulary(include_kinds: bool) -> Vec<LabelSpec> {
    let columns = Column::ALL.iter().map(|c| LabelSpec {
        name: column_label(*c),
        color: column_color(*c),
        description: c.title(),
    });
    let kinds = IssueKind::ALL
        .iter()
        .filter(|_| include_kinds)
        .map(|k| LabelSpec {
            name: kind_label(*k),
            color: kind_color(*k),
            description: k.title(),
        });
    columns.chain(kinds).collect()
}

fn is_column_label(name: &str) -> bool {
    name.starts_with(KANBAN_PREFIX)
}

fn is_kind_label(name: &str) -> bool {
    name.starts_with(TYPE_PREFIX)
}

/// Column an item belongs to. The first `kanban:` label wins; an absent or
/// unrecognized value means backlog.
pub fn column_of(labels: &[Label]) -> Column {
    labels
        .iter()
        .find_map(|l| l.name.strip_prefix(KANBAN_PREFIX))
        .and_then(|value| value.parse().ok())
        .unwrap_or_default()
}

/// Kind of an item, from the first `type:` label.
pub fn kind_of(labels: &[Label]) -> Option<IssueKind> {
    labels
        .iter()
        .find_map(|l| l.name.strip_prefix(TYPE_PREFIX))
        .and_then(|value| value.parse().ok())
}

/// Label set after moving to `target`: every `kanban:` label replaced by exactly one.
pub fn labels_after_move(current: &[Label], target: Column) -> Vec<Label> {
    let mut labels: Vec<Label> = current
        .iter()
        .filter(|l| !is_column_label(&l.name))
        .cloned()
        .collect();
    labels.push(Label {
        name: column_label(target),
        color: Some(column_color(target).to_string()),
    });
    labels
}

/// Label set after retyping: every `type:` label dropped, then `kind` added if given.
pub fn labels_after_retype(current: &[Label], kind: Option<IssueKind>) -> Vec<Label> {
    let mut labels: Vec<Label> = current
        .iter()
        .filter(|l| !is_kind_label(&l.name))
        .cloned()
        .collect();
    if let Some(kind) = kind {
        labels.push(Label {
            name: kind_label(kind),
            color: Some(kind_color(kind).to_string()),
        });
    }
    labels
}

/// Drop every `kanban:` label after the first. Items edited through the board
/// leave with at most one column label.
pub fn collapse_column_labels(current: &[Label]) -> Vec<Label> {
    let mut seen = false;
    current
        .iter()
        .filter(|l| {
            if !is_column_label(&l.name) {
                return true;
            }
            let keep = !seen;
            seen = true;
            keep
        })
        .cloned()
        .collect()
}

/// Labels needed on a freshly created item.
pub fn labels_for_new(column: Column, kind: Option<IssueKind>) -> Vec<String> {
    let mut names = vec![column_label(column)];
    if let Some(kind) = kind {
        names.push(kind_label(kind));
    }
    names
}

/// Labels worth showing on a card: everything except the column namespace.
pub fn display_labels(labels: &[Label]) -> impl Iterator<Item = &Label> {
    labels.iter().filter(|l| !is_column_label(&l.name))
}

pub fn label_names(labels: &[Label]) -> Vec<String> {
    labels.iter().map(|l| l.name.clone()).collect()
}
