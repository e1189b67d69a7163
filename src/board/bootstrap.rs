//! Label Bootstrapper: makes sure the column (and kind) labels exist before the
//! board is fetched. Idempotent; a label that already exists is not an error.

use std::collections::HashSet;

use super::github::{IssueTracker, TrackerError};
use super::mapper;
use super::models::RepoScope;
use crate::errors::BoardError;

/// What a bootstrap pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub existing: Vec<String>,
    pub created: Vec<String>,
    /// Labels that raced into existence between the listing and the create,
    /// as [`BoardError::LabelConflict`].
    pub conflicts: Vec<BoardError>,
    /// Labels whose creation failed for another reason and were skipped.
    pub skipped: Vec<String>,
}

impl BootstrapReport {
    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && self.conflicts.is_empty() && self.skipped.is_empty()
    }
}

/// List the scope's labels and create whichever board labels are missing.
///
/// A failed listing aborts with a fetch error. Creation conflicts are swallowed.
/// Any other creation failure is logged and skipped, except an auth or
/// transport failure, which aborts.
pub async fn ensure_labels(
    tracker: &dyn IssueTracker,
    scope: &RepoScope,
    include_kinds: bool,
) -> Result<BootstrapReport, BoardError> {
    let present: HashSet<String> = tracker
        .list_labels(scope)
        .await
        .map_err(|e| {
            tracing::warn!(scope = %scope, error = %e, "Failed to list labels");
            BoardError::fetch(&e)
        })?
        .into_iter()
        .map(|l| l.name)
        .collect();

    let mut report = BootstrapReport::default();
    for spec in mapper::vocabulary(include_kinds) {
        if present.contains(&spec.name) {
            report.existing.push(spec.name);
            continue;
        }

        match tracker.create_label(scope, &spec).await {
            Ok(_) => {
                tracing::debug!(scope = %scope, label = %spec.name, "Created label");
                report.created.push(spec.name);
            }
            Err(e) if e.is_conflict() => {
                tracing::debug!(scope = %scope, label = %spec.name, "Label already exists");
                report.conflicts.push(BoardError::LabelConflict(spec.name));
            }
            Err(TrackerError::Unauthorized) => return Err(BoardError::auth()),
            Err(e @ TrackerError::Http(_)) => {
                tracing::warn!(scope = %scope, label = %spec.name, error = %e, "Failed to create label");
                return Err(BoardError::fetch(&e));
            }
            Err(e) => {
                tracing::warn!(scope = %scope, label = %spec.name, error = %e, "Skipping label");
                report.skipped.push(spec.name);
            }
        }
    }

    if !report.created.is_empty() {
        tracing::info!(scope = %scope, created = report.created.len(), "Bootstrapped board labels");
    }
    Ok(report)
}
