//! Optimistic Mutation Engine.
//!
//! Owns the in-memory [`BoardState`] for one repository scope and the `loading` /
//! `error` status a renderer shows next to it. Moves are applied locally first and
//! written back in a spawned task; create and update write first and apply the
//! canonical item the remote returns.
//!
//! Two counters keep late responses from clobbering newer state:
//! - `refresh_generation` is bumped by every refresh; only the newest one may apply.
//! - `scope_epoch` is bumped by every scope change; nothing started under an older
//!   scope may touch the board.
//!
//! A failed move is not rolled back. The board keeps the optimistic position and
//! the error asks the user to refresh.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::events::{BoardEvent, EVENT_CAPACITY, broadcast_event};
use super::github::{CreateIssueInput, IssueTracker, TrackerError, UpdateIssueInput};
use super::mapper;
use super::models::{BoardState, Column, DropTarget, Issue, IssueKind, RepoScope};
use super::pipeline::{self, FetchOptions};
use super::session::ClientSource;
use crate::errors::{BoardError, WriteOperation};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct Status {
    loading: bool,
    error: Option<String>,
}

/// Everything a remote call needs, captured when the operation starts.
struct Context {
    tracker: Arc<dyn IssueTracker>,
    scope: RepoScope,
    epoch: u64,
}

struct EngineInner {
    source: Arc<dyn ClientSource>,
    options: FetchOptions,
    scope: Mutex<Option<RepoScope>>,
    state: Mutex<BoardState>,
    status: Mutex<Status>,
    refresh_generation: AtomicU64,
    scope_epoch: AtomicU64,
    events: broadcast::Sender<BoardEvent>,
}

/// Cheap to clone; clones share the same board.
#[derive(Clone)]
pub struct BoardEngine {
    inner: Arc<EngineInner>,
}

impl BoardEngine {
    pub fn new(source: Arc<dyn ClientSource>, options: FetchOptions) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(EngineInner {
                source,
                options,
                scope: Mutex::new(None),
                state: Mutex::new(BoardState::new()),
                status: Mutex::new(Status::default()),
                refresh_generation: AtomicU64::new(0),
                scope_epoch: AtomicU64::new(0),
                events,
            }),
        }
    }

    // ── Scope ────────────────────────────────────────────────────────

    /// Bind the board to `scope`. The current board is discarded; call
    /// [`BoardEngine::refresh`] to populate it.
    pub fn select_scope(&self, scope: RepoScope) {
        self.inner.reset_scope(Some(scope));
    }

    pub fn clear_scope(&self) {
        self.inner.reset_scope(None);
    }

    pub fn scope(&self) -> Option<RepoScope> {
        lock(&self.inner.scope).clone()
    }

    // ── Rendering surface ────────────────────────────────────────────

    pub fn snapshot(&self) -> BoardState {
        lock(&self.inner.state).clone()
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.inner.status).loading
    }

    pub fn error(&self) -> Option<String> {
        lock(&self.inner.status).error.clone()
    }

    pub fn clear_error(&self) {
        lock(&self.inner.status).error = None;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.inner.events.subscribe()
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Replace the board with a fresh fetch. A failure leaves the previous board in
    /// place. A result overtaken by a newer refresh or a scope change is dropped.
    pub async fn refresh(&self) -> Result<(), BoardError> {
        let Some(ctx) = self.inner.context() else {
            tracing::debug!("Refresh skipped: no client or no scope");
            return Ok(());
        };

        let generation = self.inner.refresh_generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut status = lock(&self.inner.status);
            status.loading = true;
            status.error = None;
        }

        let result = pipeline::refresh(ctx.tracker.as_ref(), &ctx.scope, self.inner.options).await;

        let mut state = lock(&self.inner.state);
        if !self.inner.is_current(generation, ctx.epoch) {
            tracing::warn!(scope = %ctx.scope, generation, "Discarding stale refresh result");
            return Ok(());
        }

        let mut status = lock(&self.inner.status);
        status.loading = false;
        match result {
            Ok(fresh) => {
                let total = fresh.len();
                *state = fresh;
                drop(status);
                drop(state);
                broadcast_event(&self.inner.events, BoardEvent::BoardReplaced { total });
                Ok(())
            }
            Err(e) => {
                status.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Move `number` from `from` to the head of `to`.
    ///
    /// The local move happens before this returns. The remote write runs on the
    /// Tokio runtime; the returned handle resolves to its outcome. `None` means
    /// nothing happened: same column, no client or scope, or the item is not in
    /// `from` (the board diverged; the next refresh fixes it).
    pub fn move_issue(
        &self,
        number: u64,
        from: Column,
        to: Column,
    ) -> Option<JoinHandle<Result<(), BoardError>>> {
        if from == to {
            tracing::debug!(number, column = %from, "Move skipped: same column");
            return None;
        }
        let ctx = self.inner.context()?;

        {
            let mut state = lock(&self.inner.state);
            let Some(mut issue) = state.take(from, number) else {
                tracing::debug!(number, column = %from, "Move skipped: issue not in source column");
                return None;
            };
            issue.labels = mapper::labels_after_move(&issue.labels, to);
            state.push_front(to, issue);
        }
        broadcast_event(&self.inner.events, BoardEvent::IssueMoved { number, from, to });

        let inner = Arc::clone(&self.inner);
        Some(tokio::spawn(async move {
            inner.write_move(ctx, number, to).await
        }))
    }

    /// Move `number` onto a raw drop target, which may be a column or another card.
    pub fn drop_issue(
        &self,
        number: u64,
        target: DropTarget,
    ) -> Option<JoinHandle<Result<(), BoardError>>> {
        let (from, to) = {
            let state = lock(&self.inner.state);
            (state.locate(number)?, state.resolve_drop(target)?)
        };
        self.move_issue(number, from, to)
    }

    /// Create an issue in `column` and put it at the head of that column.
    ///
    /// Returns the created issue, or `None` when there is no client or scope.
    pub async fn create_issue(
        &self,
        title: &str,
        body: &str,
        column: Column,
        kind: Option<IssueKind>,
    ) -> Result<Option<Issue>, BoardError> {
        let Some(ctx) = self.inner.context() else {
            return Ok(None);
        };
        let title = non_empty_title(title)?;

        let input = CreateIssueInput {
            title,
            body: body.trim().to_string(),
            labels: mapper::labels_for_new(column, kind),
        };
        let created = match ctx.tracker.create_issue(&ctx.scope, &input).await {
            Ok(issue) => issue,
            Err(e) => {
                let err = BoardError::write(WriteOperation::Create, None, &e);
                self.inner.report_write_failure(&ctx, WriteOperation::Create, None, &err, &e);
                return Err(err);
            }
        };

        if self.inner.epoch_is(ctx.epoch) {
            let mut state = lock(&self.inner.state);
            if state.replace(created.clone()).is_none() {
                state.push_front(column, created.clone());
            }
            drop(state);
            broadcast_event(
                &self.inner.events,
                BoardEvent::IssueCreated {
                    issue: created.clone(),
                },
            );
        }
        tracing::info!(scope = %ctx.scope, number = created.number, column = %column, "Created issue");
        Ok(Some(created))
    }

    /// Rewrite title, body and kind of `number`. Column membership never changes.
    ///
    /// Nothing is applied locally until the remote confirms; a failure leaves the
    /// board as it was.
    pub async fn update_issue(
        &self,
        number: u64,
        title: &str,
        body: &str,
        kind: Option<IssueKind>,
    ) -> Result<Option<Issue>, BoardError> {
        let Some(ctx) = self.inner.context() else {
            return Ok(None);
        };
        let title = non_empty_title(title)?;

        let fail = |e: TrackerError| {
            let err = BoardError::write(WriteOperation::Update, Some(number), &e);
            self.inner
                .report_write_failure(&ctx, WriteOperation::Update, Some(number), &err, &e);
            err
        };

        let current = ctx
            .tracker
            .get_issue(&ctx.scope, number)
            .await
            .map_err(&fail)?;
        let labels = mapper::collapse_column_labels(&mapper::labels_after_retype(&current.labels, kind));
        let input = UpdateIssueInput {
            title: Some(title),
            body: Some(body.trim().to_string()),
            labels: Some(mapper::label_names(&labels)),
        };
        let updated = ctx
            .tracker
            .update_issue(&ctx.scope, number, &input)
            .await
            .map_err(&fail)?;

        if self.inner.epoch_is(ctx.epoch) {
            let replaced = lock(&self.inner.state).replace(updated.clone());
            if replaced.is_some() {
                broadcast_event(
                    &self.inner.events,
                    BoardEvent::IssueUpdated {
                        issue: updated.clone(),
                    },
                );
            }
        }
        tracing::info!(scope = %ctx.scope, number, "Updated issue");
        Ok(Some(updated))
    }
}

fn non_empty_title(title: &str) -> Result<String, BoardError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(BoardError::InvalidInput("title must not be empty".into()));
    }
    Ok(title.to_string())
}

impl EngineInner {
    fn context(&self) -> Option<Context> {
        let tracker = self.source.client()?;
        let scope = lock(&self.scope).clone()?;
        Some(Context {
            tracker,
            scope,
            epoch: self.scope_epoch.load(Ordering::SeqCst),
        })
    }

    fn epoch_is(&self, epoch: u64) -> bool {
        self.scope_epoch.load(Ordering::SeqCst) == epoch
    }

    fn is_current(&self, generation: u64, epoch: u64) -> bool {
        self.refresh_generation.load(Ordering::SeqCst) == generation && self.epoch_is(epoch)
    }

    fn reset_scope(&self, scope: Option<RepoScope>) {
        self.scope_epoch.fetch_add(1, Ordering::SeqCst);
        self.refresh_generation.fetch_add(1, Ordering::SeqCst);
        *lock(&self.scope) = scope.clone();
        *lock(&self.state) = BoardState::new();
        *lock(&self.status) = Status::default();
        tracing::debug!(scope = ?scope.as_ref().map(ToString::to_string), "Scope changed");
        broadcast_event(&self.events, BoardEvent::ScopeChanged { scope });
    }

    /// Remote half of a move: re-read labels, rewrite the column, write back.
    async fn write_move(&self, ctx: Context, number: u64, to: Column) -> Result<(), BoardError> {
        let fail = |e: TrackerError| {
            let err = BoardError::write(WriteOperation::Move, Some(number), &e);
            self.report_write_failure(&ctx, WriteOperation::Move, Some(number), &err, &e);
            err
        };

        let fresh = ctx
            .tracker
            .get_issue(&ctx.scope, number)
            .await
            .map_err(&fail)?;
        let labels = mapper::labels_after_move(&fresh.labels, to);
        let input = UpdateIssueInput {
            labels: Some(mapper::label_names(&labels)),
            ..Default::default()
        };
        let canonical = ctx
            .tracker
            .update_issue(&ctx.scope, number, &input)
            .await
            .map_err(&fail)?;
        tracing::debug!(scope = %ctx.scope, number, column = %to, "Move persisted");

        // Adopt the canonical item only if nothing moved it again meanwhile.
        if self.epoch_is(ctx.epoch) && canonical.column() == to {
            let mut state = lock(&self.state);
            if state.locate(number) == Some(to) {
                state.replace(canonical);
            }
        }
        Ok(())
    }

    fn report_write_failure(
        &self,
        ctx: &Context,
        operation: WriteOperation,
        number: Option<u64>,
        err: &BoardError,
        cause: &TrackerError,
    ) {
        tracing::warn!(
            scope = %ctx.scope,
            operation = %operation,
            number = ?number,
            error = %cause,
            "Remote write failed"
        );
        if !self.epoch_is(ctx.epoch) {
            return;
        }
        lock(&self.status).error = Some(err.to_string());
        broadcast_event(
            &self.events,
            BoardEvent::WriteFailed {
                operation,
                number,
                message: err.to_string(),
            },
        );
    }
}
