//! Review session controller.
//!
//! Drives one user-facing review loop over a snapshot of due items. Each
//! submitted outcome is run through the review state machine and persisted
//! before the cursor moves.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> InProgress(0, n) --submit--> ... --submit--> Completed
//!                      |
//!                      +--abort--> Idle
//! ```
//!
//! The item list is captured once at `start_session`. Items that become due
//! again during the session (for example after an incorrect answer) are not
//! re-queued; the caller re-runs the due query for the next session.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::due::due_items;
use super::state::{apply_outcome, ReviewOutcome};
use crate::error::{RepositoryError, ReviewError};
use crate::events::Event;
use crate::repository::ItemRepository;
use crate::vocabulary::{ItemId, VocabularyItem};

/// Externally visible session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    InProgress { cursor: usize, total: usize },
    Completed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::InProgress { cursor, total } => {
                write!(f, "in progress ({cursor}/{total})")
            }
            SessionState::Completed => write!(f, "completed"),
        }
    }
}

/// Running tally for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub skipped: Vec<ItemId>,
    pub started_at: DateTime<Utc>,
}

impl SessionSummary {
    fn new(total: usize, started_at: DateTime<Utc>) -> Self {
        Self {
            total,
            correct: 0,
            incorrect: 0,
            skipped: Vec::new(),
            started_at,
        }
    }

    /// Outcomes applied and persisted.
    pub fn applied(&self) -> usize {
        self.correct + self.incorrect
    }

    /// Items the cursor has moved past, applied or skipped.
    pub fn processed(&self) -> usize {
        self.applied() + self.skipped.len()
    }

    /// Share of applied outcomes that were correct, 0..=100.
    pub fn accuracy_pct(&self) -> Option<f64> {
        let applied = self.applied();
        if applied == 0 {
            return None;
        }
        Some(self.correct as f64 / applied as f64 * 100.0)
    }

    fn record(&mut self, outcome: ReviewOutcome) {
        match outcome {
            ReviewOutcome::Correct => self.correct += 1,
            ReviewOutcome::Incorrect => self.incorrect += 1,
        }
    }
}

/// One pass over a captured set of due items. Never persisted.
#[derive(Debug, Clone)]
struct ReviewSession {
    items: Vec<ItemId>,
    cursor: usize,
    summary: SessionSummary,
}

impl ReviewSession {
    fn current(&self) -> Option<ItemId> {
        self.items.get(self.cursor).copied()
    }

    fn is_exhausted(&self) -> bool {
        self.cursor >= self.items.len()
    }
}

#[derive(Debug, Clone)]
enum Phase {
    Idle,
    InProgress(ReviewSession),
    Completed(SessionSummary),
}

/// Review engine: due query plus a single session controller over an
/// injected [`ItemRepository`].
#[derive(Debug)]
pub struct ReviewEngine<R> {
    repo: R,
    phase: Phase,
    max_items: Option<usize>,
}

impl<R: ItemRepository> ReviewEngine<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            phase: Phase::Idle,
            max_items: None,
        }
    }

    /// Cap the number of items captured per session. `0` means unlimited.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = (max_items > 0).then_some(max_items);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        match &self.phase {
            Phase::Idle => SessionState::Idle,
            Phase::InProgress(session) => SessionState::InProgress {
                cursor: session.cursor,
                total: session.items.len(),
            },
            Phase::Completed(_) => SessionState::Completed,
        }
    }

    /// `(cursor, total)` while a session is running.
    pub fn progress(&self) -> Option<(usize, usize)> {
        match &self.phase {
            Phase::InProgress(session) => Some((session.cursor, session.items.len())),
            _ => None,
        }
    }

    /// Tally of the running or just-completed session.
    pub fn summary(&self) -> Option<&SessionSummary> {
        match &self.phase {
            Phase::InProgress(session) => Some(&session.summary),
            Phase::Completed(summary) => Some(summary),
            Phase::Idle => None,
        }
    }

    /// Id of the item awaiting an outcome.
    pub fn current_item_id(&self) -> Option<ItemId> {
        match &self.phase {
            Phase::InProgress(session) => session.current(),
            _ => None,
        }
    }

    /// Fresh read of the item awaiting an outcome, for display.
    pub fn current_item(&self) -> Option<Result<VocabularyItem, RepositoryError>> {
        self.current_item_id().map(|id| self.repo.get(id))
    }

    /// Items due at `now`. Does not touch the session.
    pub fn due_items(&self, now: DateTime<Utc>) -> Result<Vec<VocabularyItem>, ReviewError> {
        due_items(&self.repo, now).map_err(ReviewError::Query)
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn repository_mut(&mut self) -> &mut R {
        &mut self.repo
    }

    pub fn into_repository(self) -> R {
        self.repo
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Capture `items` as a new session.
    ///
    /// # Errors
    /// `EmptySession` for an empty list, `InvalidState` while another
    /// session is in progress.
    pub fn start_session(
        &mut self,
        items: &[VocabularyItem],
        now: DateTime<Utc>,
    ) -> Result<Event, ReviewError> {
        if let Phase::InProgress(_) = self.phase {
            return Err(ReviewError::InvalidState {
                operation: "start a session",
                state: self.state(),
            });
        }
        if items.is_empty() {
            return Err(ReviewError::EmptySession);
        }

        let limit = self.max_items.unwrap_or(items.len()).min(items.len());
        let ids: Vec<ItemId> = items[..limit].iter().map(|item| item.id).collect();
        let total = ids.len();
        self.phase = Phase::InProgress(ReviewSession {
            items: ids,
            cursor: 0,
            summary: SessionSummary::new(total, now),
        });
        tracing::info!(total, "review session started");
        Ok(Event::SessionStarted { total, at: now })
    }

    /// Apply `outcome` to the current item and advance.
    ///
    /// Returns the `ReviewRecorded` or `ItemSkipped` event, followed by
    /// `SessionCompleted` when this was the last item.
    ///
    /// # Errors
    /// `InvalidState` unless a session is in progress. `Persistence` when
    /// the repository rejects the read or write; the cursor stays put and
    /// the same outcome may be resubmitted.
    pub fn submit_outcome(
        &mut self,
        outcome: ReviewOutcome,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, ReviewError> {
        let state = self.state();
        let Phase::InProgress(session) = &mut self.phase else {
            return Err(ReviewError::InvalidState {
                operation: "submit an outcome",
                state,
            });
        };
        let Some(item_id) = session.current() else {
            return Err(ReviewError::InvalidState {
                operation: "submit an outcome",
                state,
            });
        };
        let total = session.items.len();

        let applied = match self.repo.get(item_id) {
            Ok(item) => {
                let fields = apply_outcome(&item, outcome, now);
                match self.repo.update(item_id, &fields) {
                    Ok(()) => Some(fields),
                    Err(RepositoryError::NotFound(_)) => None,
                    Err(source) => {
                        tracing::warn!(%item_id, error = %source, "failed to persist review");
                        return Err(ReviewError::Persistence { item_id, source });
                    }
                }
            }
            Err(RepositoryError::NotFound(_)) => None,
            Err(source) => {
                tracing::warn!(%item_id, error = %source, "failed to load item for review");
                return Err(ReviewError::Persistence { item_id, source });
            }
        };

        session.cursor += 1;
        let cursor = session.cursor;
        let mut events = Vec::with_capacity(2);
        match applied {
            Some(fields) => {
                session.summary.record(outcome);
                tracing::debug!(
                    %item_id,
                    %outcome,
                    review_count = fields.review_count,
                    mastery = fields.mastery_level.get(),
                    "review recorded"
                );
                events.push(Event::ReviewRecorded {
                    item_id,
                    outcome,
                    review_count: fields.review_count,
                    mastery_level: fields.mastery_level,
                    next_review_at: fields.next_review_at,
                    cursor,
                    total,
                    at: now,
                });
            }
            None => {
                session.summary.skipped.push(item_id);
                tracing::warn!(%item_id, "item no longer exists, skipping");
                events.push(Event::ItemSkipped {
                    item_id,
                    cursor,
                    total,
                    at: now,
                });
            }
        }

        if session.is_exhausted() {
            let summary = session.summary.clone();
            tracing::info!(
                correct = summary.correct,
                incorrect = summary.incorrect,
                skipped = summary.skipped.len(),
                "review session completed"
            );
            events.push(Event::SessionCompleted {
                summary: summary.clone(),
                at: now,
            });
            self.phase = Phase::Completed(summary);
        }
        Ok(events)
    }

    /// Abandon the running session. Items already reviewed stay persisted;
    /// the rest keep their previous schedule.
    ///
    /// # Errors
    /// `InvalidState` unless a session is in progress.
    pub fn abort(&mut self, now: DateTime<Utc>) -> Result<Event, ReviewError> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::InProgress(session) => {
                let remaining = session.items.len() - session.cursor;
                tracing::info!(remaining, "review session aborted");
                Ok(Event::SessionAborted {
                    summary: session.summary,
                    remaining,
                    at: now,
                })
            }
            other => {
                self.phase = other;
                Err(ReviewError::InvalidState {
                    operation: "abort",
                    state: self.state(),
                })
            }
        }
    }
}
