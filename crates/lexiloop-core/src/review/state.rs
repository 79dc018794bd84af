//! Review state machine.
//!
//! The single authority for how one recall outcome changes an item's
//! review-tracking fields. Pure: the caller supplies `now` and persists the
//! returned [`ReviewFields`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::interval::interval_for;
use crate::error::ValidationError;
use crate::vocabulary::{MasteryLevel, VocabularyItem};

/// Result of one recall attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewOutcome {
    Correct,
    Incorrect,
}

impl From<bool> for ReviewOutcome {
    fn from(correct: bool) -> Self {
        if correct {
            ReviewOutcome::Correct
        } else {
            ReviewOutcome::Incorrect
        }
    }
}

impl fmt::Display for ReviewOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewOutcome::Correct => write!(f, "correct"),
            ReviewOutcome::Incorrect => write!(f, "incorrect"),
        }
    }
}

impl FromStr for ReviewOutcome {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" | "correct" | "1" | "true" => Ok(ReviewOutcome::Correct),
            "n" | "no" | "incorrect" | "0" | "false" => Ok(ReviewOutcome::Incorrect),
            other => Err(ValidationError::InvalidValue {
                field: "outcome".into(),
                message: format!("expected y/n or correct/incorrect, got '{other}'"),
            }),
        }
    }
}

/// The review-tracking fields written back after an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewFields {
    pub review_count: u32,
    pub mastery_level: MasteryLevel,
    pub next_review_at: DateTime<Utc>,
}

impl ReviewFields {
    /// Current fields of an item, before any outcome.
    pub fn of(item: &VocabularyItem) -> Self {
        Self {
            review_count: item.review_count,
            mastery_level: item.mastery_level,
            next_review_at: item.next_review_at,
        }
    }

    /// Copy these fields onto an item.
    pub fn apply_to(&self, item: &mut VocabularyItem) {
        item.review_count = self.review_count;
        item.mastery_level = self.mastery_level;
        item.next_review_at = self.next_review_at;
    }
}

/// Compute the fields an item should have after `outcome` at `now`.
///
/// A correct answer bumps the review count and mastery and waits for the
/// interval of the new count. An incorrect answer steps both back by one
/// (floored at 0 and 1) and always waits the shortest interval.
pub fn apply_outcome(
    item: &VocabularyItem,
    outcome: ReviewOutcome,
    now: DateTime<Utc>,
) -> ReviewFields {
    next_fields(ReviewFields::of(item), outcome, now)
}

/// [`apply_outcome`] on bare fields.
pub fn next_fields(current: ReviewFields, outcome: ReviewOutcome, now: DateTime<Utc>) -> ReviewFields {
    match outcome {
        ReviewOutcome::Correct => {
            let review_count = current.review_count.saturating_add(1);
            ReviewFields {
                review_count,
                mastery_level: current.mastery_level.raise(),
                next_review_at: after(now, interval_for(review_count)),
            }
        }
        ReviewOutcome::Incorrect => ReviewFields {
            review_count: current.review_count.saturating_sub(1),
            mastery_level: current.mastery_level.lower(),
            next_review_at: after(now, interval_for(0)),
        },
    }
}

/// `now + wait`, pinned to the latest representable instant instead of
/// overflowing.
fn after(now: DateTime<Utc>, wait: Duration) -> DateTime<Utc> {
    now.checked_add_signed(wait).unwrap_or(DateTime::<Utc>::MAX_UTC)
}
