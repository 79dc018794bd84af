//! Review session events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::review::{ReviewOutcome, SessionState, SessionSummary};
use crate::vocabulary::{ItemId, MasteryLevel};

/// Every review-session state change produces an Event.
/// Front ends render them; the CLI prints them as JSON lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        total: usize,
        at: DateTime<Utc>,
    },
    /// An outcome was applied and persisted.
    ReviewRecorded {
        item_id: ItemId,
        outcome: ReviewOutcome,
        review_count: u32,
        mastery_level: MasteryLevel,
        next_review_at: DateTime<Utc>,
        cursor: usize,
        total: usize,
        at: DateTime<Utc>,
    },
    /// The item vanished from the repository; the cursor moved past it.
    ItemSkipped {
        item_id: ItemId,
        cursor: usize,
        total: usize,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        summary: SessionSummary,
        at: DateTime<Utc>,
    },
    /// Session abandoned; unprocessed items were left untouched.
    SessionAborted {
        summary: SessionSummary,
        remaining: usize,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: SessionState,
        due_count: usize,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::SessionStarted { at, .. }
            | Event::ReviewRecorded { at, .. }
            | Event::ItemSkipped { at, .. }
            | Event::SessionCompleted { at, .. }
            | Event::SessionAborted { at, .. }
            | Event::StateSnapshot { at, .. } => *at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let at = Utc::now();
        let json = serde_json::to_value(Event::SessionStarted { total: 3, at }).unwrap();
        assert_eq!(json["type"], "SessionStarted");
        assert_eq!(json["total"], 3);
    }

    #[test]
    fn review_recorded_roundtrip() {
        let at = Utc::now();
        let event = Event::ReviewRecorded {
            item_id: ItemId(4),
            outcome: ReviewOutcome::Correct,
            review_count: 2,
            mastery_level: MasteryLevel::new(3).unwrap(),
            next_review_at: at,
            cursor: 1,
            total: 2,
            at,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"outcome\":\"correct\""));
        assert!(json.contains("\"mastery_level\":3"));
        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
        assert_eq!(parsed.at(), at);
    }
}
