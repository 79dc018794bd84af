//! Spaced-repetition review engine.
//!
//! - [`interval`]: the fixed forgetting-curve interval table
//! - [`state`]: how one outcome changes an item's review fields
//! - [`due`]: which items are eligible at a given instant
//! - [`session`]: the controller driving one review loop

pub mod due;
pub mod interval;
pub mod session;
pub mod state;

pub use due::{due_count, due_items};
pub use interval::{interval_for, interval_minutes, INTERVAL_MINUTES};
pub use session::{ReviewEngine, SessionState, SessionSummary};
pub use state::{apply_outcome, next_fields, ReviewFields, ReviewOutcome};
