//! # Lexiloop Core Library
//!
//! This library provides the core business logic for the Lexiloop vocabulary
//! trainer. Every operation is available through the standalone `lexiloop`
//! CLI binary, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Review Engine**: A spaced-repetition scheduler with a fixed interval
//!   table and a session state machine that walks a snapshot of due items
//! - **Storage**: SQLite-based vocabulary, study log and mistake storage plus
//!   TOML-based configuration
//! - **Transfer**: CSV import with multilingual header detection and export
//! - **Stats**: Study activity logging and windowed summaries
//!
//! ## Key Components
//!
//! - [`ReviewEngine`]: Review session state machine
//! - [`ItemRepository`]: Persistence seam the engine reads and writes through
//! - [`Database`]: Vocabulary, study log and mistake persistence
//! - [`Config`]: Application configuration management
//! - [`Event`]: Everything the engine reports to its caller

pub mod clock;
pub mod error;
pub mod events;
pub mod mistakes;
pub mod repository;
pub mod review;
pub mod stats;
pub mod storage;
pub mod vocabulary;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{
    ConfigError, CoreError, DatabaseError, RepositoryError, ReviewError, TransferError,
    ValidationError,
};
pub use events::Event;
pub use mistakes::{Mistake, MistakeStatus, NewMistake};
pub use repository::{InMemoryRepository, ItemRepository};
pub use review::{
    apply_outcome, due_count, due_items, interval_for, ReviewEngine, ReviewFields, ReviewOutcome,
    SessionState, SessionSummary, INTERVAL_MINUTES,
};
pub use stats::{StudyActivity, StudyLog, StudyStats};
pub use storage::{Config, Database};
pub use vocabulary::{ItemId, MasteryLevel, NewVocabulary, VocabularyFilter, VocabularyItem};
