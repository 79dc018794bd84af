//! Core error types for lexiloop-core.
//!
//! Every fallible operation in the library reports one of the enums below.
//! The review engine keeps its own taxonomy ([`ReviewError`]) so callers can
//! tell a contract violation apart from a retryable persistence failure.

use std::path::PathBuf;
use thiserror::Error;

use crate::review::SessionState;
use crate::vocabulary::ItemId;

/// Core error type for lexiloop-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Review engine errors
    #[error("Review error: {0}")]
    Review(#[from] ReviewError),

    /// Repository errors surfaced outside a review session
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Import/export errors
    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Could not resolve the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// A row referenced by id does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty
    #[error("Field '{0}' must not be empty")]
    EmptyField(&'static str),

    /// Numeric value outside its allowed range
    #[error("Value {value} for '{field}' is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Failures reported by an [`ItemRepository`](crate::repository::ItemRepository).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No item with this id exists.
    #[error("vocabulary item {0} not found")]
    NotFound(ItemId),

    /// The store could not complete the read or write.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl RepositoryError {
    /// Persistence failures may succeed on a later attempt; a missing item never will.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RepositoryError::Persistence(_))
    }
}

/// Review session errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    /// A session operation was invoked in a state that does not allow it.
    #[error("cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    /// `start_session` was given nothing to review.
    #[error("cannot start a review session without due items")]
    EmptySession,

    /// Writing the new review fields failed; the cursor did not advance.
    #[error("failed to persist review of item {item_id}: {source}")]
    Persistence {
        item_id: ItemId,
        #[source]
        source: RepositoryError,
    },

    /// The due-set query itself failed.
    #[error("due query failed: {0}")]
    Query(#[source] RepositoryError),
}

impl ReviewError {
    /// Whether resubmitting the same outcome may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ReviewError::Persistence { source, .. } | ReviewError::Query(source) => {
                source.is_retryable()
            }
            _ => false,
        }
    }
}

/// CSV import/export errors.
#[derive(Error, Debug)]
pub enum TransferError {
    /// Malformed CSV input or writer failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The sheet has no header row or no data rows
    #[error("file is empty or malformed: a header row and at least one data row are required")]
    NotEnoughRows,

    /// No header matched a word column
    #[error("no word column found (accepted headers include word, 単語, 单词, palabra)")]
    MissingWordColumn,

    /// Import needs a language and a level
    #[error("language and level are required for import")]
    MissingClassification,

    /// Export selection was empty
    #[error("no vocabulary matches the export filter")]
    NothingToExport,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked
                    || code.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

impl From<DatabaseError> for RepositoryError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { id, .. } => RepositoryError::NotFound(ItemId(id)),
            other => RepositoryError::Persistence(other.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
