//! Database schema migrations for lexiloop.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 3;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }
    if current_version < 3 {
        migrate_v3(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Current schema version, 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> SqliteResult<i32> {
    match conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    }) {
        Ok(version) => Ok(version),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: vocabulary bank and key-value store.
///
/// Timestamps are epoch milliseconds so due-time range queries compare
/// integers.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS vocabulary (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            word           TEXT NOT NULL,
            translation    TEXT NOT NULL DEFAULT '',
            example        TEXT NOT NULL DEFAULT '',
            pronunciation  TEXT NOT NULL DEFAULT '',
            notes          TEXT NOT NULL DEFAULT '',
            language       TEXT NOT NULL,
            level          TEXT NOT NULL,
            review_count   INTEGER NOT NULL DEFAULT 0,
            mastery_level  INTEGER NOT NULL DEFAULT 1,
            next_review_at INTEGER NOT NULL,
            created_at     INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;
    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: study log and mistake book.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS study_logs (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            subject       TEXT NOT NULL,
            language      TEXT NOT NULL DEFAULT '',
            activity      TEXT NOT NULL,
            duration_secs INTEGER NOT NULL DEFAULT 0,
            score         REAL,
            recorded_at   INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS mistakes (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            question_id    TEXT,
            subject        TEXT NOT NULL,
            language       TEXT NOT NULL,
            level          TEXT NOT NULL,
            question       TEXT NOT NULL,
            user_answer    TEXT NOT NULL DEFAULT '',
            correct_answer TEXT NOT NULL,
            explanation    TEXT NOT NULL DEFAULT '',
            recorded_at    INTEGER NOT NULL,
            status         TEXT NOT NULL DEFAULT 'pending'
        );",
    )?;
    set_schema_version(&tx, 2)?;
    tx.commit()
}

/// Migration v3: indexes for the due query and common filters.
fn migrate_v3(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_vocabulary_next_review_at ON vocabulary(next_review_at);
         CREATE INDEX IF NOT EXISTS idx_vocabulary_language_level ON vocabulary(language, level);
         CREATE INDEX IF NOT EXISTS idx_study_logs_recorded_at ON study_logs(recorded_at);
         CREATE INDEX IF NOT EXISTS idx_mistakes_status ON mistakes(status);",
    )?;
    set_schema_version(&tx, 3)?;
    tx.commit()
}
