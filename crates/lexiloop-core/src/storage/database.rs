//! SQLite-based storage.
//!
//! Provides persistent storage for:
//! - The vocabulary bank and its review schedule
//! - Study activity logs and statistics
//! - The mistake book
//! - Key-value store for application state
//!
//! Timestamps are stored as epoch milliseconds.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{data_dir, migrations};
use crate::error::{CoreError, DatabaseError, RepositoryError};
use crate::mistakes::{Mistake, MistakeStatus, NewMistake};
use crate::repository::ItemRepository;
use crate::review::ReviewFields;
use crate::stats::{StudyActivity, StudyLog, StudyStats};
use crate::vocabulary::{ItemId, MasteryLevel, NewVocabulary, VocabularyFilter, VocabularyItem};

const VOCABULARY_COLUMNS: &str = "id, word, translation, example, pronunciation, notes, language, level,
     review_count, mastery_level, next_review_at, created_at";

const MISTAKE_COLUMNS: &str = "id, question_id, subject, language, level, question, user_answer,
     correct_answer, explanation, recorded_at, status";

/// SQLite database backing the vocabulary bank.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data dir>/lexiloop.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let dir = data_dir().map_err(|e| DatabaseError::DataDir(e.to_string()))?;
        Self::open_at(dir.join("lexiloop.db"))
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let conn = Connection::open(&path)
            .map_err(|source| DatabaseError::OpenFailed { path, source })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for tests and dry runs).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, DatabaseError> {
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // ── Vocabulary ───────────────────────────────────────────────────

    /// Validate and insert one entry in its initial review state.
    ///
    /// # Errors
    /// Returns a validation error for an empty word, or a database error.
    pub fn add_vocabulary(
        &self,
        entry: NewVocabulary,
        now: DateTime<Utc>,
    ) -> Result<VocabularyItem, CoreError> {
        let entry = entry.validate()?;
        let id = insert_vocabulary(&self.conn, &entry, now)?;
        self.get_vocabulary(id)?
            .ok_or_else(|| DatabaseError::NotFound {
                entity: "vocabulary item",
                id: id.0,
            }.into())
    }

    /// Validate and insert many entries in one transaction. Nothing is
    /// stored when any entry fails validation.
    ///
    /// # Errors
    /// Returns a validation error for an entry with an empty word, or a
    /// database error.
    pub fn import_vocabulary(
        &mut self,
        entries: &[NewVocabulary],
        now: DateTime<Utc>,
    ) -> Result<Vec<ItemId>, CoreError> {
        let tx = self.conn.transaction()?;
        let mut ids = Vec::with_capacity(entries.len());
        for entry in entries {
            let entry = entry.clone().validate()?;
            ids.push(insert_vocabulary(&tx, &entry, now)?);
        }
        tx.commit()?;
        tracing::info!(count = ids.len(), "imported vocabulary");
        Ok(ids)
    }

    pub fn get_vocabulary(&self, id: ItemId) -> Result<Option<VocabularyItem>, DatabaseError> {
        let item = self
            .conn
            .query_row(
                &format!("SELECT {VOCABULARY_COLUMNS} FROM vocabulary WHERE id = ?1"),
                params![id.0],
                row_to_item,
            )
            .optional()?;
        Ok(item)
    }

    /// All entries matching `filter`, oldest first.
    pub fn list_vocabulary(
        &self,
        filter: &VocabularyFilter,
    ) -> Result<Vec<VocabularyItem>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {VOCABULARY_COLUMNS} FROM vocabulary
             WHERE (?1 IS NULL OR language = ?1) AND (?2 IS NULL OR level = ?2)
             ORDER BY id ASC"
        ))?;
        let rows = stmt.query_map(params![filter.language, filter.level], row_to_item)?;
        let items = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Entries due at `now`, most overdue first.
    pub fn due_vocabulary(&self, now: DateTime<Utc>) -> Result<Vec<VocabularyItem>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {VOCABULARY_COLUMNS} FROM vocabulary
             WHERE next_review_at <= ?1
             ORDER BY next_review_at ASC, id ASC"
        ))?;
        let rows = stmt.query_map(params![millis(now)], row_to_item)?;
        let items = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    pub fn count_vocabulary(&self) -> Result<u64, DatabaseError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM vocabulary", [], |row| row.get::<_, u64>(0))?;
        Ok(count)
    }

    /// Returns `false` when no entry had this id.
    pub fn delete_vocabulary(&self, id: ItemId) -> Result<bool, DatabaseError> {
        let affected = self
            .conn
            .execute("DELETE FROM vocabulary WHERE id = ?1", params![id.0])?;
        Ok(affected > 0)
    }

    /// Overwrite the review-tracking fields of one entry.
    pub fn update_review_fields(
        &self,
        id: ItemId,
        fields: &ReviewFields,
    ) -> Result<(), DatabaseError> {
        let affected = self.conn.execute(
            "UPDATE vocabulary
             SET review_count = ?2, mastery_level = ?3, next_review_at = ?4
             WHERE id = ?1",
            params![
                id.0,
                fields.review_count,
                fields.mastery_level.get(),
                millis(fields.next_review_at),
            ],
        )?;
        if affected == 0 {
            return Err(DatabaseError::NotFound {
                entity: "vocabulary item",
                id: id.0,
            });
        }
        Ok(())
    }

    // ── Study log ────────────────────────────────────────────────────

    pub fn record_activity(
        &self,
        activity: &StudyActivity,
        now: DateTime<Utc>,
    ) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO study_logs (subject, language, activity, duration_secs, score, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                activity.subject,
                activity.language,
                activity.activity,
                activity.duration_secs,
                activity.score,
                millis(now),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Logs recorded strictly after `since`, oldest first.
    pub fn study_logs_since(&self, since: DateTime<Utc>) -> Result<Vec<StudyLog>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, subject, language, activity, duration_secs, score, recorded_at
             FROM study_logs
             WHERE recorded_at > ?1
             ORDER BY recorded_at ASC, id ASC",
        )?;
        let rows = stmt.query_map(params![millis(since)], |row| {
            Ok(StudyLog {
                id: row.get(0)?,
                activity: StudyActivity {
                    subject: row.get(1)?,
                    language: row.get(2)?,
                    activity: row.get(3)?,
                    duration_secs: row.get(4)?,
                    score: row.get(5)?,
                },
                recorded_at: timestamp(row, 6)?,
            })
        })?;
        let logs = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    /// Statistics over the last `days` days ending at `now`.
    pub fn study_stats(&self, now: DateTime<Utc>, days: u32) -> Result<StudyStats, DatabaseError> {
        let since = now
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let logs = self.study_logs_since(since)?;
        Ok(StudyStats::from_logs(&logs))
    }

    // ── Mistake book ─────────────────────────────────────────────────

    /// Validate and store a mistake as `pending`.
    pub fn add_mistake(&self, mistake: NewMistake, now: DateTime<Utc>) -> Result<Mistake, CoreError> {
        let mistake = mistake.validate()?;
        self.conn.execute(
            "INSERT INTO mistakes (question_id, subject, language, level, question, user_answer,
                                   correct_answer, explanation, recorded_at, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                mistake.question_id,
                mistake.subject,
                mistake.language,
                mistake.level,
                mistake.question,
                mistake.user_answer,
                mistake.correct_answer,
                mistake.explanation,
                millis(now),
                MistakeStatus::Pending.as_str(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_mistake(id)?
            .ok_or_else(|| DatabaseError::NotFound { entity: "mistake", id }.into())
    }

    pub fn get_mistake(&self, id: i64) -> Result<Option<Mistake>, DatabaseError> {
        let mistake = self
            .conn
            .query_row(
                &format!("SELECT {MISTAKE_COLUMNS} FROM mistakes WHERE id = ?1"),
                params![id],
                row_to_mistake,
            )
            .optional()?;
        Ok(mistake)
    }

    /// Mistakes, newest first, optionally restricted to one status.
    pub fn list_mistakes(&self, status: Option<MistakeStatus>) -> Result<Vec<Mistake>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MISTAKE_COLUMNS} FROM mistakes
             WHERE (?1 IS NULL OR status = ?1)
             ORDER BY recorded_at DESC, id DESC"
        ))?;
        let rows = stmt.query_map(params![status.map(MistakeStatus::as_str)], row_to_mistake)?;
        let mistakes = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(mistakes)
    }

    pub fn set_mistake_status(&self, id: i64, status: MistakeStatus) -> Result<(), DatabaseError> {
        let affected = self.conn.execute(
            "UPDATE mistakes SET status = ?2 WHERE id = ?1",
            params![id, status.as_str()],
        )?;
        if affected == 0 {
            return Err(DatabaseError::NotFound { entity: "mistake", id });
        }
        Ok(())
    }

    // ── Key-value store ──────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl ItemRepository for Database {
    fn get(&self, id: ItemId) -> Result<VocabularyItem, RepositoryError> {
        self.get_vocabulary(id)?
            .ok_or(RepositoryError::NotFound(id))
    }

    fn update(&mut self, id: ItemId, fields: &ReviewFields) -> Result<(), RepositoryError> {
        Ok(self.update_review_fields(id, fields)?)
    }

    fn query_due_before(&self, at: DateTime<Utc>) -> Result<Vec<VocabularyItem>, RepositoryError> {
        Ok(self.due_vocabulary(at)?)
    }
}

fn insert_vocabulary(
    conn: &Connection,
    entry: &NewVocabulary,
    now: DateTime<Utc>,
) -> Result<ItemId, DatabaseError> {
    conn.execute(
        "INSERT INTO vocabulary (word, translation, example, pronunciation, notes, language, level,
                                 review_count, mastery_level, next_review_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?9, ?9)",
        params![
            entry.word,
            entry.translation,
            entry.example,
            entry.pronunciation,
            entry.notes,
            entry.language,
            entry.level,
            MasteryLevel::MIN.get(),
            millis(now),
        ],
    )?;
    Ok(ItemId(conn.last_insert_rowid()))
}

fn millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let ms: i64 = row.get(idx)?;
    DateTime::from_timestamp_millis(ms).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, "timestamp out of range".into())
    })
}

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<VocabularyItem> {
    let review_count: i64 = row.get(8)?;
    let mastery: i64 = row.get(9)?;
    Ok(VocabularyItem {
        id: ItemId(row.get(0)?),
        word: row.get(1)?,
        translation: row.get(2)?,
        example: row.get(3)?,
        pronunciation: row.get(4)?,
        notes: row.get(5)?,
        language: row.get(6)?,
        level: row.get(7)?,
        review_count: u32::try_from(review_count.max(0)).unwrap_or(u32::MAX),
        mastery_level: MasteryLevel::clamped(mastery),
        next_review_at: timestamp(row, 10)?,
        created_at: timestamp(row, 11)?,
    })
}

fn row_to_mistake(row: &Row<'_>) -> rusqlite::Result<Mistake> {
    let status: String = row.get(10)?;
    let status = status.parse::<MistakeStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(10, Type::Text, Box::new(e))
    })?;
    Ok(Mistake {
        id: row.get(0)?,
        details: NewMistake {
            question_id: row.get(1)?,
            subject: row.get(2)?,
            language: row.get(3)?,
            level: row.get(4)?,
            question: row.get(5)?,
            user_answer: row.get(6)?,
            correct_answer: row.get(7)?,
            explanation: row.get(8)?,
        },
        recorded_at: timestamp(row, 9)?,
        status,
    })
}
