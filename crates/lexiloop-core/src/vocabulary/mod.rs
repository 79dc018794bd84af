//! Vocabulary data model.
//!
//! A [`VocabularyItem`] carries opaque display strings plus the three
//! review-tracking fields owned by the review engine (`review_count`,
//! `mastery_level`, `next_review_at`).

pub mod transfer;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Stable identifier assigned by the repository at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse mastery signal, always within `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct MasteryLevel(u8);

impl MasteryLevel {
    pub const MIN: MasteryLevel = MasteryLevel(1);
    pub const MAX: MasteryLevel = MasteryLevel(5);

    /// Build a level, rejecting values outside `1..=5`.
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if (Self::MIN.0..=Self::MAX.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::OutOfRange {
                field: "mastery_level",
                value: value as i64,
                min: Self::MIN.0 as i64,
                max: Self::MAX.0 as i64,
            })
        }
    }

    /// Build a level from an untrusted stored value, pinning it into range.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(Self::MIN.0 as i64, Self::MAX.0 as i64) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// One step up, saturating at 5.
    pub fn raise(self) -> Self {
        Self((self.0 + 1).min(Self::MAX.0))
    }

    /// One step down, saturating at 1.
    pub fn lower(self) -> Self {
        Self(self.0.saturating_sub(1).max(Self::MIN.0))
    }
}

impl Default for MasteryLevel {
    fn default() -> Self {
        Self::MIN
    }
}

impl TryFrom<u8> for MasteryLevel {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MasteryLevel> for u8 {
    fn from(level: MasteryLevel) -> Self {
        level.0
    }
}

impl fmt::Display for MasteryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX.0)
    }
}

/// A stored vocabulary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyItem {
    pub id: ItemId,
    pub word: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub example: String,
    #[serde(default)]
    pub pronunciation: String,
    #[serde(default)]
    pub notes: String,
    pub language: String,
    pub level: String,
    /// Consecutive correct reviews since the last reset.
    pub review_count: u32,
    pub mastery_level: MasteryLevel,
    /// The item is due once this instant has passed.
    pub next_review_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl VocabularyItem {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at <= now
    }
}

/// Input for creating a vocabulary entry, by hand or from an import row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewVocabulary {
    pub word: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub example: String,
    #[serde(default)]
    pub pronunciation: String,
    #[serde(default)]
    pub notes: String,
    pub language: String,
    pub level: String,
}

impl NewVocabulary {
    pub fn new(word: impl Into<String>, language: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            language: language.into(),
            level: level.into(),
            ..Default::default()
        }
    }

    pub fn translation(mut self, translation: impl Into<String>) -> Self {
        self.translation = translation.into();
        self
    }

    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.example = example.into();
        self
    }

    pub fn pronunciation(mut self, pronunciation: impl Into<String>) -> Self {
        self.pronunciation = pronunciation.into();
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Trim every field and reject an empty word.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        for field in [
            &mut self.word,
            &mut self.translation,
            &mut self.example,
            &mut self.pronunciation,
            &mut self.notes,
            &mut self.language,
            &mut self.level,
        ] {
            let trimmed = field.trim();
            if trimmed.len() != field.len() {
                *field = trimmed.to_string();
            }
        }
        if self.word.is_empty() {
            return Err(ValidationError::EmptyField("word"));
        }
        Ok(self)
    }

    /// Materialize the entry in its initial review state: never reviewed,
    /// mastery 1 and due immediately.
    pub fn into_item(self, id: ItemId, now: DateTime<Utc>) -> VocabularyItem {
        VocabularyItem {
            id,
            word: self.word,
            translation: self.translation,
            example: self.example,
            pronunciation: self.pronunciation,
            notes: self.notes,
            language: self.language,
            level: self.level,
            review_count: 0,
            mastery_level: MasteryLevel::MIN,
            next_review_at: now,
            created_at: now,
        }
    }
}

/// Classification filter used by listing and export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyFilter {
    pub language: Option<String>,
    pub level: Option<String>,
}

impl VocabularyFilter {
    pub fn matches(&self, item: &VocabularyItem) -> bool {
        self.language.as_deref().map_or(true, |l| l == item.language)
            && self.level.as_deref().map_or(true, |l| l == item.level)
    }
}
