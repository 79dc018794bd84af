//! Mistake book: wrongly answered practice questions kept for later review.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MistakeStatus {
    #[default]
    Pending,
    Reviewed,
}

impl MistakeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MistakeStatus::Pending => "pending",
            MistakeStatus::Reviewed => "reviewed",
        }
    }
}

impl fmt::Display for MistakeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MistakeStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MistakeStatus::Pending),
            "reviewed" => Ok(MistakeStatus::Reviewed),
            other => Err(ValidationError::InvalidValue {
                field: "status".into(),
                message: format!("unknown mistake status '{other}'"),
            }),
        }
    }
}

/// Input for recording a mistake.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMistake {
    #[serde(default)]
    pub question_id: Option<String>,
    pub subject: String,
    pub language: String,
    pub level: String,
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

impl NewMistake {
    pub fn validate(self) -> Result<Self, ValidationError> {
        if self.question.trim().is_empty() {
            return Err(ValidationError::EmptyField("question"));
        }
        if self.correct_answer.trim().is_empty() {
            return Err(ValidationError::EmptyField("correct_answer"));
        }
        Ok(self)
    }
}

/// A stored mistake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mistake {
    pub id: i64,
    #[serde(flatten)]
    pub details: NewMistake,
    pub recorded_at: DateTime<Utc>,
    pub status: MistakeStatus,
}
