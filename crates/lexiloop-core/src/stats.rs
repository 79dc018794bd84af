//! Study activity log and aggregate statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::review::SessionSummary;

/// Activity name recorded for a completed vocabulary review session.
pub const VOCABULARY_REVIEW: &str = "vocabulary_review";

/// One study activity to be logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyActivity {
    pub subject: String,
    pub language: String,
    pub activity: String,
    #[serde(default)]
    pub duration_secs: u64,
    /// Score out of 100, when the activity is graded.
    #[serde(default)]
    pub score: Option<f64>,
}

impl StudyActivity {
    /// Log entry for a finished review session.
    pub fn from_review(summary: &SessionSummary, language: &str, ended_at: DateTime<Utc>) -> Self {
        let duration_secs = (ended_at - summary.started_at).num_seconds().max(0) as u64;
        Self {
            subject: "vocabulary".into(),
            language: language.into(),
            activity: VOCABULARY_REVIEW.into(),
            duration_secs,
            score: summary.accuracy_pct(),
        }
    }
}

/// A persisted [`StudyActivity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyLog {
    pub id: i64,
    #[serde(flatten)]
    pub activity: StudyActivity,
    pub recorded_at: DateTime<Utc>,
}

/// Totals over a window of study logs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyStats {
    pub total_duration_secs: u64,
    pub total_activities: usize,
    /// Mean score over all activities; ungraded ones count as zero.
    pub avg_score: f64,
    pub by_subject: BTreeMap<String, usize>,
    pub by_language: BTreeMap<String, usize>,
}

impl StudyStats {
    pub fn from_logs(logs: &[StudyLog]) -> Self {
        let mut stats = StudyStats {
            total_activities: logs.len(),
            ..Default::default()
        };
        let mut total_score = 0.0;
        for log in logs {
            stats.total_duration_secs += log.activity.duration_secs;
            total_score += log.activity.score.unwrap_or(0.0);
            *stats
                .by_subject
                .entry(log.activity.subject.clone())
                .or_default() += 1;
            *stats
                .by_language
                .entry(log.activity.language.clone())
                .or_default() += 1;
        }
        if !logs.is_empty() {
            stats.avg_score = total_score / logs.len() as f64;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn log(id: i64, subject: &str, language: &str, duration_secs: u64, score: Option<f64>) -> StudyLog {
        StudyLog {
            id,
            activity: StudyActivity {
                subject: subject.into(),
                language: language.into(),
                activity: "quiz".into(),
                duration_secs,
                score,
            },
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn empty_logs_give_zero_stats() {
        let stats = StudyStats::from_logs(&[]);
        assert_eq!(stats.total_activities, 0);
        assert_eq!(stats.avg_score, 0.0);
        assert!(stats.by_subject.is_empty());
    }

    #[test]
    fn aggregates_totals_and_groups() {
        let logs = vec![
            log(1, "vocabulary", "japanese", 300, Some(80.0)),
            log(2, "grammar", "japanese", 600, Some(60.0)),
            log(3, "vocabulary", "spanish", 120, None),
        ];
        let stats = StudyStats::from_logs(&logs);
        assert_eq!(stats.total_activities, 3);
        assert_eq!(stats.total_duration_secs, 1020);
        assert!((stats.avg_score - 140.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.by_subject["vocabulary"], 2);
        assert_eq!(stats.by_language["japanese"], 2);
        assert_eq!(stats.by_language["spanish"], 1);
    }

    #[test]
    fn review_activity_uses_accuracy_and_duration() {
        let started_at = Utc::now();
        let summary = SessionSummary {
            total: 4,
            correct: 3,
            incorrect: 1,
            skipped: Vec::new(),
            started_at,
        };
        let activity = StudyActivity::from_review(&summary, "spanish", started_at + Duration::seconds(90));
        assert_eq!(activity.activity, VOCABULARY_REVIEW);
        assert_eq!(activity.duration_secs, 90);
        assert_eq!(activity.score, Some(75.0));
    }
}
