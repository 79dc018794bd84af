//! Due-set query.
//!
//! Re-evaluated against the repository on every call; the result is a
//! snapshot, not a live view.

use chrono::{DateTime, Utc};

use crate::error::RepositoryError;
use crate::repository::ItemRepository;
use crate::vocabulary::VocabularyItem;

/// Every item whose `next_review_at` is at or before `now`, most overdue first.
pub fn due_items<R: ItemRepository + ?Sized>(
    repo: &R,
    now: DateTime<Utc>,
) -> Result<Vec<VocabularyItem>, RepositoryError> {
    let items = repo.query_due_before(now)?;
    tracing::debug!(count = items.len(), %now, "due query");
    Ok(items)
}

/// Number of due items, for badges and summaries.
pub fn due_count<R: ItemRepository + ?Sized>(
    repo: &R,
    now: DateTime<Utc>,
) -> Result<usize, RepositoryError> {
    due_items(repo, now).map(|items| items.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;
    use crate::review::{apply_outcome, ReviewOutcome};
    use crate::vocabulary::NewVocabulary;
    use chrono::{Duration, TimeZone};

    #[test]
    fn returns_items_due_at_or_before_now() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut repo = InMemoryRepository::new();
        let past = repo.insert(NewVocabulary::new("past", "english", "B1"), t - Duration::minutes(5));
        let exact = repo.insert(NewVocabulary::new("exact", "english", "B1"), t);
        repo.insert(NewVocabulary::new("future", "english", "B1"), t + Duration::minutes(5));

        let due = due_items(&repo, t).unwrap();
        let words: Vec<_> = due.iter().map(|i| i.id).collect();
        assert_eq!(words, vec![past, exact]);
        assert_eq!(due_count(&repo, t).unwrap(), 2);
    }

    #[test]
    fn reflects_repository_changes_between_calls() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut repo = InMemoryRepository::new();
        let id = repo.insert(NewVocabulary::new("word", "english", "B1"), t);
        assert_eq!(due_count(&repo, t).unwrap(), 1);

        let fields = apply_outcome(&repo.get(id).unwrap(), ReviewOutcome::Correct, t);
        repo.update(id, &fields).unwrap();
        assert_eq!(due_count(&repo, t).unwrap(), 0);
        assert_eq!(due_count(&repo, t + Duration::minutes(30)).unwrap(), 1);
    }

    #[test]
    fn empty_repository_has_nothing_due() {
        let repo = InMemoryRepository::new();
        assert!(due_items(&repo, Utc::now()).unwrap().is_empty());
    }
}
