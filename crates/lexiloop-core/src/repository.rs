//! Item repository abstraction.
//!
//! The review engine never talks to storage directly; it reads and writes
//! items through [`ItemRepository`]. [`crate::storage::Database`] is the
//! SQLite-backed implementation and [`InMemoryRepository`] backs tests.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::RepositoryError;
use crate::review::ReviewFields;
use crate::vocabulary::{ItemId, NewVocabulary, VocabularyItem};

/// Storage operations the review engine depends on.
pub trait ItemRepository {
    /// Point-read one item.
    fn get(&self, id: ItemId) -> Result<VocabularyItem, RepositoryError>;

    /// Overwrite the review-tracking fields of one item atomically.
    fn update(&mut self, id: ItemId, fields: &ReviewFields) -> Result<(), RepositoryError>;

    /// Every item with `next_review_at <= at`, ordered by `next_review_at`
    /// ascending and then by id.
    fn query_due_before(&self, at: DateTime<Utc>) -> Result<Vec<VocabularyItem>, RepositoryError>;
}

impl<R: ItemRepository + ?Sized> ItemRepository for &mut R {
    fn get(&self, id: ItemId) -> Result<VocabularyItem, RepositoryError> {
        (**self).get(id)
    }

    fn update(&mut self, id: ItemId, fields: &ReviewFields) -> Result<(), RepositoryError> {
        (**self).update(id, fields)
    }

    fn query_due_before(&self, at: DateTime<Utc>) -> Result<Vec<VocabularyItem>, RepositoryError> {
        (**self).query_due_before(at)
    }
}

/// Map-backed repository with optional failure injection.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRepository {
    items: BTreeMap<ItemId, VocabularyItem>,
    next_id: i64,
    failing_updates: usize,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an item in its initial review state and return its id.
    pub fn insert(&mut self, entry: NewVocabulary, now: DateTime<Utc>) -> ItemId {
        self.next_id += 1;
        let id = ItemId(self.next_id);
        self.items.insert(id, entry.into_item(id, now));
        id
    }

    /// Store a fully-formed item, replacing any item with the same id.
    pub fn insert_item(&mut self, item: VocabularyItem) {
        self.next_id = self.next_id.max(item.id.0);
        self.items.insert(item.id, item);
    }

    pub fn remove(&mut self, id: ItemId) -> Option<VocabularyItem> {
        self.items.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Make the next `count` calls to `update` fail with a persistence error.
    pub fn fail_next_updates(&mut self, count: usize) {
        self.failing_updates = count;
    }
}

impl ItemRepository for InMemoryRepository {
    fn get(&self, id: ItemId) -> Result<VocabularyItem, RepositoryError> {
        self.items
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    fn update(&mut self, id: ItemId, fields: &ReviewFields) -> Result<(), RepositoryError> {
        if self.failing_updates > 0 {
            self.failing_updates -= 1;
            return Err(RepositoryError::Persistence("injected write failure".into()));
        }
        let item = self
            .items
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound(id))?;
        fields.apply_to(item);
        Ok(())
    }

    fn query_due_before(&self, at: DateTime<Utc>) -> Result<Vec<VocabularyItem>, RepositoryError> {
        let mut due: Vec<VocabularyItem> = self
            .items
            .values()
            .filter(|item| item.is_due(at))
            .cloned()
            .collect();
        due.sort_by_key(|item| (item.next_review_at, item.id));
        Ok(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::{apply_outcome, ReviewOutcome};
    use chrono::Duration;

    #[test]
    fn insert_assigns_increasing_ids() {
        let mut repo = InMemoryRepository::new();
        assert!(repo.is_empty());
        let now = Utc::now();
        let a = repo.insert(NewVocabulary::new("uno", "spanish", "A1"), now);
        let b = repo.insert(NewVocabulary::new("dos", "spanish", "A1"), now);
        assert!(b > a);
        assert_eq!(repo.len(), 2);
        assert_eq!(repo.get(a).unwrap().word, "uno");
    }

    #[test]
    fn get_missing_is_not_found() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.get(ItemId(42)), Err(RepositoryError::NotFound(ItemId(42))));
    }

    #[test]
    fn update_writes_review_fields_only() {
        let mut repo = InMemoryRepository::new();
        let now = Utc::now();
        let id = repo.insert(NewVocabulary::new("tres", "spanish", "A1").translation("three"), now);
        let fields = apply_outcome(&repo.get(id).unwrap(), ReviewOutcome::Correct, now);
        repo.update(id, &fields).unwrap();
        let item = repo.get(id).unwrap();
        assert_eq!(item.review_count, 1);
        assert_eq!(item.translation, "three");
        assert_eq!(item.next_review_at, now + Duration::minutes(30));
    }

    #[test]
    fn injected_failures_are_consumed() {
        let mut repo = InMemoryRepository::new();
        let now = Utc::now();
        let id = repo.insert(NewVocabulary::new("cuatro", "spanish", "A1"), now);
        let fields = ReviewFields::of(&repo.get(id).unwrap());
        repo.fail_next_updates(1);
        assert!(repo.update(id, &fields).unwrap_err().is_retryable());
        assert!(repo.update(id, &fields).is_ok());
    }

    #[test]
    fn due_query_is_ordered_and_inclusive() {
        let mut repo = InMemoryRepository::new();
        let t = Utc::now();
        let late = repo.insert(NewVocabulary::new("b", "english", "A1"), t);
        let early = repo.insert(NewVocabulary::new("a", "english", "A1"), t - Duration::minutes(5));
        repo.insert(NewVocabulary::new("c", "english", "A1"), t + Duration::minutes(5));
        let ids: Vec<ItemId> = repo.query_due_before(t).unwrap().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![early, late]);
    }
}
