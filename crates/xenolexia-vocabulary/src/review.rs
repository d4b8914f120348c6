use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use xenolexia_core::{StoreError, VocabularyStore};
use xenolexia_types::{VocabularyItem, VocabularyStatus};

use crate::error::ReviewError;
use crate::scheduler::VocabularyScheduler;

/// Grade one stored item and write the new state back
pub async fn review_item(
    store: &dyn VocabularyStore,
    id: &str,
    quality: u8,
    now: DateTime<Utc>,
) -> Result<VocabularyItem, ReviewError> {
    let item = store
        .get_vocabulary(id)
        .await?
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

    let outcome = VocabularyScheduler::next_state(&item, quality, now)?;
    let updated = store.update_vocabulary(id, outcome.to_update()).await?;

    tracing::debug!(
        "Reviewed '{}' (q={}): interval {} -> {}, status {}",
        updated.source_word,
        quality,
        item.interval,
        updated.interval,
        updated.status.as_str()
    );
    Ok(updated)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub reviewed: usize,
    pub passed: usize,
    pub failed: usize,
    pub newly_learned: usize,
}

/// A batch of due items graded one after another
pub struct ReviewSession {
    store: Arc<dyn VocabularyStore>,
    queue: VecDeque<VocabularyItem>,
    summary: ReviewSummary,
}

impl ReviewSession {
    /// Pull up to `limit` due items
    pub async fn start(
        store: Arc<dyn VocabularyStore>,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Self, ReviewError> {
        let queue: VecDeque<VocabularyItem> = store.get_due_for_review(now, limit).await?.into();
        tracing::info!("Review session started with {} due items", queue.len());

        Ok(Self {
            store,
            queue,
            summary: ReviewSummary::default(),
        })
    }

    pub fn current(&self) -> Option<&VocabularyItem> {
        self.queue.front()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn is_finished(&self) -> bool {
        self.queue.is_empty()
    }

    /// Grade the current item and move on
    pub async fn grade(
        &mut self,
        quality: u8,
        now: DateTime<Utc>,
    ) -> Result<VocabularyItem, ReviewError> {
        let current = self.queue.front().ok_or(ReviewError::Finished)?;
        let was_learned = current.status == VocabularyStatus::Learned;

        let updated = review_item(self.store.as_ref(), &current.id, quality, now).await?;
        self.queue.pop_front();

        self.summary.reviewed += 1;
        if updated.interval > 0 {
            self.summary.passed += 1;
        } else {
            self.summary.failed += 1;
        }
        if !was_learned && updated.status == VocabularyStatus::Learned {
            self.summary.newly_learned += 1;
        }

        Ok(updated)
    }

    /// Move the current item to the back of the queue
    pub fn skip(&mut self) {
        if let Some(item) = self.queue.pop_front() {
            self.queue.push_back(item);
        }
    }

    pub fn summary(&self) -> ReviewSummary {
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use xenolexia_types::NewVocabularyItem;

    use super::*;
    use crate::error::SchedulerError;
    use crate::memory::MemoryVocabularyStore;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap()
    }

    fn item(id: &str, word: &str) -> VocabularyItem {
        VocabularyItem::new(
            id,
            NewVocabularyItem {
                source_word: word.into(),
                target_word: format!("{word}-es"),
                source_language: "en".into(),
                target_language: "es".into(),
                context_sentence: None,
                book_id: None,
                book_title: None,
            },
            now() - Duration::days(1),
        )
    }

    #[tokio::test]
    async fn test_session_grades_and_persists() {
        let mut veteran = item("b", "dog");
        veteran.review_count = 4;
        veteran.interval = 6;
        veteran.status = VocabularyStatus::Review;
        veteran.last_reviewed_at = Some(now() - Duration::days(7));

        let store = Arc::new(MemoryVocabularyStore::with_items([item("a", "house"), veteran]));
        let mut session = ReviewSession::start(store.clone(), now(), 10).await.unwrap();
        assert_eq!(session.remaining(), 2);
        assert_eq!(session.current().unwrap().id, "a");

        let first = session.grade(1, now()).await.unwrap();
        assert_eq!(first.status, VocabularyStatus::Learning);
        assert_eq!(first.interval, 0);

        let second = session.grade(5, now()).await.unwrap();
        assert_eq!(second.status, VocabularyStatus::Learned);
        assert_eq!(second.interval, 15);

        assert!(session.is_finished());
        assert!(matches!(session.grade(3, now()).await, Err(ReviewError::Finished)));
        assert_eq!(
            session.summary(),
            ReviewSummary {
                reviewed: 2,
                passed: 1,
                failed: 1,
                newly_learned: 1,
            }
        );

        let stored = store.get_vocabulary("b").await.unwrap().unwrap();
        assert_eq!(stored.review_count, 5);
        assert_eq!(stored.last_reviewed_at, Some(now()));
    }

    #[tokio::test]
    async fn test_bad_grade_keeps_item_queued() {
        let store = Arc::new(MemoryVocabularyStore::with_items([item("a", "house")]));
        let mut session = ReviewSession::start(store, now(), 10).await.unwrap();

        let err = session.grade(9, now()).await.unwrap_err();
        assert!(matches!(
            err,
            ReviewError::Scheduler(SchedulerError::InvalidQuality(9))
        ));
        assert_eq!(session.remaining(), 1);
        assert_eq!(session.summary().reviewed, 0);
    }

    #[tokio::test]
    async fn test_review_missing_item() {
        let store = MemoryVocabularyStore::new();
        let err = review_item(&store, "ghost", 4, now()).await.unwrap_err();
        assert!(matches!(err, ReviewError::Store(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_skip_rotates_queue() {
        let store = Arc::new(MemoryVocabularyStore::with_items([
            item("a", "house"),
            item("b", "dog"),
        ]));
        let mut session = ReviewSession::start(store, now(), 10).await.unwrap();
        session.skip();
        assert_eq!(session.current().unwrap().id, "b");
    }
}
