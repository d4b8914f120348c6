use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use xenolexia_core::{StoreError, VocabularyStore};
use xenolexia_types::{
    MIN_EASE_FACTOR, NewVocabularyItem, VocabularyFilter, VocabularyItem, VocabularyStatus,
    VocabularyUpdate,
};

/// Saved words kept in memory, keyed by id
#[derive(Default)]
pub struct MemoryVocabularyStore {
    items: RwLock<BTreeMap<String, VocabularyItem>>,
}

impl MemoryVocabularyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: impl IntoIterator<Item = VocabularyItem>) -> Self {
        let items = items
            .into_iter()
            .map(|item| (item.id.clone(), item))
            .collect();
        Self {
            items: RwLock::new(items),
        }
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Every item, in id order
    pub async fn snapshot(&self) -> Vec<VocabularyItem> {
        self.items.read().await.values().cloned().collect()
    }
}

fn new_word(item: &VocabularyItem) -> NewVocabularyItem {
    NewVocabularyItem {
        source_word: item.source_word.clone(),
        target_word: item.target_word.clone(),
        source_language: item.source_language.clone(),
        target_language: item.target_language.clone(),
        context_sentence: None,
        book_id: None,
        book_title: None,
    }
}

#[async_trait::async_trait]
impl VocabularyStore for MemoryVocabularyStore {
    async fn add_vocabulary(&self, item: VocabularyItem) -> Result<(), StoreError> {
        let mut items = self.items.write().await;
        if items.contains_key(&item.id) {
            return Err(StoreError::Duplicate(item.id));
        }
        let word = new_word(&item);
        if items.values().any(|existing| existing.same_word(&word)) {
            return Err(StoreError::Duplicate(format!(
                "{} -> {} ({})",
                item.source_word,
                item.target_word,
                item.pair()
            )));
        }
        items.insert(item.id.clone(), item);
        Ok(())
    }

    async fn get_vocabulary(&self, id: &str) -> Result<Option<VocabularyItem>, StoreError> {
        Ok(self.items.read().await.get(id).cloned())
    }

    async fn find_word(
        &self,
        word: &NewVocabularyItem,
    ) -> Result<Option<VocabularyItem>, StoreError> {
        Ok(self
            .items
            .read()
            .await
            .values()
            .find(|item| item.same_word(word))
            .cloned())
    }

    async fn list_vocabulary(
        &self,
        filter: &VocabularyFilter,
    ) -> Result<Vec<VocabularyItem>, StoreError> {
        let mut matching: Vec<VocabularyItem> = self
            .items
            .read()
            .await
            .values()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.added_at.cmp(&a.added_at).then_with(|| a.id.cmp(&b.id)));
        Ok(matching)
    }

    async fn update_vocabulary(
        &self,
        id: &str,
        update: VocabularyUpdate,
    ) -> Result<VocabularyItem, StoreError> {
        let mut items = self.items.write().await;
        let item = items
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let mut updated = item.clone();
        update.apply_to(&mut updated);
        if !(updated.ease_factor >= MIN_EASE_FACTOR) {
            return Err(StoreError::Backend(format!(
                "refusing ease factor {} for {}",
                updated.ease_factor, id
            )));
        }
        if updated.status == VocabularyStatus::New {
            updated.interval = 0;
        }

        *item = updated.clone();
        Ok(updated)
    }

    async fn delete_vocabulary(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.items.write().await.remove(id).is_some())
    }

    async fn get_due_for_review(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<VocabularyItem>, StoreError> {
        let mut due: Vec<VocabularyItem> = self
            .items
            .read()
            .await
            .values()
            .filter(|item| item.is_due(now))
            .cloned()
            .collect();

        // Never-reviewed first, then longest overdue
        due.sort_by(|a, b| {
            a.next_review_at()
                .cmp(&b.next_review_at())
                .then_with(|| a.added_at.cmp(&b.added_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        due.truncate(limit);
        Ok(due)
    }
}
