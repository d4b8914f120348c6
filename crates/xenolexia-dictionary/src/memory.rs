use std::collections::BTreeMap;

use tokio::sync::RwLock;
use xenolexia_core::{StoreError, TransactionOutcome, WordStore};
use xenolexia_types::{LanguagePair, ProficiencyLevel, WordEntry};

/// Word list kept in memory, keyed by entry id
#[derive(Default)]
pub struct MemoryWordStore {
    entries: RwLock<BTreeMap<String, WordEntry>>,
}

impl MemoryWordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: impl IntoIterator<Item = WordEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| (entry.id.clone(), entry))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Every stored entry, in id order
    pub async fn snapshot(&self) -> Vec<WordEntry> {
        self.entries.read().await.values().cloned().collect()
    }
}

#[async_trait::async_trait]
impl WordStore for MemoryWordStore {
    async fn get_entry(
        &self,
        word: &str,
        pair: &LanguagePair,
    ) -> Result<Option<WordEntry>, StoreError> {
        let word = word.trim().to_lowercase();
        let entries = self.entries.read().await;
        Ok(entries
            .values()
            .find(|e| e.belongs_to(pair) && e.normalized_word() == word)
            .cloned())
    }

    async fn get_entry_by_variant(
        &self,
        variant: &str,
        pair: &LanguagePair,
    ) -> Result<Option<WordEntry>, StoreError> {
        let variant = variant.trim().to_lowercase();
        let entries = self.entries.read().await;
        Ok(entries
            .values()
            .find(|e| {
                e.belongs_to(pair) && e.variants.iter().any(|v| v.to_lowercase() == variant)
            })
            .cloned())
    }

    async fn get_by_level(
        &self,
        level: ProficiencyLevel,
        pair: &LanguagePair,
    ) -> Result<Vec<WordEntry>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .values()
            .filter(|e| e.belongs_to(pair) && e.proficiency_level == level)
            .cloned()
            .collect())
    }

    async fn get_by_langs(&self, pair: &LanguagePair) -> Result<Vec<WordEntry>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .values()
            .filter(|e| e.belongs_to(pair))
            .cloned()
            .collect())
    }

    async fn count(&self, pair: &LanguagePair) -> Result<usize, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.values().filter(|e| e.belongs_to(pair)).count())
    }

    async fn add_entry(&self, entry: WordEntry) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(&entry.id) {
            return Ok(false);
        }
        entries.insert(entry.id.clone(), entry);
        Ok(true)
    }

    async fn run_transaction(
        &self,
        batch: Vec<WordEntry>,
    ) -> Result<TransactionOutcome, StoreError> {
        // Single write guard for the whole batch
        let mut entries = self.entries.write().await;
        let mut outcome = TransactionOutcome::default();
        for entry in batch {
            if entries.contains_key(&entry.id) {
                outcome.duplicates += 1;
            } else {
                entries.insert(entry.id.clone(), entry);
                outcome.inserted += 1;
            }
        }
        Ok(outcome)
    }

    async fn delete_by_langs(&self, pair: &LanguagePair) -> Result<usize, StoreError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| !e.belongs_to(pair));
        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, word: &str, pair: &LanguagePair) -> WordEntry {
        WordEntry {
            id: id.into(),
            source_word: word.into(),
            target_word: format!("{word}-t"),
            source_language: pair.source.clone(),
            target_language: pair.target.clone(),
            proficiency_level: ProficiencyLevel::Beginner,
            frequency_rank: 1,
            part_of_speech: None,
            variants: vec![format!("{word}s")],
            pronunciation: None,
        }
    }

    #[tokio::test]
    async fn test_transaction_skips_existing_ids() {
        let pair = LanguagePair::new("en", "es");
        let store = MemoryWordStore::with_entries([entry("1", "cat", &pair)]);

        let outcome = store
            .run_transaction(vec![
                entry("1", "cat", &pair),
                entry("2", "dog", &pair),
                entry("2", "dog", &pair),
            ])
            .await
            .unwrap();
        assert_eq!(outcome, TransactionOutcome { inserted: 1, duplicates: 2 });
        assert_eq!(store.count(&pair).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_queries_respect_pair() {
        let en_es = LanguagePair::new("en", "es");
        let en_de = LanguagePair::new("en", "de");
        let store = MemoryWordStore::with_entries([
            entry("1", "Cat", &en_es),
            entry("2", "cat", &en_de),
        ]);

        let hit = store.get_entry("CAT", &en_es).await.unwrap().unwrap();
        assert_eq!(hit.id, "1");
        let variant = store.get_entry_by_variant("cats", &en_de).await.unwrap().unwrap();
        assert_eq!(variant.id, "2");

        assert_eq!(store.delete_by_langs(&en_es).await.unwrap(), 1);
        assert!(store.get_entry("cat", &en_es).await.unwrap().is_none());
        assert_eq!(store.count(&en_de).await.unwrap(), 1);
    }
}
