use chrono::{DateTime, Utc};
use xenolexia_types::{
    LanguagePair, NewVocabularyItem, ProficiencyLevel, VocabularyFilter, VocabularyItem,
    VocabularyUpdate, WordEntry,
};

use crate::error::StoreError;

/// Result of a bulk insert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionOutcome {
    pub inserted: usize,
    /// Rows whose id already existed (or repeated within the batch)
    pub duplicates: usize,
}

/// Key-indexed word list storage
#[async_trait::async_trait]
pub trait WordStore: Send + Sync {
    /// Entry whose lowercased headword equals `word`
    async fn get_entry(
        &self,
        word: &str,
        pair: &LanguagePair,
    ) -> Result<Option<WordEntry>, StoreError>;

    /// Entry declaring `variant` among its inflected forms
    async fn get_entry_by_variant(
        &self,
        variant: &str,
        pair: &LanguagePair,
    ) -> Result<Option<WordEntry>, StoreError>;

    async fn get_by_level(
        &self,
        level: ProficiencyLevel,
        pair: &LanguagePair,
    ) -> Result<Vec<WordEntry>, StoreError>;

    /// Every entry of a language pair
    async fn get_by_langs(&self, pair: &LanguagePair) -> Result<Vec<WordEntry>, StoreError>;

    async fn count(&self, pair: &LanguagePair) -> Result<usize, StoreError>;

    /// Returns false when the id already exists
    async fn add_entry(&self, entry: WordEntry) -> Result<bool, StoreError>;

    /// Insert a batch atomically, skipping ids that already exist
    async fn run_transaction(&self, entries: Vec<WordEntry>)
    -> Result<TransactionOutcome, StoreError>;

    /// Remove every entry of a language pair, returning how many were removed
    async fn delete_by_langs(&self, pair: &LanguagePair) -> Result<usize, StoreError>;
}

/// Saved-word storage
#[async_trait::async_trait]
pub trait VocabularyStore: Send + Sync {
    /// Fails with `StoreError::Duplicate` when the id or the same word is already saved
    async fn add_vocabulary(&self, item: VocabularyItem) -> Result<(), StoreError>;

    async fn get_vocabulary(&self, id: &str) -> Result<Option<VocabularyItem>, StoreError>;

    async fn find_word(
        &self,
        word: &NewVocabularyItem,
    ) -> Result<Option<VocabularyItem>, StoreError>;

    /// Items matching `filter`, newest first
    async fn list_vocabulary(
        &self,
        filter: &VocabularyFilter,
    ) -> Result<Vec<VocabularyItem>, StoreError>;

    async fn update_vocabulary(
        &self,
        id: &str,
        update: VocabularyUpdate,
    ) -> Result<VocabularyItem, StoreError>;

    async fn delete_vocabulary(&self, id: &str) -> Result<bool, StoreError>;

    /// Items where status != learned and the interval since the last review has elapsed
    async fn get_due_for_review(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<VocabularyItem>, StoreError>;
}
