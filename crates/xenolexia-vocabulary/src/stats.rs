use chrono::{DateTime, Utc};
use serde::Serialize;
use xenolexia_core::{StoreError, VocabularyStore};
use xenolexia_types::{VocabularyFilter, VocabularyItem, VocabularyStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyStats {
    pub total: usize,
    pub new: usize,
    pub learning: usize,
    pub review: usize,
    pub learned: usize,
    pub due_now: usize,
}

impl VocabularyStats {
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a VocabularyItem>, now: DateTime<Utc>) -> Self {
        let mut stats = Self::default();
        for item in items {
            stats.total += 1;
            match item.status {
                VocabularyStatus::New => stats.new += 1,
                VocabularyStatus::Learning => stats.learning += 1,
                VocabularyStatus::Review => stats.review += 1,
                VocabularyStatus::Learned => stats.learned += 1,
            }
            if item.is_due(now) {
                stats.due_now += 1;
            }
        }
        stats
    }
}

pub async fn vocabulary_stats(
    store: &dyn VocabularyStore,
    now: DateTime<Utc>,
) -> Result<VocabularyStats, StoreError> {
    let items = store.list_vocabulary(&VocabularyFilter::default()).await?;
    Ok(VocabularyStats::from_items(&items, now))
}
