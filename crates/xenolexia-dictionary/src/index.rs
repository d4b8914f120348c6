use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use xenolexia_core::WordStore;
use xenolexia_types::{LanguagePair, ProficiencyLevel, WordEntry};

use crate::error::DictionaryError;
use crate::import::{ImportReport, RawWordRow, validate_entry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupOptions {
    pub case_sensitive: bool,
    pub include_variants: bool,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            include_variants: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairState {
    Empty,
    Loading,
    Ready,
}

/// Fully loaded word list of one language pair
#[derive(Debug, Default)]
struct PairCache {
    /// lowercased headword -> entry
    direct: HashMap<String, WordEntry>,
    /// lowercased variant -> direct-map key
    variants: HashMap<String, String>,
}

impl PairCache {
    fn build(entries: Vec<WordEntry>) -> Self {
        let mut cache = PairCache::default();

        for entry in entries {
            let key = entry.normalized_word();
            if key.is_empty() {
                continue;
            }
            for variant in &entry.variants {
                let variant = variant.trim().to_lowercase();
                if !variant.is_empty() && variant != key {
                    cache.variants.entry(variant).or_insert_with(|| key.clone());
                }
            }
            cache.direct.entry(key).or_insert(entry);
        }

        cache
    }

    fn get(&self, key: &str, include_variants: bool) -> Option<&WordEntry> {
        self.direct.get(key).or_else(|| {
            if include_variants {
                self.variants.get(key).and_then(|word| self.direct.get(word))
            } else {
                None
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum LoadStatus {
    Pending,
    Done,
    Failed(String),
}

enum PairSlot {
    Loading {
        generation: u64,
        status: watch::Receiver<LoadStatus>,
    },
    Ready(Arc<PairCache>),
}

enum Ticket<'a> {
    Wait(watch::Receiver<LoadStatus>),
    Load(LoadGuard<'a>),
}

/// Owns an in-flight load; dropping it unfinished frees the slot for the next caller
struct LoadGuard<'a> {
    index: &'a TranslationIndex,
    pair: LanguagePair,
    generation: u64,
    status: watch::Sender<LoadStatus>,
    finished: bool,
}

impl LoadGuard<'_> {
    fn complete(mut self, cache: Arc<PairCache>) {
        {
            let mut slots = self.index.slots();
            if self.owns_slot(&slots) {
                slots.insert(self.pair.clone(), PairSlot::Ready(cache));
            } else {
                tracing::debug!("Load of {} was invalidated while in flight", self.pair);
            }
        }
        self.finished = true;
        let _ = self.status.send(LoadStatus::Done);
    }

    fn fail(mut self, message: String) {
        self.release();
        self.finished = true;
        let _ = self.status.send(LoadStatus::Failed(message));
    }

    fn owns_slot(&self, slots: &HashMap<LanguagePair, PairSlot>) -> bool {
        matches!(
            slots.get(&self.pair),
            Some(PairSlot::Loading { generation, .. }) if *generation == self.generation
        )
    }

    fn release(&self) {
        let mut slots = self.index.slots();
        if self.owns_slot(&slots) {
            slots.remove(&self.pair);
        }
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!("Load of {} abandoned", self.pair);
            self.release();
        }
    }
}

/// Per-language-pair word lookup over a backing store.
///
/// Pairs load lazily and at most once at a time: concurrent callers of
/// [`TranslationIndex::load_language_pair`] share the in-flight fetch. Until a
/// pair is loaded, single lookups go straight to the store.
pub struct TranslationIndex {
    store: Arc<dyn WordStore>,
    slots: Mutex<HashMap<LanguagePair, PairSlot>>,
    generation: AtomicU64,
}

impl TranslationIndex {
    pub fn new(store: Arc<dyn WordStore>) -> Self {
        Self {
            store,
            slots: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> &Arc<dyn WordStore> {
        &self.store
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<LanguagePair, PairSlot>> {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn ready_cache(&self, pair: &LanguagePair) -> Option<Arc<PairCache>> {
        match self.slots().get(pair) {
            Some(PairSlot::Ready(cache)) => Some(cache.clone()),
            _ => None,
        }
    }

    pub fn pair_state(&self, pair: &LanguagePair) -> PairState {
        match self.slots().get(pair) {
            None => PairState::Empty,
            Some(PairSlot::Loading { .. }) => PairState::Loading,
            Some(PairSlot::Ready(_)) => PairState::Ready,
        }
    }

    /// Drop the cached pair so the next lookup re-fetches it
    pub fn invalidate(&self, pair: &LanguagePair) {
        if self.slots().remove(pair).is_some() {
            tracing::debug!("Invalidated cached pair {}", pair);
        }
    }

    /// Bulk-load every entry of `pair`; a no-op when already loaded
    pub async fn load_language_pair(&self, pair: &LanguagePair) -> Result<(), DictionaryError> {
        loop {
            let ticket = {
                let mut slots = self.slots();
                match slots.get(pair) {
                    Some(PairSlot::Ready(_)) => return Ok(()),
                    Some(PairSlot::Loading { status, .. }) => Ticket::Wait(status.clone()),
                    None => {
                        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
                        let (tx, rx) = watch::channel(LoadStatus::Pending);
                        slots.insert(
                            pair.clone(),
                            PairSlot::Loading {
                                generation,
                                status: rx,
                            },
                        );
                        Ticket::Load(LoadGuard {
                            index: self,
                            pair: pair.clone(),
                            generation,
                            status: tx,
                            finished: false,
                        })
                    }
                }
            };

            match ticket {
                Ticket::Load(guard) => return self.fetch_pair(guard).await,
                Ticket::Wait(mut status) => {
                    let outcome = status
                        .wait_for(|s| *s != LoadStatus::Pending)
                        .await
                        .map(|s| (*s).clone());
                    match outcome {
                        Ok(LoadStatus::Failed(message)) => {
                            return Err(DictionaryError::LoadFailed {
                                pair: pair.key(),
                                message,
                            });
                        }
                        // Done, or the loader was cancelled: re-check the slot
                        _ => continue,
                    }
                }
            }
        }
    }

    async fn fetch_pair(&self, guard: LoadGuard<'_>) -> Result<(), DictionaryError> {
        tracing::info!("Loading word list for {}...", guard.pair);

        match self.store.get_by_langs(&guard.pair).await {
            Ok(entries) => {
                let fetched = entries.len();
                let cache = PairCache::build(entries);
                tracing::info!(
                    "Loaded {} entries ({} variants) for {}",
                    fetched,
                    cache.variants.len(),
                    guard.pair
                );
                guard.complete(Arc::new(cache));
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to load word list for {}: {}", guard.pair, e);
                guard.fail(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Resolve one word; an absent word is `Ok(None)`
    pub async fn lookup_word(
        &self,
        word: &str,
        pair: &LanguagePair,
        options: LookupOptions,
    ) -> Result<Option<WordEntry>, DictionaryError> {
        let query = word.trim();
        let key = query.to_lowercase();
        if key.is_empty() {
            return Ok(None);
        }

        if let Some(cache) = self.ready_cache(pair) {
            return Ok(resolve_cached(&cache, query, &key, options));
        }

        tracing::debug!("{} not loaded, querying store for '{}'", pair, key);
        let mut found = self.store.get_entry(&key, pair).await?;
        if found.is_none() && options.include_variants {
            found = self.store.get_entry_by_variant(&key, pair).await?;
        }
        Ok(found.filter(|entry| !options.case_sensitive || matches_exact(entry, query)))
    }

    /// Load the pair once, then resolve every word; output keeps input order
    pub async fn lookup_words<S: AsRef<str>>(
        &self,
        words: &[S],
        pair: &LanguagePair,
        options: LookupOptions,
    ) -> Result<Vec<(String, Option<WordEntry>)>, DictionaryError> {
        self.load_language_pair(pair).await?;
        let cache = self.ready_cache(pair);

        let mut resolved = Vec::with_capacity(words.len());
        for word in words {
            let word = word.as_ref();
            let entry = match &cache {
                Some(cache) => {
                    let query = word.trim();
                    resolve_cached(cache, query, &query.to_lowercase(), options)
                }
                // Invalidated between load and lookup
                None => self.lookup_word(word, pair, options).await?,
            };
            resolved.push((word.to_string(), entry));
        }
        Ok(resolved)
    }

    /// Deduplicating bulk insert of ready-made entries
    pub async fn install_dictionary(
        &self,
        pair: &LanguagePair,
        entries: Vec<WordEntry>,
    ) -> Result<ImportReport, DictionaryError> {
        self.commit(pair, entries, ImportReport::default()).await
    }

    /// Deduplicating bulk insert of untrusted rows
    pub async fn bulk_import(
        &self,
        rows: Vec<RawWordRow>,
        pair: &LanguagePair,
    ) -> Result<ImportReport, DictionaryError> {
        let mut report = ImportReport::default();
        let mut entries = Vec::with_capacity(rows.len());

        for (i, row) in rows.into_iter().enumerate() {
            match row.into_entry(pair, i + 1) {
                Ok(entry) => entries.push(entry),
                Err(e) => report.errors.push(e),
            }
        }

        self.commit(pair, entries, report).await
    }

    async fn commit(
        &self,
        pair: &LanguagePair,
        entries: Vec<WordEntry>,
        mut report: ImportReport,
    ) -> Result<ImportReport, DictionaryError> {
        let mut seen = HashSet::new();
        let mut batch = Vec::with_capacity(entries.len());

        for entry in entries {
            if let Err(e) = validate_entry(&entry, pair) {
                report.errors.push(e);
                continue;
            }
            if !seen.insert(entry.id.clone()) {
                report.skipped += 1;
                continue;
            }
            batch.push(entry);
        }

        let result = self.store.run_transaction(batch).await;
        self.invalidate(pair);
        let outcome = result?;

        report.imported = outcome.inserted;
        report.skipped += outcome.duplicates;

        if !report.errors.is_empty() {
            tracing::warn!(
                "{} rows rejected while importing {}",
                report.errors.len(),
                pair
            );
        }
        tracing::info!(
            "Imported {} entries for {} ({} skipped)",
            report.imported,
            pair,
            report.skipped
        );

        Ok(report)
    }

    /// Delete the pair from the store and the cache
    pub async fn clear_language_pair(&self, pair: &LanguagePair) -> Result<usize, DictionaryError> {
        let result = self.store.delete_by_langs(pair).await;
        self.invalidate(pair);
        let removed = result?;
        tracing::info!("Removed {} entries for {}", removed, pair);
        Ok(removed)
    }

    /// Entries of one tier, most frequent first
    pub async fn entries_for_level(
        &self,
        pair: &LanguagePair,
        level: ProficiencyLevel,
    ) -> Result<Vec<WordEntry>, DictionaryError> {
        let mut entries = match self.ready_cache(pair) {
            Some(cache) => cache
                .direct
                .values()
                .filter(|e| e.proficiency_level == level)
                .cloned()
                .collect(),
            None => self.store.get_by_level(level, pair).await?,
        };
        entries.sort_by(|a, b| {
            (a.frequency_rank == 0, a.frequency_rank, &a.source_word).cmp(&(
                b.frequency_rank == 0,
                b.frequency_rank,
                &b.source_word,
            ))
        });
        Ok(entries)
    }

    pub async fn entry_count(&self, pair: &LanguagePair) -> Result<usize, DictionaryError> {
        Ok(self.store.count(pair).await?)
    }
}

fn resolve_cached(
    cache: &PairCache,
    query: &str,
    key: &str,
    options: LookupOptions,
) -> Option<WordEntry> {
    cache
        .get(key, options.include_variants)
        .filter(|entry| !options.case_sensitive || matches_exact(entry, query))
        .cloned()
}

fn matches_exact(entry: &WordEntry, query: &str) -> bool {
    entry.source_word.trim() == query || entry.variants.iter().any(|v| v.trim() == query)
}
