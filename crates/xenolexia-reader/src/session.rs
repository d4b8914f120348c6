use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use xenolexia_config::ReplacementConfig;
use xenolexia_core::{StoreError, VocabularyStore};
use xenolexia_types::{
    Chapter, NewVocabularyItem, ReaderEvent, ReaderStyle, VocabularyItem, WordTapEvent,
};

use crate::error::PipelineError;
use crate::pipeline::{ChapterPipeline, PreparedChapter, ProcessedChapter};
use crate::progress::ProgressThrottle;
use crate::surface::{ContentPayload, RenderSurface};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub chapters_processed: usize,
    pub words_revealed: usize,
    pub words_saved: usize,
}

struct ActiveChapter {
    prepared: Arc<PreparedChapter>,
    processed: Arc<ProcessedChapter>,
}

/// Run currently being processed; `chapter` is set when it opens a new chapter
struct InFlight {
    generation: u64,
    token: CancellationToken,
    chapter: Option<Arc<PreparedChapter>>,
}

struct SessionState {
    active: Option<ActiveChapter>,
    in_flight: Option<InFlight>,
    stats: SessionStats,
    throttle: ProgressThrottle,
}

/// Reading state of one open book.
///
/// Each chapter run gets its own cancellation token and generation number;
/// starting a new run cancels the previous one, and a run only replaces the
/// active chapter if no newer run started meanwhile.
pub struct ReaderSession {
    book_id: Option<String>,
    book_title: Option<String>,
    pipeline: Arc<ChapterPipeline>,
    vocabulary: Arc<dyn VocabularyStore>,
    state: Mutex<SessionState>,
    generation: AtomicU64,
}

impl ReaderSession {
    pub fn new(
        pipeline: Arc<ChapterPipeline>,
        vocabulary: Arc<dyn VocabularyStore>,
        progress_step: f32,
    ) -> Self {
        Self {
            book_id: None,
            book_title: None,
            pipeline,
            vocabulary,
            state: Mutex::new(SessionState {
                active: None,
                in_flight: None,
                stats: SessionStats::default(),
                throttle: ProgressThrottle::new(progress_step),
            }),
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_book(mut self, id: impl Into<String>, title: Option<String>) -> Self {
        self.book_id = Some(id.into());
        self.book_title = title;
        self
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Process a freshly opened chapter and make it the active one
    pub async fn open_chapter(
        &self,
        chapter: &Chapter,
        config: &ReplacementConfig,
        context_words: usize,
    ) -> Result<Arc<ProcessedChapter>, PipelineError> {
        let prepared = match self.pipeline.prepare(chapter) {
            Ok(prepared) => Arc::new(prepared),
            Err(e) => {
                self.cancel();
                return Err(e);
            }
        };

        let (generation, token) = self.begin(&mut self.state(), Some(prepared.clone()));
        self.run(prepared, config, context_words, generation, token, true)
            .await
    }

    /// Re-run replacement after a settings change.
    ///
    /// Targets the chapter still being opened if there is one, otherwise the
    /// active chapter's stored text.
    pub async fn reprocess(
        &self,
        config: &ReplacementConfig,
        context_words: usize,
    ) -> Result<Arc<ProcessedChapter>, PipelineError> {
        let (prepared, new_chapter, generation, token) = {
            let mut state = self.state();
            let pending = state
                .in_flight
                .as_ref()
                .and_then(|run| run.chapter.clone());
            let (prepared, new_chapter) = match pending {
                Some(prepared) => (prepared, true),
                None => (
                    state
                        .active
                        .as_ref()
                        .map(|active| active.prepared.clone())
                        .ok_or(PipelineError::NoActiveChapter)?,
                    false,
                ),
            };

            let chapter = new_chapter.then(|| prepared.clone());
            let (generation, token) = self.begin(&mut state, chapter);
            (prepared, new_chapter, generation, token)
        };
        self.run(prepared, config, context_words, generation, token, new_chapter)
            .await
    }

    fn begin(
        &self,
        state: &mut SessionState,
        chapter: Option<Arc<PreparedChapter>>,
    ) -> (u64, CancellationToken) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();

        let run = InFlight {
            generation,
            token: token.clone(),
            chapter,
        };
        if let Some(previous) = state.in_flight.replace(run) {
            tracing::debug!("Run {} superseded by run {}", previous.generation, generation);
            previous.token.cancel();
        }
        (generation, token)
    }

    fn finish(&self, generation: u64) {
        let mut state = self.state();
        if state
            .in_flight
            .as_ref()
            .is_some_and(|run| run.generation == generation)
        {
            state.in_flight = None;
        }
    }

    async fn run(
        &self,
        prepared: Arc<PreparedChapter>,
        config: &ReplacementConfig,
        context_words: usize,
        generation: u64,
        token: CancellationToken,
        new_chapter: bool,
    ) -> Result<Arc<ProcessedChapter>, PipelineError> {
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => Err(PipelineError::Cancelled),
            result = self.pipeline.process_prepared(&prepared, config, context_words) => result,
        };
        self.finish(generation);

        let processed = match result {
            Ok(processed) => Arc::new(processed),
            Err(e) => {
                if !matches!(e, PipelineError::Cancelled) {
                    tracing::warn!("Chapter {} failed: {}", prepared.chapter_id, e);
                }
                return Err(e);
            }
        };

        let mut state = self.state();
        if token.is_cancelled() || self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!("Discarding stale result for chapter {}", prepared.chapter_id);
            return Err(PipelineError::Cancelled);
        }

        state.active = Some(ActiveChapter {
            prepared,
            processed: processed.clone(),
        });
        state.stats.chapters_processed += 1;
        if new_chapter {
            state.throttle.reset();
        }

        Ok(processed)
    }

    /// Abandon the in-flight run, if any
    pub fn cancel(&self) -> bool {
        match self.state().in_flight.take() {
            Some(run) => {
                run.token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn active_chapter(&self) -> Option<Arc<ProcessedChapter>> {
        self.state()
            .active
            .as_ref()
            .map(|active| active.processed.clone())
    }

    pub fn content_payload(&self) -> Option<ContentPayload> {
        self.active_chapter()
            .map(|chapter| ContentPayload::from(chapter.as_ref()))
    }

    /// Push the active chapter and the style to a surface
    pub fn present(
        &self,
        surface: &dyn RenderSurface,
        style: &ReaderStyle,
    ) -> Result<(), PipelineError> {
        let payload = self.content_payload().ok_or(PipelineError::NoActiveChapter)?;
        surface.apply_settings(style);
        surface.load_content(&payload);
        Ok(())
    }

    /// Tap payload for marker `index` of the active chapter
    pub fn tap_event(&self, index: usize) -> Option<WordTapEvent> {
        let chapter = self.active_chapter()?;
        let marker = chapter.markers.get(index)?;
        Some(WordTapEvent {
            foreign_word: marker.foreign_word.clone(),
            original_word: marker.original_word.clone(),
            word_id: marker.word_id.clone(),
            context: marker.context.clone(),
        })
    }

    pub fn word_tap(&self, index: usize) -> Option<ReaderEvent> {
        let tap = self.tap_event(index)?;
        self.state().stats.words_revealed += 1;
        Some(ReaderEvent::WordTap(tap))
    }

    pub fn word_long_press(&self, index: usize) -> Option<ReaderEvent> {
        let tap = self.tap_event(index)?;
        self.state().stats.words_revealed += 1;
        Some(ReaderEvent::WordLongPress(tap))
    }

    /// Throttled progress event, or `None` when the change is too small
    pub fn report_progress(&self, percent: f32) -> Option<ReaderEvent> {
        self.state()
            .throttle
            .report(percent)
            .map(|percent| ReaderEvent::Progress { percent })
    }

    /// Account for an event coming back from the surface; returns what to forward
    pub fn handle_event(&self, event: ReaderEvent) -> Option<ReaderEvent> {
        match event {
            ReaderEvent::WordTap(_) | ReaderEvent::WordLongPress(_) => {
                self.state().stats.words_revealed += 1;
                Some(event)
            }
            ReaderEvent::Progress { percent } => self.report_progress(percent),
            ReaderEvent::ContentReady { chapter_id } => {
                tracing::debug!("Surface rendered chapter {}", chapter_id);
                Some(ReaderEvent::ContentReady { chapter_id })
            }
        }
    }

    /// Save a tapped word from the active chapter as a new vocabulary item
    pub async fn save_word(
        &self,
        tap: &WordTapEvent,
        now: DateTime<Utc>,
    ) -> Result<VocabularyItem, PipelineError> {
        let chapter = self.active_chapter().ok_or(PipelineError::NoActiveChapter)?;
        let entry = chapter
            .marker_for_word(&tap.word_id)
            .and_then(|marker| chapter.text.spans.get(marker.index))
            .map(|span| span.entry.clone())
            .ok_or_else(|| PipelineError::UnknownWord(tap.word_id.clone()))?;

        let context = tap.context.trim();
        let word = NewVocabularyItem {
            source_word: entry.source_word,
            target_word: entry.target_word,
            source_language: entry.source_language,
            target_language: entry.target_language,
            context_sentence: (!context.is_empty()).then(|| context.to_string()),
            book_id: self.book_id.clone(),
            book_title: self.book_title.clone(),
        };

        if let Some(existing) = self.vocabulary.find_word(&word).await? {
            return Err(StoreError::Duplicate(existing.id).into());
        }

        let item = VocabularyItem::new(uuid::Uuid::new_v4().to_string(), word, now);
        self.vocabulary.add_vocabulary(item.clone()).await?;
        self.state().stats.words_saved += 1;

        tracing::info!("Saved '{}' -> '{}'", item.source_word, item.target_word);
        Ok(item)
    }

    pub fn stats(&self) -> SessionStats {
        self.state().stats
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    use chrono::TimeZone;
    use xenolexia_core::{TransactionOutcome, WordStore};
    use xenolexia_dictionary::{MemoryWordStore, TranslationIndex};
    use xenolexia_engine::WordReplacementEngine;
    use xenolexia_types::{LanguagePair, ProficiencyLevel, WordEntry};
    use xenolexia_vocabulary::MemoryVocabularyStore;

    use super::*;

    /// Word store whose bulk load can be held back
    struct SlowStore {
        inner: MemoryWordStore,
        slow: AtomicBool,
    }

    #[async_trait::async_trait]
    impl WordStore for SlowStore {
        async fn get_entry(
            &self,
            word: &str,
            pair: &LanguagePair,
        ) -> Result<Option<WordEntry>, StoreError> {
            self.inner.get_entry(word, pair).await
        }

        async fn get_entry_by_variant(
            &self,
            variant: &str,
            pair: &LanguagePair,
        ) -> Result<Option<WordEntry>, StoreError> {
            self.inner.get_entry_by_variant(variant, pair).await
        }

        async fn get_by_level(
            &self,
            level: ProficiencyLevel,
            pair: &LanguagePair,
        ) -> Result<Vec<WordEntry>, StoreError> {
            self.inner.get_by_level(level, pair).await
        }

        async fn get_by_langs(&self, pair: &LanguagePair) -> Result<Vec<WordEntry>, StoreError> {
            if self.slow.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
            self.inner.get_by_langs(pair).await
        }

        async fn count(&self, pair: &LanguagePair) -> Result<usize, StoreError> {
            self.inner.count(pair).await
        }

        async fn add_entry(&self, entry: WordEntry) -> Result<bool, StoreError> {
            self.inner.add_entry(entry).await
        }

        async fn run_transaction(
            &self,
            entries: Vec<WordEntry>,
        ) -> Result<TransactionOutcome, StoreError> {
            self.inner.run_transaction(entries).await
        }

        async fn delete_by_langs(&self, pair: &LanguagePair) -> Result<usize, StoreError> {
            self.inner.delete_by_langs(pair).await
        }
    }

    fn entry(word: &str, target: &str, pair: &LanguagePair) -> WordEntry {
        WordEntry {
            id: format!("{}_{word}", pair.key()),
            source_word: word.into(),
            target_word: target.into(),
            source_language: pair.source.clone(),
            target_language: pair.target.clone(),
            proficiency_level: ProficiencyLevel::Beginner,
            frequency_rank: 10,
            part_of_speech: None,
            variants: Vec::new(),
            pronunciation: None,
        }
    }

    struct Fixture {
        session: Arc<ReaderSession>,
        store: Arc<SlowStore>,
        vocabulary: Arc<MemoryVocabularyStore>,
    }

    fn fixture() -> Fixture {
        let es = LanguagePair::new("en", "es");
        let de = LanguagePair::new("en", "de");
        let store = Arc::new(SlowStore {
            inner: MemoryWordStore::with_entries([
                entry("house", "casa", &es),
                entry("river", "río", &es),
                entry("house", "Haus", &de),
            ]),
            slow: AtomicBool::new(false),
        });
        let index = Arc::new(TranslationIndex::new(store.clone()));
        let pipeline = Arc::new(ChapterPipeline::new(Arc::new(WordReplacementEngine::new(
            index,
        ))));
        let vocabulary = Arc::new(MemoryVocabularyStore::new());
        let session = ReaderSession::new(pipeline, vocabulary.clone(), 0.5)
            .with_book("book-1", Some("The River".into()));

        Fixture {
            session: Arc::new(session),
            store,
            vocabulary,
        }
    }

    fn chapter(id: &str, content: &str) -> Chapter {
        Chapter {
            id: id.into(),
            index: 0,
            title: id.into(),
            content: content.into(),
            word_count: 0,
        }
    }

    fn config(target: &str) -> ReplacementConfig {
        ReplacementConfig {
            target_language: target.into(),
            density: 0.5,
            min_word_spacing: 0,
            ..Default::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_tap_and_save() {
        let fx = fixture();
        let processed = fx
            .session
            .open_chapter(&chapter("c1", "We walked to the house by the river."), &config("es"), 3)
            .await
            .unwrap();
        assert_eq!(processed.markers.len(), 1);

        let Some(ReaderEvent::WordTap(tap)) = fx.session.word_tap(0) else {
            panic!("expected a tap event");
        };
        assert_eq!(tap.foreign_word, "casa");
        assert_eq!(tap.context, "walked to the house by the river");
        assert!(fx.session.word_tap(5).is_none());

        let item = fx.session.save_word(&tap, now()).await.unwrap();
        assert_eq!(item.source_word, "house");
        assert_eq!(item.book_title.as_deref(), Some("The River"));
        assert_eq!(item.interval, 0);
        assert_eq!(fx.vocabulary.len().await, 1);

        let err = fx.session.save_word(&tap, now()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Store(StoreError::Duplicate(ref id)) if *id == item.id));

        let stats = fx.session.stats();
        assert_eq!(stats.words_revealed, 1);
        assert_eq!(stats.words_saved, 1);
        assert_eq!(stats.chapters_processed, 1);
    }

    #[tokio::test]
    async fn test_newer_chapter_wins() {
        let fx = fixture();
        fx.store.slow.store(true, Ordering::SeqCst);

        let first = {
            let session = fx.session.clone();
            tokio::spawn(async move {
                session
                    .open_chapter(&chapter("c1", "The house."), &config("es"), 3)
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        fx.store.slow.store(false, Ordering::SeqCst);
        let second = fx
            .session
            .open_chapter(&chapter("c2", "A house and a river."), &config("es"), 3)
            .await
            .unwrap();

        let first = first.await.unwrap();
        assert!(matches!(first, Err(PipelineError::Cancelled)));
        assert_eq!(second.chapter_id, "c2");
        assert_eq!(fx.session.active_chapter().unwrap().chapter_id, "c2");
        assert_eq!(fx.session.stats().chapters_processed, 1);
    }

    #[tokio::test]
    async fn test_cancel_keeps_previous_chapter() {
        let fx = fixture();
        fx.session
            .open_chapter(&chapter("c1", "The house."), &config("es"), 3)
            .await
            .unwrap();

        fx.store.slow.store(true, Ordering::SeqCst);
        let pending = {
            let session = fx.session.clone();
            tokio::spawn(async move {
                session
                    .open_chapter(&chapter("c2", "The house."), &config("de"), 3)
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(fx.session.cancel());

        assert!(matches!(pending.await.unwrap(), Err(PipelineError::Cancelled)));
        let active = fx.session.active_chapter().unwrap();
        assert_eq!(active.chapter_id, "c1");
        assert_eq!(active.markers[0].foreign_word, "casa");
    }

    #[tokio::test]
    async fn test_reprocess_uses_stored_text() {
        let fx = fixture();
        let err = fx.session.reprocess(&config("es"), 3).await.unwrap_err();
        assert!(matches!(err, PipelineError::NoActiveChapter));

        fx.session
            .open_chapter(&chapter("c1", "<p>The house stood.</p>"), &config("es"), 3)
            .await
            .unwrap();
        let german = fx.session.reprocess(&config("de"), 3).await.unwrap();
        assert_eq!(german.chapter_id, "c1");
        assert_eq!(german.markers[0].foreign_word, "Haus");
        assert_eq!(german.pair, LanguagePair::new("en", "de"));
    }

    #[tokio::test]
    async fn test_settings_change_while_opening_targets_new_chapter() {
        let fx = fixture();
        fx.session
            .open_chapter(&chapter("c1", "The house."), &config("es"), 3)
            .await
            .unwrap();

        fx.store.slow.store(true, Ordering::SeqCst);
        let pending = {
            let session = fx.session.clone();
            tokio::spawn(async move {
                session
                    .open_chapter(&chapter("c2", "A river and a house."), &config("de"), 3)
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        fx.store.slow.store(false, Ordering::SeqCst);
        let reprocessed = fx.session.reprocess(&config("es"), 3).await.unwrap();
        assert_eq!(reprocessed.chapter_id, "c2");

        assert!(matches!(pending.await.unwrap(), Err(PipelineError::Cancelled)));
        let active = fx.session.active_chapter().unwrap();
        assert_eq!(active.chapter_id, "c2");
        assert_eq!(active.pair, LanguagePair::new("en", "es"));
        assert_eq!(fx.session.stats().chapters_processed, 2);
    }

    #[tokio::test]
    async fn test_failed_chapter_leaves_state_alone() {
        let fx = fixture();
        fx.session
            .open_chapter(&chapter("c1", "The house."), &config("es"), 3)
            .await
            .unwrap();

        let err = fx
            .session
            .open_chapter(&chapter("c2", "<p></p>"), &config("es"), 3)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::EmptyContent(_)));
        assert_eq!(fx.session.active_chapter().unwrap().chapter_id, "c1");
    }

    #[tokio::test]
    async fn test_progress_events_are_throttled() {
        let fx = fixture();
        let forwarded: Vec<ReaderEvent> = [1.0, 1.2, 1.6, 99.9, 100.0, 100.0]
            .into_iter()
            .filter_map(|percent| fx.session.handle_event(ReaderEvent::Progress { percent }))
            .collect();
        assert_eq!(
            forwarded,
            vec![
                ReaderEvent::Progress { percent: 1.0 },
                ReaderEvent::Progress { percent: 1.6 },
                ReaderEvent::Progress { percent: 99.9 },
                ReaderEvent::Progress { percent: 100.0 },
            ]
        );
    }

    #[tokio::test]
    async fn test_present_to_surface() {
        #[derive(Default)]
        struct Recorder {
            loaded: Mutex<Vec<String>>,
            styles: Mutex<Vec<f32>>,
        }

        impl RenderSurface for Recorder {
            fn load_content(&self, payload: &ContentPayload) {
                self.loaded.lock().unwrap().push(payload.chapter_id.clone());
            }

            fn apply_settings(&self, style: &ReaderStyle) {
                self.styles.lock().unwrap().push(style.font_size);
            }
        }

        let fx = fixture();
        let surface = Recorder::default();
        assert!(matches!(
            fx.session.present(&surface, &ReaderStyle::default()),
            Err(PipelineError::NoActiveChapter)
        ));

        fx.session
            .open_chapter(&chapter("c1", "The river."), &config("es"), 3)
            .await
            .unwrap();
        fx.session.present(&surface, &ReaderStyle::default()).unwrap();
        assert_eq!(*surface.loaded.lock().unwrap(), vec!["c1".to_string()]);
        assert_eq!(*surface.styles.lock().unwrap(), vec![18.0]);
    }
}
