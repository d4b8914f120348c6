use std::path::Path;
use std::sync::Arc;

use xenolexia_config::Config;
use xenolexia_dictionary::{DictionaryLoader, MemoryWordStore, TranslationIndex};
use xenolexia_engine::WordReplacementEngine;
use xenolexia_reader::{ChapterPipeline, ReaderSession, RenderSurface};
use xenolexia_vocabulary::MemoryVocabularyStore;

use crate::persistence::DataDir;

/// Stores, index and reading session shared by the event loop and the commands
pub struct Services {
    pub words: Arc<MemoryWordStore>,
    pub vocabulary: Arc<MemoryVocabularyStore>,
    pub index: Arc<TranslationIndex>,
    pub session: Arc<ReaderSession>,
    pub surface: Arc<dyn RenderSurface>,
}

impl Services {
    pub fn new(
        words: MemoryWordStore,
        vocabulary: MemoryVocabularyStore,
        surface: Arc<dyn RenderSurface>,
        config: &Config,
        book: Option<(String, Option<String>)>,
    ) -> Self {
        let words = Arc::new(words);
        let vocabulary = Arc::new(vocabulary);
        let index = Arc::new(TranslationIndex::new(words.clone()));
        let engine = Arc::new(WordReplacementEngine::new(index.clone()));
        let pipeline = Arc::new(ChapterPipeline::new(engine));

        let mut session =
            ReaderSession::new(pipeline, vocabulary.clone(), config.reader.progress_step);
        if let Some((id, title)) = book {
            session = session.with_book(id, title);
        }

        Self {
            words,
            vocabulary,
            index,
            session: Arc::new(session),
            surface,
        }
    }

    /// Services backed by the snapshots in `data`
    pub fn load(
        data: &DataDir,
        surface: Arc<dyn RenderSurface>,
        config: &Config,
        book: Option<(String, Option<String>)>,
    ) -> anyhow::Result<Self> {
        let words = MemoryWordStore::with_entries(data.load_words()?);
        let vocabulary = MemoryVocabularyStore::with_items(data.load_vocabulary()?);
        Ok(Self::new(words, vocabulary, surface, config, book))
    }

    /// Install the dictionary files named in the profile; failures are logged and skipped
    pub async fn install_configured_dictionaries(&self, config: &Config) {
        if !config.dictionary.enabled {
            tracing::warn!("Dictionary disabled, skipping configured dictionary files");
            return;
        }

        let pair = config.replacement.language_pair();
        for path in &config.dictionary.paths {
            let file = match DictionaryLoader::load_from_file(Path::new(path), Some(&pair)) {
                Ok(file) => file,
                Err(e) => {
                    tracing::warn!("Skipping dictionary {}: {}", path, e);
                    continue;
                }
            };
            let file_pair = file.pair();
            if let Err(e) = self.index.bulk_import(file.entries, &file_pair).await {
                tracing::warn!("Failed to install dictionary {}: {}", path, e);
            }
        }
    }

    pub async fn persist_words(&self, data: &DataDir) -> anyhow::Result<()> {
        data.save_words(&self.words.snapshot().await)
    }

    pub async fn persist_vocabulary(&self, data: &DataDir) -> anyhow::Result<()> {
        data.save_vocabulary(&self.vocabulary.snapshot().await)
    }
}
