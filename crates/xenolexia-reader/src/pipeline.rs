use std::sync::Arc;

use serde::Serialize;
use xenolexia_config::ReplacementConfig;
use xenolexia_core::preprocess::{DefaultPreprocessor, Preprocessor};
use xenolexia_core::text::{TokenizedText, tokenize};
use xenolexia_engine::{ProcessedText, WordReplacementEngine};
use xenolexia_types::{Chapter, LanguagePair};

use crate::context::context_window;
use crate::error::PipelineError;
use crate::markup::render_markup;

/// Chapter text after markup stripping, kept for re-processing
#[derive(Debug, Clone)]
pub struct PreparedChapter {
    pub chapter_id: String,
    pub title: String,
    pub plain_text: String,
    pub tokens: TokenizedText,
}

/// Metadata behind one interactive element of the markup
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordMarker {
    pub index: usize,
    pub word_id: String,
    pub original_word: String,
    pub foreign_word: String,
    pub pronunciation: Option<String>,
    pub part_of_speech: Option<String>,
    pub position: usize,
    pub block: usize,
    pub context: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedChapter {
    pub chapter_id: String,
    pub title: String,
    pub pair: LanguagePair,
    pub markup: String,
    pub markers: Vec<WordMarker>,
    pub text: ProcessedText,
}

impl ProcessedChapter {
    pub fn marker_for_word(&self, word_id: &str) -> Option<&WordMarker> {
        self.markers.iter().find(|m| m.word_id == word_id)
    }
}

pub struct ChapterPipeline {
    engine: Arc<WordReplacementEngine>,
    preprocessor: Box<dyn Preprocessor + Send + Sync>,
}

impl ChapterPipeline {
    pub fn new(engine: Arc<WordReplacementEngine>) -> Self {
        Self::with_preprocessor(engine, DefaultPreprocessor)
    }

    pub fn with_preprocessor(
        engine: Arc<WordReplacementEngine>,
        preprocessor: impl Preprocessor + Send + Sync + 'static,
    ) -> Self {
        Self {
            engine,
            preprocessor: Box::new(preprocessor),
        }
    }

    pub fn engine(&self) -> &Arc<WordReplacementEngine> {
        &self.engine
    }

    /// Strip and tokenize chapter content once
    pub fn prepare(&self, chapter: &Chapter) -> Result<PreparedChapter, PipelineError> {
        let plain_text = self.preprocessor.process(&chapter.content);
        let tokens = tokenize(&plain_text);

        if tokens.word_count() == 0 {
            return Err(PipelineError::EmptyContent(chapter.id.clone()));
        }
        if chapter.word_count > 0 && chapter.word_count as usize != tokens.word_count() {
            tracing::debug!(
                "Chapter {} reports {} words, tokenized {}",
                chapter.id,
                chapter.word_count,
                tokens.word_count()
            );
        }

        Ok(PreparedChapter {
            chapter_id: chapter.id.clone(),
            title: chapter.title.clone(),
            plain_text,
            tokens,
        })
    }

    /// Run replacement over already prepared text
    pub async fn process_prepared(
        &self,
        prepared: &PreparedChapter,
        config: &ReplacementConfig,
        context_words: usize,
    ) -> Result<ProcessedChapter, PipelineError> {
        let text = self
            .engine
            .process_tokenized(&prepared.plain_text, &prepared.tokens, config)
            .await?;

        let markers = text
            .spans
            .iter()
            .enumerate()
            .map(|(index, span)| WordMarker {
                index,
                word_id: span.entry.id.clone(),
                original_word: span.original_word.clone(),
                foreign_word: span.foreign_word.clone(),
                pronunciation: span.entry.pronunciation.clone(),
                part_of_speech: span.entry.part_of_speech.clone(),
                position: span.position,
                block: span.block,
                context: context_window(
                    &prepared.tokens,
                    &prepared.plain_text,
                    span.position,
                    context_words,
                ),
            })
            .collect();

        let markup = render_markup(&text);

        tracing::info!(
            "Processed chapter {} ({}): {} substitutions over {} words",
            prepared.chapter_id,
            config.language_pair(),
            text.stats.replaced_words,
            text.stats.total_words
        );

        Ok(ProcessedChapter {
            chapter_id: prepared.chapter_id.clone(),
            title: prepared.title.clone(),
            pair: config.language_pair(),
            markup,
            markers,
            text,
        })
    }

    pub async fn process_chapter(
        &self,
        chapter: &Chapter,
        config: &ReplacementConfig,
        context_words: usize,
    ) -> Result<ProcessedChapter, PipelineError> {
        let prepared = self.prepare(chapter)?;
        self.process_prepared(&prepared, config, context_words).await
    }
}

#[cfg(test)]
mod tests {
    use xenolexia_dictionary::{MemoryWordStore, TranslationIndex};
    use xenolexia_types::{ProficiencyLevel, WordEntry};

    use super::*;

    fn entry(word: &str, target: &str) -> WordEntry {
        WordEntry {
            id: format!("en_es_{word}"),
            source_word: word.into(),
            target_word: target.into(),
            source_language: "en".into(),
            target_language: "es".into(),
            proficiency_level: ProficiencyLevel::Beginner,
            frequency_rank: 50,
            part_of_speech: Some("noun".into()),
            variants: Vec::new(),
            pronunciation: None,
        }
    }

    fn pipeline() -> ChapterPipeline {
        let store = MemoryWordStore::with_entries([
            entry("house", "casa"),
            entry("garden", "jardín"),
            entry("water", "agua"),
        ]);
        let index = Arc::new(TranslationIndex::new(Arc::new(store)));
        ChapterPipeline::new(Arc::new(WordReplacementEngine::new(index)))
    }

    fn chapter(content: &str) -> Chapter {
        Chapter {
            id: "ch-1".into(),
            index: 0,
            title: "One".into(),
            content: content.into(),
            word_count: 0,
        }
    }

    fn config() -> ReplacementConfig {
        ReplacementConfig {
            density: 0.5,
            min_word_spacing: 0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_html_chapter_becomes_markup() {
        let pipeline = pipeline();
        let html = "<html><head><title>x</title></head><body>\
                    <p>The house had a garden.</p><p>Cold water &amp; bread.</p></body></html>";

        let processed = pipeline
            .process_chapter(&chapter(html), &config(), 2)
            .await
            .unwrap();

        assert_eq!(processed.markers.len(), 2);
        assert_eq!(processed.markers[0].word_id, "en_es_house");
        assert_eq!(processed.markers[0].context, "The house had a");
        assert_eq!(processed.markers[1].foreign_word, "agua");
        assert_eq!(processed.markers[1].context, "Cold water & bread");
        assert!(processed.markup.starts_with("<p>The <span class=\"foreign-word\""));
        assert!(processed.markup.contains("</p>\n<p>Cold "));
        assert!(processed.markup.contains("&amp; bread.</p>"));
        assert_eq!(processed.text.text, "The casa had a garden.\n\nCold agua & bread.");
    }

    #[tokio::test]
    async fn test_reprocess_from_prepared_text() {
        let pipeline = pipeline();
        let prepared = pipeline
            .prepare(&chapter("The house had a garden with water."))
            .unwrap();

        let sparse = pipeline.process_prepared(&prepared, &config(), 3).await.unwrap();
        let mut dense_config = config();
        dense_config.density = 0.9;
        let dense = pipeline
            .process_prepared(&prepared, &dense_config, 3)
            .await
            .unwrap();

        assert!(dense.markers.len() > sparse.markers.len());
        assert_eq!(prepared.plain_text, "The house had a garden with water.");
    }

    #[tokio::test]
    async fn test_empty_chapter_rejected() {
        let pipeline = pipeline();
        let err = pipeline
            .process_chapter(&chapter("<div>  </div><p>...</p>"), &config(), 3)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::EmptyContent(id) if id == "ch-1"));
    }
}
