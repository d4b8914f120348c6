use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;
use xenolexia_config::ReplacementConfig;
use xenolexia_core::text::{TokenizedText, tokenize};
use xenolexia_dictionary::{LookupOptions, TranslationIndex};
use xenolexia_types::WordEntry;

use crate::error::EngineError;
use crate::selection::{apply_selection, select_candidates};

/// One replaced word occurrence
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstitutionSpan {
    pub original_word: String,
    pub foreign_word: String,
    /// Char offsets into the processed text
    pub start_index: usize,
    pub end_index: usize,
    /// Word position in the source token stream
    pub position: usize,
    pub sentence: usize,
    pub block: usize,
    pub entry: WordEntry,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementStats {
    pub total_words: usize,
    pub eligible_words: usize,
    pub replaced_words: usize,
}

impl ReplacementStats {
    /// Fraction of eligible words that were replaced
    pub fn achieved_density(&self) -> f64 {
        if self.eligible_words == 0 {
            0.0
        } else {
            self.replaced_words as f64 / self.eligible_words as f64
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedText {
    pub text: String,
    pub spans: Vec<SubstitutionSpan>,
    pub stats: ReplacementStats,
}

/// Chooses and applies substitutions for a passage.
///
/// Only dictionary resolution touches the index; selection and rewriting are
/// pure, so the same passage, dictionary and settings always give the same
/// output.
pub struct WordReplacementEngine {
    index: Arc<TranslationIndex>,
    lookup: LookupOptions,
}

impl WordReplacementEngine {
    pub fn new(index: Arc<TranslationIndex>) -> Self {
        Self {
            index,
            lookup: LookupOptions::default(),
        }
    }

    pub fn index(&self) -> &Arc<TranslationIndex> {
        &self.index
    }

    pub async fn process(
        &self,
        text: &str,
        config: &ReplacementConfig,
    ) -> Result<ProcessedText, EngineError> {
        let tokens = tokenize(text);
        self.process_tokenized(text, &tokens, config).await
    }

    /// Same as [`Self::process`] for callers that already hold the tokens of `text`
    pub async fn process_tokenized(
        &self,
        text: &str,
        tokens: &TokenizedText,
        config: &ReplacementConfig,
    ) -> Result<ProcessedText, EngineError> {
        config.validate()?;

        let resolved = self.resolve(tokens, config).await?;
        let selection = select_candidates(tokens, &resolved, config);
        let processed = apply_selection(text, tokens, &resolved, &selection);

        tracing::debug!(
            "Replaced {}/{} eligible words ({} total, target density {:.2})",
            processed.stats.replaced_words,
            processed.stats.eligible_words,
            processed.stats.total_words,
            config.density
        );
        Ok(processed)
    }

    /// Translations for every distinct, unprotected word at or below the reader's level
    pub async fn resolve(
        &self,
        tokens: &TokenizedText,
        config: &ReplacementConfig,
    ) -> Result<HashMap<String, WordEntry>, EngineError> {
        let protected = config.normalized_protected_words();
        let words: Vec<&str> = tokens
            .tokens
            .iter()
            .map(|t| t.normalized.as_str())
            .filter(|w| is_candidate_word(w) && !protected.contains(*w))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if words.is_empty() {
            return Ok(HashMap::new());
        }

        let pair = config.language_pair();
        let found = self.index.lookup_words(words.as_slice(), &pair, self.lookup).await?;

        Ok(found
            .into_iter()
            .filter_map(|(word, entry)| {
                entry
                    .filter(|e| e.proficiency_level.is_within(config.proficiency_level))
                    .map(|e| (word, e))
            })
            .collect())
    }
}

fn is_candidate_word(word: &str) -> bool {
    word.chars().any(char::is_alphabetic)
}
