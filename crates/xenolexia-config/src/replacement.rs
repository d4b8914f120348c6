use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use xenolexia_types::{LanguageCode, LanguagePair, ProficiencyLevel};

use crate::ConfigError;

/// Hard ceiling on substitutions in a single sentence
pub const MAX_REPLACEMENTS_PER_SENTENCE: usize = 5;

fn default_source_language() -> LanguageCode {
    "en".to_string()
}

fn default_target_language() -> LanguageCode {
    "es".to_string()
}

fn default_density() -> f64 {
    0.3
}

fn default_min_word_spacing() -> usize {
    3
}

fn default_max_per_sentence() -> usize {
    MAX_REPLACEMENTS_PER_SENTENCE
}

fn default_protected_words() -> BTreeSet<String> {
    [
        "a", "an", "the", "and", "or", "but", "if", "of", "to", "in", "on", "at", "by", "for",
        "with", "as", "is", "are", "was", "were", "be", "been", "it", "its", "i", "you", "he",
        "she", "we", "they", "me", "him", "her", "us", "them", "my", "your", "his", "our",
        "their", "this", "that", "not", "no", "so", "do", "did", "had", "has", "have",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ReplacementConfig {
    #[serde(default = "default_source_language")]
    pub source_language: LanguageCode,
    #[serde(default = "default_target_language")]
    pub target_language: LanguageCode,
    pub proficiency_level: ProficiencyLevel,
    /// Target fraction of eligible words replaced, strictly inside (0, 1)
    #[serde(default = "default_density")]
    pub density: f64,
    /// Never replaced (stopwords, names, known words)
    #[serde(default = "default_protected_words")]
    pub protected_words: BTreeSet<String>,
    /// Minimum distance, in words, between two substitutions
    #[serde(default = "default_min_word_spacing")]
    pub min_word_spacing: usize,
    #[serde(default = "default_max_per_sentence")]
    pub max_replacements_per_sentence: usize,
}

impl Default for ReplacementConfig {
    fn default() -> Self {
        Self {
            source_language: default_source_language(),
            target_language: default_target_language(),
            proficiency_level: ProficiencyLevel::default(),
            density: default_density(),
            protected_words: default_protected_words(),
            min_word_spacing: default_min_word_spacing(),
            max_replacements_per_sentence: default_max_per_sentence(),
        }
    }
}

impl ReplacementConfig {
    pub fn language_pair(&self) -> LanguagePair {
        LanguagePair::new(self.source_language.clone(), self.target_language.clone())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.density > 0.0 && self.density < 1.0) {
            return Err(ConfigError::InvalidDensity(self.density));
        }
        if self.source_language.trim().is_empty() || self.target_language.trim().is_empty() {
            return Err(ConfigError::MissingLanguage);
        }
        if self.source_language == self.target_language {
            return Err(ConfigError::SameLanguage(self.source_language.clone()));
        }
        if self.max_replacements_per_sentence == 0 {
            return Err(ConfigError::Invalid(
                "max_replacements_per_sentence must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-sentence cap, clamped to the hard ceiling
    pub fn sentence_cap(&self) -> usize {
        self.max_replacements_per_sentence
            .clamp(1, MAX_REPLACEMENTS_PER_SENTENCE)
    }

    /// Protected words lowercased and trimmed, ready for token comparison
    pub fn normalized_protected_words(&self) -> BTreeSet<String> {
        self.protected_words
            .iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect()
    }
}
