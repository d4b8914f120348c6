use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use self::dictionary::DictionaryConfig;
pub use self::reader::ReaderConfig;
pub use self::replacement::ReplacementConfig;
pub use self::review::ReviewConfig;

pub mod dictionary;
pub mod reader;
pub mod replacement;
pub mod review;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("density must be strictly between 0 and 1, got {0}")]
    InvalidDensity(f64),

    #[error("source and target language are required")]
    MissingLanguage,

    #[error("source and target language are both '{0}'")]
    SameLanguage(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub replacement: ReplacementConfig,
    pub reader: ReaderConfig,
    pub review: ReviewConfig,
    pub dictionary: DictionaryConfig,
}

/// Parse an environment variable, keeping `default` when unset or malformed
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Defaults with environment overrides applied
    pub fn new() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Self {
        let replacement = &mut self.replacement;
        replacement.source_language = env_or(
            "XENOLEXIA_SOURCE_LANG",
            replacement.source_language.clone(),
        );
        replacement.target_language = env_or(
            "XENOLEXIA_TARGET_LANG",
            replacement.target_language.clone(),
        );
        replacement.proficiency_level = env_or("XENOLEXIA_LEVEL", replacement.proficiency_level);
        replacement.density = env_or("XENOLEXIA_DENSITY", replacement.density);
        replacement.min_word_spacing =
            env_or("XENOLEXIA_MIN_SPACING", replacement.min_word_spacing);

        self.reader.context_words = env_or("XENOLEXIA_CONTEXT_WORDS", self.reader.context_words);
        self.review.session_limit = env_or("XENOLEXIA_REVIEW_LIMIT", self.review.session_limit);

        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.replacement.validate()?;
        if !(self.reader.progress_step > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "progress_step must be positive, got {}",
                self.reader.progress_step
            )));
        }
        Ok(())
    }
}
