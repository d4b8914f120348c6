use serde::{Deserialize, Serialize};
use xenolexia_types::ReaderStyle;

fn default_context_words() -> usize {
    5
}

fn default_progress_step() -> f32 {
    0.5
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ReaderConfig {
    pub style: ReaderStyle,
    /// Words on each side of a tapped word kept as its context
    #[serde(default = "default_context_words")]
    pub context_words: usize,
    /// Minimum change between two progress reports, in percent
    #[serde(default = "default_progress_step")]
    pub progress_step: f32,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            style: ReaderStyle::default(),
            context_words: default_context_words(),
            progress_step: default_progress_step(),
        }
    }
}
