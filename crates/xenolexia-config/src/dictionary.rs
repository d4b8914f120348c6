use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DictionaryConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Dictionary files (JSON or TSV frequency lists) installed at startup
    #[serde(default)]
    pub paths: Vec<String>,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            paths: vec![],
        }
    }
}
