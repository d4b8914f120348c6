use xenolexia_config::ConfigError;
use xenolexia_dictionary::DictionaryError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid replacement settings: {0}")]
    Config(#[from] ConfigError),

    #[error("Dictionary lookup failed: {0}")]
    Dictionary(#[from] DictionaryError),
}
