use xenolexia_core::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Loading {pair} failed: {message}")]
    LoadFailed { pair: String, message: String },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
