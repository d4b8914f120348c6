use xenolexia_core::StoreError;
use xenolexia_engine::EngineError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Chapter processing was cancelled")]
    Cancelled,

    #[error("Chapter {0} has no readable text")]
    EmptyContent(String),

    #[error("No chapter is open")]
    NoActiveChapter,

    #[error("Word {0} is not part of the open chapter")]
    UnknownWord(String),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
