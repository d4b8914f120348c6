use xenolexia_core::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("Review quality must be 0-5, got {0}")]
    InvalidQuality(u8),

    #[error("Item {id} has ease factor {ease_factor}, below the 1.3 floor")]
    CorruptEaseFactor { id: String, ease_factor: f64 },
}

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("No item left to review")]
    Finished,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No vocabulary items match the filter")]
    NoMatchingItems,

    #[error("Unknown export format: {0}")]
    UnknownFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
