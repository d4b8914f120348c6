pub mod error;
pub mod export;
pub mod memory;
pub mod review;
pub mod scheduler;
pub mod stats;
pub mod template;

pub use error::{ExportError, ReviewError, SchedulerError};
pub use export::{EXPORT_FORMAT_ID, ExportFormat, export_csv, export_flashcards, export_json, export_vocabulary};
pub use memory::MemoryVocabularyStore;
pub use review::{ReviewSession, ReviewSummary, review_item};
pub use scheduler::{PASSING_QUALITY, ReviewOutcome, VocabularyScheduler};
pub use stats::{VocabularyStats, vocabulary_stats};
pub use template::CardTemplate;
