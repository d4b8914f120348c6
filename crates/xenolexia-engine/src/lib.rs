pub mod engine;
pub mod error;
pub mod selection;

pub use engine::{ProcessedText, ReplacementStats, SubstitutionSpan, WordReplacementEngine};
pub use error::EngineError;
pub use selection::{Selection, apply_selection, match_case, select_candidates, sentence_quota};
