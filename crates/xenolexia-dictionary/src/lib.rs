pub mod error;
pub mod frequency;
pub mod import;
pub mod index;
pub mod loader;
pub mod memory;

pub use error::DictionaryError;
pub use frequency::{FrequencyList, proficiency_for_rank};
pub use import::{ImportReport, RawWordRow};
pub use index::{LookupOptions, PairState, TranslationIndex};
pub use loader::{DictionaryFile, DictionaryLoader};
pub use memory::MemoryWordStore;
