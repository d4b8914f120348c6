pub mod events;
pub mod vocabulary;
pub mod word;

pub use events::{AppEvent, Chapter, ReaderEvent, ReaderStyle, TextAlign, WordTapEvent};
pub use vocabulary::{
    DEFAULT_EASE_FACTOR, MAX_INTERVAL_DAYS, MIN_EASE_FACTOR, NewVocabularyItem, VocabularyFilter,
    VocabularyItem, VocabularyStatus, VocabularyUpdate,
};
pub use word::{LanguageCode, LanguagePair, ProficiencyLevel, WordEntry};
