use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::word::{LanguageCode, LanguagePair};

pub const DEFAULT_EASE_FACTOR: f64 = 2.5;
pub const MIN_EASE_FACTOR: f64 = 1.3;
/// Longest interval the scheduler hands out, in days
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VocabularyStatus {
    #[default]
    New,
    Learning,
    Review,
    Learned,
}

impl VocabularyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VocabularyStatus::New => "new",
            VocabularyStatus::Learning => "learning",
            VocabularyStatus::Review => "review",
            VocabularyStatus::Learned => "learned",
        }
    }
}

impl std::str::FromStr for VocabularyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(VocabularyStatus::New),
            "learning" => Ok(VocabularyStatus::Learning),
            "review" => Ok(VocabularyStatus::Review),
            "learned" => Ok(VocabularyStatus::Learned),
            other => Err(format!("unknown vocabulary status: {other}")),
        }
    }
}

/// A word the reader saved for review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyItem {
    pub id: String,
    pub source_word: String,
    pub target_word: String,
    pub source_language: LanguageCode,
    pub target_language: LanguageCode,
    pub context_sentence: Option<String>,
    pub book_id: Option<String>,
    pub book_title: Option<String>,
    pub added_at: DateTime<Utc>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub review_count: u32,
    /// Never below 1.3
    pub ease_factor: f64,
    /// Days until the next review
    pub interval: u32,
    pub status: VocabularyStatus,
}

impl VocabularyItem {
    /// Build a fresh, never-reviewed item
    pub fn new(id: impl Into<String>, word: NewVocabularyItem, added_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            source_word: word.source_word,
            target_word: word.target_word,
            source_language: word.source_language,
            target_language: word.target_language,
            context_sentence: word.context_sentence,
            book_id: word.book_id,
            book_title: word.book_title,
            added_at,
            last_reviewed_at: None,
            review_count: 0,
            ease_factor: DEFAULT_EASE_FACTOR,
            interval: 0,
            status: VocabularyStatus::New,
        }
    }

    pub fn pair(&self) -> LanguagePair {
        LanguagePair::new(self.source_language.clone(), self.target_language.clone())
    }

    /// When the item next becomes due.
    ///
    /// `None` when never reviewed, or when the interval runs past the
    /// representable calendar.
    pub fn next_review_at(&self) -> Option<DateTime<Utc>> {
        let at = self.last_reviewed_at?;
        Duration::try_days(i64::from(self.interval)).and_then(|days| at.checked_add_signed(days))
    }

    /// Not learned, and either never reviewed or its interval has elapsed
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        if self.status == VocabularyStatus::Learned {
            return false;
        }
        if self.last_reviewed_at.is_none() {
            return true;
        }
        // Out-of-range due dates are never reached
        self.next_review_at().is_some_and(|due_at| due_at <= now)
    }

    /// Two items describe the same word when text and languages match, ignoring case.
    pub fn same_word(&self, other: &NewVocabularyItem) -> bool {
        self.source_language == other.source_language
            && self.target_language == other.target_language
            && self.source_word.to_lowercase() == other.source_word.to_lowercase()
            && self.target_word.to_lowercase() == other.target_word.to_lowercase()
    }
}

/// Input for saving a word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVocabularyItem {
    pub source_word: String,
    pub target_word: String,
    pub source_language: LanguageCode,
    pub target_language: LanguageCode,
    #[serde(default)]
    pub context_sentence: Option<String>,
    #[serde(default)]
    pub book_id: Option<String>,
    #[serde(default)]
    pub book_title: Option<String>,
}

/// Partial update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyUpdate {
    pub source_word: Option<String>,
    pub target_word: Option<String>,
    /// `Some(None)` clears the sentence
    pub context_sentence: Option<Option<String>>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub review_count: Option<u32>,
    pub ease_factor: Option<f64>,
    pub interval: Option<u32>,
    pub status: Option<VocabularyStatus>,
}

impl VocabularyUpdate {
    pub fn apply_to(&self, item: &mut VocabularyItem) {
        if let Some(word) = &self.source_word {
            item.source_word = word.clone();
        }
        if let Some(word) = &self.target_word {
            item.target_word = word.clone();
        }
        if let Some(context) = &self.context_sentence {
            item.context_sentence = context.clone();
        }
        if let Some(at) = self.last_reviewed_at {
            item.last_reviewed_at = Some(at);
        }
        if let Some(count) = self.review_count {
            item.review_count = count;
        }
        if let Some(ease) = self.ease_factor {
            item.ease_factor = ease;
        }
        if let Some(interval) = self.interval {
            item.interval = interval;
        }
        if let Some(status) = self.status {
            item.status = status;
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == VocabularyUpdate::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyFilter {
    pub status: Option<VocabularyStatus>,
    pub source_language: Option<LanguageCode>,
    pub target_language: Option<LanguageCode>,
    pub book_id: Option<String>,
    /// Case-insensitive substring match on either word
    pub query: Option<String>,
}

impl VocabularyFilter {
    pub fn matches(&self, item: &VocabularyItem) -> bool {
        if self.status.is_some_and(|status| status != item.status) {
            return false;
        }
        if self
            .source_language
            .as_ref()
            .is_some_and(|lang| *lang != item.source_language)
        {
            return false;
        }
        if self
            .target_language
            .as_ref()
            .is_some_and(|lang| *lang != item.target_language)
        {
            return false;
        }
        if self
            .book_id
            .as_ref()
            .is_some_and(|book| item.book_id.as_ref() != Some(book))
        {
            return false;
        }
        if let Some(query) = &self.query {
            let query = query.to_lowercase();
            if !item.source_word.to_lowercase().contains(&query)
                && !item.target_word.to_lowercase().contains(&query)
            {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample() -> VocabularyItem {
        VocabularyItem::new(
            "v1",
            NewVocabularyItem {
                source_word: "house".into(),
                target_word: "casa".into(),
                source_language: "en".into(),
                target_language: "es".into(),
                context_sentence: Some("The house was old.".into()),
                book_id: Some("book-1".into()),
                book_title: None,
            },
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_new_item_defaults() {
        let item = sample();
        assert_eq!(item.status, VocabularyStatus::New);
        assert_eq!(item.interval, 0);
        assert_eq!(item.ease_factor, DEFAULT_EASE_FACTOR);
        assert!(item.last_reviewed_at.is_none());
    }

    #[test]
    fn test_due_predicate() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let mut item = sample();
        assert!(item.is_due(now));

        item.status = VocabularyStatus::Review;
        item.interval = 6;
        item.last_reviewed_at = Some(Utc.with_ymd_and_hms(2024, 1, 4, 12, 0, 0).unwrap());
        assert!(item.is_due(now));

        item.interval = 7;
        assert!(!item.is_due(now));

        item.status = VocabularyStatus::Learned;
        item.last_reviewed_at = None;
        assert!(!item.is_due(now));
    }

    #[test]
    fn test_huge_interval_is_never_due() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let mut item = sample();
        item.status = VocabularyStatus::Review;
        item.interval = u32::MAX;
        item.last_reviewed_at = Some(now);

        assert!(item.next_review_at().is_none());
        assert!(!item.is_due(now));
        assert!(!item.is_due(DateTime::<Utc>::MAX_UTC));
    }

    #[test]
    fn test_update_applies_only_set_fields() {
        let mut item = sample();
        let update = VocabularyUpdate {
            target_word: Some("hogar".into()),
            context_sentence: Some(None),
            ..Default::default()
        };
        update.apply_to(&mut item);
        assert_eq!(item.target_word, "hogar");
        assert_eq!(item.source_word, "house");
        assert!(item.context_sentence.is_none());
    }

    #[test]
    fn test_filter() {
        let item = sample();
        assert!(VocabularyFilter::default().matches(&item));
        let by_query = VocabularyFilter {
            query: Some("CAS".into()),
            ..Default::default()
        };
        assert!(by_query.matches(&item));
        let by_status = VocabularyFilter {
            status: Some(VocabularyStatus::Learned),
            ..Default::default()
        };
        assert!(!by_status.matches(&item));
        let by_book = VocabularyFilter {
            book_id: Some("book-2".into()),
            ..Default::default()
        };
        assert!(!by_book.matches(&item));
    }
}
