use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// ISO 639-1 code ("en", "es", "de", ...)
pub type LanguageCode = String;

/// Coarse vocabulary difficulty tier
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProficiencyLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl ProficiencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProficiencyLevel::Beginner => "beginner",
            ProficiencyLevel::Intermediate => "intermediate",
            ProficiencyLevel::Advanced => "advanced",
        }
    }

    /// True when an entry tagged `self` may be shown to a reader at `reader_level`.
    /// A reader draws from their own tier and every easier one.
    pub fn is_within(&self, reader_level: ProficiencyLevel) -> bool {
        *self <= reader_level
    }
}

impl fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProficiencyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" | "a1" | "a2" => Ok(ProficiencyLevel::Beginner),
            "intermediate" | "b1" | "b2" => Ok(ProficiencyLevel::Intermediate),
            "advanced" | "c1" | "c2" => Ok(ProficiencyLevel::Advanced),
            other => Err(format!("unknown proficiency level: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LanguagePair {
    pub source: LanguageCode,
    pub target: LanguageCode,
}

impl LanguagePair {
    pub fn new(source: impl Into<LanguageCode>, target: impl Into<LanguageCode>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Cache key in `source_target` form
    pub fn key(&self) -> String {
        format!("{}_{}", self.source, self.target)
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// A single dictionary fact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordEntry {
    pub id: String,
    pub source_word: String,
    pub target_word: String,
    pub source_language: LanguageCode,
    pub target_language: LanguageCode,
    pub proficiency_level: ProficiencyLevel,
    /// Lower = more common, 0 = unranked
    #[serde(default)]
    pub frequency_rank: u32,
    #[serde(default)]
    pub part_of_speech: Option<String>,
    /// Inflected surface forms resolving to this entry
    #[serde(default)]
    pub variants: Vec<String>,
    #[serde(default)]
    pub pronunciation: Option<String>,
}

impl WordEntry {
    pub fn pair(&self) -> LanguagePair {
        LanguagePair::new(self.source_language.clone(), self.target_language.clone())
    }

    pub fn belongs_to(&self, pair: &LanguagePair) -> bool {
        self.source_language == pair.source && self.target_language == pair.target
    }

    /// Lowercased headword used as the direct-map key
    pub fn normalized_word(&self) -> String {
        self.source_word.trim().to_lowercase()
    }
}
