use serde::{Deserialize, Serialize};
use xenolexia_types::{LanguagePair, ProficiencyLevel, WordEntry};

use crate::frequency::proficiency_for_rank;

/// Outcome of a dictionary install or bulk import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

/// Untrusted word-list row, as found in JSON dictionaries and frequency lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawWordRow {
    pub id: Option<String>,
    pub source_word: Option<String>,
    pub target_word: Option<String>,
    pub proficiency_level: Option<String>,
    pub frequency_rank: Option<u32>,
    pub part_of_speech: Option<String>,
    pub variants: Vec<String>,
    pub pronunciation: Option<String>,
}

/// Stable id derived from the pair and the lowercased headword
pub fn entry_id(pair: &LanguagePair, source_word: &str) -> String {
    format!("{}_{}", pair.key(), source_word.trim().to_lowercase())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl RawWordRow {
    /// Build an entry for `pair`; `row` is the 1-based position used in error messages.
    pub fn into_entry(self, pair: &LanguagePair, row: usize) -> Result<WordEntry, String> {
        let source_word = non_empty(&self.source_word)
            .ok_or_else(|| format!("row {row}: missing source word"))?
            .to_string();
        let target_word = non_empty(&self.target_word)
            .ok_or_else(|| format!("row {row}: missing target word for '{source_word}'"))?
            .to_string();

        let frequency_rank = self.frequency_rank.unwrap_or(0);
        let proficiency_level = match non_empty(&self.proficiency_level) {
            Some(tag) => tag
                .parse::<ProficiencyLevel>()
                .map_err(|e| format!("row {row}: {e}"))?,
            None => proficiency_for_rank(frequency_rank),
        };

        let id = non_empty(&self.id)
            .map(str::to_string)
            .unwrap_or_else(|| entry_id(pair, &source_word));

        let variants = self
            .variants
            .into_iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();

        Ok(WordEntry {
            id,
            source_word,
            target_word,
            source_language: pair.source.clone(),
            target_language: pair.target.clone(),
            proficiency_level,
            frequency_rank,
            part_of_speech: non_empty(&self.part_of_speech).map(str::to_string),
            variants,
            pronunciation: non_empty(&self.pronunciation).map(str::to_string),
        })
    }
}

/// Check the fields an installed entry must carry
pub fn validate_entry(entry: &WordEntry, pair: &LanguagePair) -> Result<(), String> {
    if entry.id.trim().is_empty() {
        return Err(format!("entry '{}': missing id", entry.source_word));
    }
    if entry.source_word.trim().is_empty() {
        return Err(format!("entry {}: missing source word", entry.id));
    }
    if entry.target_word.trim().is_empty() {
        return Err(format!("entry {}: missing target word", entry.id));
    }
    if !entry.belongs_to(pair) {
        return Err(format!(
            "entry {}: language pair {} does not match {}",
            entry.id,
            entry.pair(),
            pair
        ));
    }
    Ok(())
}
