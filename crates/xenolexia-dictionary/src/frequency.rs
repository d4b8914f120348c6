use std::path::Path;

use xenolexia_types::ProficiencyLevel;

use crate::error::DictionaryError;
use crate::import::RawWordRow;

pub const BEGINNER_MAX_RANK: u32 = 500;
pub const INTERMEDIATE_MAX_RANK: u32 = 2000;

/// Proficiency tier implied by a frequency rank.
///
/// Rank 0 marks an unranked word and is treated as advanced.
pub fn proficiency_for_rank(rank: u32) -> ProficiencyLevel {
    match rank {
        0 => ProficiencyLevel::Advanced,
        1..=BEGINNER_MAX_RANK => ProficiencyLevel::Beginner,
        r if r <= INTERMEDIATE_MAX_RANK => ProficiencyLevel::Intermediate,
        _ => ProficiencyLevel::Advanced,
    }
}

/// Raw frequency list: `source<TAB>target<TAB>rank[<TAB>part of speech]` per line
#[derive(Debug, Clone, Default)]
pub struct FrequencyList {
    pub rows: Vec<RawWordRow>,
}

impl FrequencyList {
    pub fn parse(content: &str) -> Self {
        let mut rows = Vec::new();

        for line in content.lines() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split('\t').map(str::trim).collect();
            let field = |i: usize| {
                parts
                    .get(i)
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string())
            };

            rows.push(RawWordRow {
                source_word: field(0),
                target_word: field(1),
                frequency_rank: parts.get(2).and_then(|r| r.parse().ok()),
                part_of_speech: field(3),
                ..Default::default()
            });
        }

        Self { rows }
    }

    pub fn load_from_file(path: &Path) -> Result<Self, DictionaryError> {
        if !path.exists() {
            return Err(DictionaryError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let list = Self::parse(&content);
        tracing::info!(
            "Parsed {} frequency rows from {}",
            list.rows.len(),
            path.display()
        );
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_boundaries() {
        assert_eq!(proficiency_for_rank(1), ProficiencyLevel::Beginner);
        assert_eq!(proficiency_for_rank(500), ProficiencyLevel::Beginner);
        assert_eq!(proficiency_for_rank(501), ProficiencyLevel::Intermediate);
        assert_eq!(proficiency_for_rank(2000), ProficiencyLevel::Intermediate);
        assert_eq!(proficiency_for_rank(2001), ProficiencyLevel::Advanced);
        assert_eq!(proficiency_for_rank(0), ProficiencyLevel::Advanced);
    }

    #[test]
    fn test_parse_tsv() {
        let content = "# en-es core list\nhouse\tcasa\t120\tnoun\r\n\ndog\tperro\tx\nlonely\t\t9\n";
        let list = FrequencyList::parse(content);
        assert_eq!(list.len(), 3);

        assert_eq!(list.rows[0].source_word.as_deref(), Some("house"));
        assert_eq!(list.rows[0].frequency_rank, Some(120));
        assert_eq!(list.rows[0].part_of_speech.as_deref(), Some("noun"));

        assert_eq!(list.rows[1].frequency_rank, None);
        assert!(list.rows[2].target_word.is_none());
    }
}
