use std::path::Path;

use serde::{Deserialize, Serialize};
use xenolexia_types::LanguagePair;

use crate::error::DictionaryError;
use crate::frequency::FrequencyList;
use crate::import::RawWordRow;

/// On-disk dictionary bundle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DictionaryFile {
    pub source_language: String,
    pub target_language: String,
    pub entries: Vec<RawWordRow>,
}

impl DictionaryFile {
    pub fn from_json(json: &str) -> Result<Self, DictionaryError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn pair(&self) -> LanguagePair {
        LanguagePair::new(&self.source_language, &self.target_language)
    }
}

pub struct DictionaryLoader;

impl DictionaryLoader {
    /// Load a `.json` bundle or a `.tsv` frequency list.
    ///
    /// `pair` fills in languages the file does not name; a TSV list carries none.
    pub fn load_from_file(
        path: &Path,
        pair: Option<&LanguagePair>,
    ) -> Result<DictionaryFile, DictionaryError> {
        if !path.exists() {
            return Err(DictionaryError::FileNotFound(path.display().to_string()));
        }
        tracing::info!("Loading dictionary from file: {}", path.display());

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let mut file = match extension.as_str() {
            "json" => DictionaryFile::from_json(&std::fs::read_to_string(path)?)?,
            "tsv" | "txt" => DictionaryFile {
                entries: FrequencyList::load_from_file(path)?.rows,
                ..Default::default()
            },
            other => {
                return Err(DictionaryError::InvalidFormat(format!(
                    "unsupported dictionary extension '{other}'"
                )));
            }
        };

        if let Some(pair) = pair {
            if file.source_language.trim().is_empty() {
                file.source_language = pair.source.clone();
            }
            if file.target_language.trim().is_empty() {
                file.target_language = pair.target.clone();
            }
        }
        if file.source_language.trim().is_empty() || file.target_language.trim().is_empty() {
            return Err(DictionaryError::InvalidFormat(format!(
                "{} does not name its languages",
                path.display()
            )));
        }

        tracing::info!(
            "Loaded {} rows for {} from file",
            file.entries.len(),
            file.pair()
        );
        Ok(file)
    }
}
