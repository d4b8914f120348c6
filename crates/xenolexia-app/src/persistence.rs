use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;
use xenolexia_types::{VocabularyItem, WordEntry};

/// JSON snapshots of the word list and saved vocabulary
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn open(root: PathBuf) -> anyhow::Result<Self> {
        fs::create_dir_all(&root)
            .with_context(|| format!("failed to create data directory {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn words_path(&self) -> PathBuf {
        self.root.join("words.json")
    }

    fn vocabulary_path(&self) -> PathBuf {
        self.root.join("vocabulary.json")
    }

    pub fn load_words(&self) -> anyhow::Result<Vec<WordEntry>> {
        read_snapshot(&self.words_path())
    }

    pub fn save_words(&self, entries: &[WordEntry]) -> anyhow::Result<()> {
        write_snapshot(&self.words_path(), entries)
    }

    pub fn load_vocabulary(&self) -> anyhow::Result<Vec<VocabularyItem>> {
        read_snapshot(&self.vocabulary_path())
    }

    pub fn save_vocabulary(&self, items: &[VocabularyItem]) -> anyhow::Result<()> {
        write_snapshot(&self.vocabulary_path(), items)
    }
}

fn read_snapshot<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let items: Vec<T> =
        serde_json::from_str(&data).with_context(|| format!("malformed snapshot {}", path.display()))?;
    tracing::debug!("Loaded {} records from {}", items.len(), path.display());
    Ok(items)
}

/// Write next to the target, then rename over it
fn write_snapshot<T: Serialize>(path: &Path, items: &[T]) -> anyhow::Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_string_pretty(items)?)
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("failed to replace {}", path.display()))?;
    tracing::debug!("Saved {} records to {}", items.len(), path.display());
    Ok(())
}
