use std::fmt::Write;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use xenolexia_core::VocabularyStore;
use xenolexia_types::{VocabularyFilter, VocabularyItem};

use crate::error::ExportError;
use crate::template::CardTemplate;

pub const EXPORT_FORMAT_ID: &str = "xenolexia-vocabulary-v1";

const CSV_HEADER: &str = "sourceWord,targetWord,sourceLanguage,targetLanguage,contextSentence,bookTitle,status,reviewCount,easeFactor,interval,addedAt,lastReviewedAt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Flashcards,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Flashcards => "tsv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "flashcards" | "anki" | "tsv" => Ok(ExportFormat::Flashcards),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    exported_at: String,
    item_count: usize,
    format: &'static str,
    items: &'a [VocabularyItem],
}

pub fn export_json(items: &[VocabularyItem], now: DateTime<Utc>) -> Result<String, ExportError> {
    let document = ExportDocument {
        exported_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        item_count: items.len(),
        format: EXPORT_FORMAT_ID,
        items,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

pub fn export_csv(items: &[VocabularyItem]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for item in items {
        let row = [
            csv_field(&item.source_word),
            csv_field(&item.target_word),
            csv_field(&item.source_language),
            csv_field(&item.target_language),
            csv_field(item.context_sentence.as_deref().unwrap_or_default()),
            csv_field(item.book_title.as_deref().unwrap_or_default()),
            item.status.as_str().to_string(),
            item.review_count.to_string(),
            format!("{:.2}", item.ease_factor),
            item.interval.to_string(),
            item.added_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            item.last_reviewed_at
                .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
                .unwrap_or_default(),
        ];
        let _ = writeln!(out, "{}", row.join(","));
    }
    out
}

/// Quote a field when it holds a comma, quote or line break; inner quotes are doubled
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Tab-separated front/back cards, one per line, with the deck in the first column
pub fn export_flashcards(items: &[VocabularyItem], template: &CardTemplate) -> String {
    let mut out = String::new();
    for item in items {
        let _ = writeln!(
            out,
            "{}\t{}\t{}",
            tsv_field(&template.deck),
            tsv_field(&template.format_front(item)),
            tsv_field(&template.format_back(item))
        );
    }
    out
}

fn tsv_field(value: &str) -> String {
    value
        .replace(['\t', '\n', '\r'], " ")
        .trim()
        .to_string()
}

/// Serialize the items matching `filter`; an empty match is an error, not an empty file
pub async fn export_vocabulary(
    store: &dyn VocabularyStore,
    filter: &VocabularyFilter,
    format: ExportFormat,
    template: &CardTemplate,
    now: DateTime<Utc>,
) -> Result<String, ExportError> {
    let items = store.list_vocabulary(filter).await?;
    if items.is_empty() {
        return Err(ExportError::NoMatchingItems);
    }

    let output = match format {
        ExportFormat::Json => export_json(&items, now)?,
        ExportFormat::Csv => export_csv(&items),
        ExportFormat::Flashcards => export_flashcards(&items, template),
    };
    tracing::info!("Exported {} vocabulary items as {:?}", items.len(), format);
    Ok(output)
}
