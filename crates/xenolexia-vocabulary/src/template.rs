use serde::{Deserialize, Serialize};
use xenolexia_types::VocabularyItem;

/// Front/back layout of an exported flashcard.
///
/// Placeholders: `{source}`, `{target}`, `{context}`, `{book}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardTemplate {
    pub deck: String,
    pub front_template: String,
    pub back_template: String,
}

impl Default for CardTemplate {
    fn default() -> Self {
        Self {
            deck: "Xenolexia".to_string(),
            front_template: "{target}".to_string(),
            back_template: "{source}<br>{context}".to_string(),
        }
    }
}

impl CardTemplate {
    pub fn new(deck: String, front: String, back: String) -> Self {
        Self {
            deck,
            front_template: front,
            back_template: back,
        }
    }

    pub fn format_front(&self, item: &VocabularyItem) -> String {
        fill(&self.front_template, item)
    }

    pub fn format_back(&self, item: &VocabularyItem) -> String {
        fill(&self.back_template, item)
    }
}

fn fill(template: &str, item: &VocabularyItem) -> String {
    template
        .replace("{source}", &item.source_word)
        .replace("{target}", &item.target_word)
        .replace("{context}", item.context_sentence.as_deref().unwrap_or_default())
        .replace("{book}", item.book_title.as_deref().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use xenolexia_types::NewVocabularyItem;

    use super::*;

    #[test]
    fn test_placeholders() {
        let item = VocabularyItem::new(
            "v1",
            NewVocabularyItem {
                source_word: "house".into(),
                target_word: "casa".into(),
                source_language: "en".into(),
                target_language: "es".into(),
                context_sentence: Some("the old house".into()),
                book_id: None,
                book_title: None,
            },
            Utc::now(),
        );
        let template = CardTemplate::new(
            "Spanish".into(),
            "{target} ({book})".into(),
            "{source} / {context}".into(),
        );
        assert_eq!(template.format_front(&item), "casa ()");
        assert_eq!(template.format_back(&item), "house / the old house");
    }
}
