use serde::{Deserialize, Serialize};

use crate::vocabulary::VocabularyStatus;

/// Chapter as handed over by the book parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub index: u32,
    pub title: String,
    /// HTML or plain text
    pub content: String,
    #[serde(default)]
    pub word_count: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
    Justify,
}

/// Payload of the rendering surface's `applySettings` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderStyle {
    pub font_size: f32,
    pub font_family: String,
    pub line_height: f32,
    pub text_align: TextAlign,
    pub margin_horizontal: f32,
}

impl Default for ReaderStyle {
    fn default() -> Self {
        Self {
            font_size: 18.0,
            font_family: "serif".to_string(),
            line_height: 1.6,
            text_align: TextAlign::Left,
            margin_horizontal: 24.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordTapEvent {
    pub foreign_word: String,
    pub original_word: String,
    pub word_id: String,
    /// Excerpt of surrounding words from the containing block
    pub context: String,
}

/// Events emitted by the rendering surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ReaderEvent {
    WordTap(WordTapEvent),
    WordLongPress(WordTapEvent),
    /// Read fraction in 0..=100
    Progress { percent: f32 },
    ContentReady { chapter_id: String },
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    ConfigChanged,
    OpenChapter(Chapter),
    ChapterReady {
        chapter_id: String,
        markup: String,
        substitution_count: usize,
    },
    ChapterFailed {
        chapter_id: String,
        message: String,
    },
    Reader(ReaderEvent),
    /// Add the tapped word to the vocabulary
    SaveWord(WordTapEvent),
    WordSaved {
        item_id: String,
        source_word: String,
    },
    GradeReview {
        item_id: String,
        quality: u8,
    },
    Reviewed {
        item_id: String,
        status: VocabularyStatus,
        interval: u32,
    },
    StatusUpdate(String),
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_event_wire_format() {
        let event = ReaderEvent::WordTap(WordTapEvent {
            foreign_word: "casa".into(),
            original_word: "house".into(),
            word_id: "en_es_house".into(),
            context: "the old house stood".into(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "wordTap");
        assert_eq!(json["foreignWord"], "casa");
        assert_eq!(json["wordId"], "en_es_house");

        let progress: ReaderEvent =
            serde_json::from_str(r#"{"type":"progress","percent":42.5}"#).unwrap();
        assert_eq!(progress, ReaderEvent::Progress { percent: 42.5 });
    }
}
