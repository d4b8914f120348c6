use serde::Serialize;
use xenolexia_types::ReaderStyle;

use crate::pipeline::{ProcessedChapter, WordMarker};

/// What the rendering surface receives for one chapter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPayload {
    pub chapter_id: String,
    pub title: String,
    pub markup: String,
    pub markers: Vec<WordMarker>,
}

impl From<&ProcessedChapter> for ContentPayload {
    fn from(chapter: &ProcessedChapter) -> Self {
        Self {
            chapter_id: chapter.chapter_id.clone(),
            title: chapter.title.clone(),
            markup: chapter.markup.clone(),
            markers: chapter.markers.clone(),
        }
    }
}

/// Whatever displays the chapter and reports gestures back as `ReaderEvent`s
pub trait RenderSurface: Send + Sync {
    fn load_content(&self, payload: &ContentPayload);

    fn apply_settings(&self, style: &ReaderStyle);
}
