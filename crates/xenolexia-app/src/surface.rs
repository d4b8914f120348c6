use xenolexia_reader::{ContentPayload, RenderSurface};
use xenolexia_types::ReaderStyle;

/// Prints chapters to stdout, as markup or as the JSON payload
pub struct TerminalSurface {
    json: bool,
}

impl TerminalSurface {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

impl RenderSurface for TerminalSurface {
    fn load_content(&self, payload: &ContentPayload) {
        if self.json {
            match serde_json::to_string_pretty(payload) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::error!("Failed to serialize chapter payload: {e}"),
            }
            return;
        }

        println!("# {}\n", payload.title);
        println!("{}", payload.markup);
        if !payload.markers.is_empty() {
            println!();
            for marker in &payload.markers {
                println!(
                    "[{}] {} -> {}",
                    marker.index, marker.original_word, marker.foreign_word
                );
            }
        }
    }

    fn apply_settings(&self, style: &ReaderStyle) {
        tracing::debug!(
            "Style: {}pt {}, line height {}, {:?}",
            style.font_size,
            style.font_family,
            style.line_height,
            style.text_align
        );
    }
}
