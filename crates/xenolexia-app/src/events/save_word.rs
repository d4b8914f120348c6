use chrono::Utc;
use kanal::AsyncSender;
use xenolexia_core::StoreError;
use xenolexia_reader::PipelineError;
use xenolexia_types::{AppEvent, WordTapEvent};

use crate::state::Services;

pub async fn handle_save_word(
    services: &Services,
    tap: WordTapEvent,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let event = match services.session.save_word(&tap, Utc::now()).await {
        Ok(item) => AppEvent::WordSaved {
            item_id: item.id,
            source_word: item.source_word,
        },
        Err(PipelineError::Store(StoreError::Duplicate(_))) => AppEvent::StatusUpdate(format!(
            "'{}' is already in your vocabulary",
            tap.original_word
        )),
        Err(e) => {
            tracing::warn!("Saving '{}' failed: {}", tap.original_word, e);
            AppEvent::StatusUpdate(format!("Could not save '{}': {e}", tap.original_word))
        }
    };

    app_to_ui_tx.send(event).await?;
    Ok(())
}
