use std::sync::Arc;

use kanal::AsyncSender;
use xenolexia_core::state::AppState;
use xenolexia_reader::{ContentPayload, PipelineError, ProcessedChapter};
use xenolexia_types::{AppEvent, Chapter, ReaderStyle};

use crate::state::Services;

async fn publish(
    services: &Services,
    style: &ReaderStyle,
    processed: &ProcessedChapter,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    services.surface.apply_settings(style);
    services
        .surface
        .load_content(&ContentPayload::from(processed));

    app_to_ui_tx
        .send(AppEvent::ChapterReady {
            chapter_id: processed.chapter_id.clone(),
            markup: processed.markup.clone(),
            substitution_count: processed.markers.len(),
        })
        .await?;
    Ok(())
}

pub async fn handle_open_chapter(
    state: Arc<AppState>,
    services: Arc<Services>,
    chapter: Chapter,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let (replacement, context_words, style) = {
        let config = state.config.read().await;
        (
            config.replacement.clone(),
            config.reader.context_words,
            config.reader.style.clone(),
        )
    };

    match services
        .session
        .open_chapter(&chapter, &replacement, context_words)
        .await
    {
        Ok(processed) => publish(&services, &style, &processed, app_to_ui_tx).await,
        Err(PipelineError::Cancelled) => {
            tracing::debug!("Chapter {} superseded", chapter.id);
            Ok(())
        }
        Err(e) => {
            app_to_ui_tx
                .send(AppEvent::ChapterFailed {
                    chapter_id: chapter.id,
                    message: e.to_string(),
                })
                .await?;
            Ok(())
        }
    }
}

/// Re-run the open chapter with the current settings
pub async fn handle_config_change(
    state: Arc<AppState>,
    services: Arc<Services>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let (replacement, context_words, style) = {
        let config = state.config.read().await;
        (
            config.replacement.clone(),
            config.reader.context_words,
            config.reader.style.clone(),
        )
    };

    match services.session.reprocess(&replacement, context_words).await {
        Ok(processed) => publish(&services, &style, &processed, app_to_ui_tx).await,
        Err(PipelineError::NoActiveChapter) | Err(PipelineError::Cancelled) => {
            tracing::debug!("Config changed, nothing to reprocess");
            Ok(())
        }
        Err(e) => {
            app_to_ui_tx
                .send(AppEvent::StatusUpdate(format!("Reprocessing failed: {e}")))
                .await?;
            Ok(())
        }
    }
}
