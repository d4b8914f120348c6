use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use tokio_util::sync::CancellationToken;
use xenolexia_core::state::AppState;
use xenolexia_types::AppEvent;

use crate::state::Services;

pub mod grade_review;
pub mod open_chapter;
pub mod save_word;

use grade_review::handle_grade_review;
use open_chapter::{handle_config_change, handle_open_chapter};
use save_word::handle_save_word;

/// App's main loop
pub async fn event_loop(
    state: Arc<AppState>,
    services: Arc<Services>,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    app_to_ui_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    tracing::info!("[EVENT_LOOP] Starting main loop, waiting for events");
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("[EVENT_LOOP] Cancelled, stopping");
                return Ok(());
            }
            event = ui_to_app_rx.recv() => event?,
        };

        tracing::debug!(
            "[EVENT_LOOP] EVENT RECEIVED: {:?}",
            std::mem::discriminant(&event)
        );
        if matches!(event, AppEvent::Shutdown) {
            tracing::info!("[EVENT_LOOP] Shutdown requested");
            return Ok(());
        }

        handle_events(state.clone(), services.clone(), &app_to_ui_tx, event).await?;
    }
}

async fn handle_events(
    state: Arc<AppState>,
    services: Arc<Services>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    event: AppEvent,
) -> anyhow::Result<()> {
    match event {
        AppEvent::ConfigChanged => {
            handle_config_change(state, services, app_to_ui_tx).await?;
        }
        AppEvent::OpenChapter(chapter) => {
            // Runs detached so a newer chapter can supersede this one
            let tx = app_to_ui_tx.clone();
            tokio::spawn(async move {
                let chapter_id = chapter.id.clone();
                if let Err(e) = handle_open_chapter(state, services, chapter, &tx).await {
                    tracing::error!("Opening chapter {} failed: {}", chapter_id, e);
                }
            });
        }
        AppEvent::Reader(event) => {
            if let Some(event) = services.session.handle_event(event) {
                app_to_ui_tx.send(AppEvent::Reader(event)).await?;
            }
        }
        AppEvent::SaveWord(tap) => {
            handle_save_word(&services, tap, app_to_ui_tx).await?;
        }
        AppEvent::GradeReview { item_id, quality } => {
            handle_grade_review(&services, item_id, quality, app_to_ui_tx).await?;
        }
        AppEvent::ChapterReady { .. }
        | AppEvent::ChapterFailed { .. }
        | AppEvent::WordSaved { .. }
        | AppEvent::Reviewed { .. }
        | AppEvent::StatusUpdate(_) => {
            // Front-end bound, nothing to do here
        }
        AppEvent::Shutdown => {}
    }

    Ok(())
}
