use chrono::Utc;
use kanal::AsyncSender;
use xenolexia_types::AppEvent;
use xenolexia_vocabulary::review_item;

use crate::state::Services;

pub async fn handle_grade_review(
    services: &Services,
    item_id: String,
    quality: u8,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let event = match review_item(services.vocabulary.as_ref(), &item_id, quality, Utc::now()).await {
        Ok(item) => AppEvent::Reviewed {
            item_id: item.id,
            status: item.status,
            interval: item.interval,
        },
        Err(e) => {
            tracing::warn!("Review of {} failed: {}", item_id, e);
            AppEvent::StatusUpdate(format!("Review failed: {e}"))
        }
    };

    app_to_ui_tx.send(event).await?;
    Ok(())
}
