use std::time::Duration;

use tokio::time::timeout;
use xenolexia_types::{AppEvent, ReaderEvent, WordTapEvent};

#[tokio::test]
async fn test_tokio_spawn_from_sync_gesture_callback() {
    let (tx, rx) = kanal::unbounded_async::<AppEvent>();

    let on_tap = move || {
        tracing::debug!("Tap callback: spawning tokio task");
        let tx = tx.clone();
        tokio::spawn(async move {
            tx.send(AppEvent::Reader(ReaderEvent::WordTap(WordTapEvent {
                foreign_word: "casa".into(),
                original_word: "house".into(),
                word_id: "en_es_house".into(),
                context: "the old house".into(),
            })))
            .await
            .expect("send failed");
        });
    };

    on_tap();

    let result = timeout(Duration::from_secs(2), rx.recv()).await;
    match result {
        Ok(Ok(AppEvent::Reader(ReaderEvent::WordTap(tap)))) => {
            assert_eq!(tap.foreign_word, "casa");
            assert_eq!(tap.word_id, "en_es_house");
        }
        Ok(Ok(_)) => panic!("Wrong event type"),
        Ok(Err(e)) => panic!("Channel error: {}", e),
        Err(_) => panic!("Timeout - event never arrived!"),
    }
}

#[tokio::test]
async fn test_progress_burst_from_many_tasks() {
    let (tx, rx) = kanal::unbounded_async::<AppEvent>();

    for i in 0..100 {
        let tx = tx.clone();
        tokio::spawn(async move {
            tx.send(AppEvent::Reader(ReaderEvent::Progress { percent: i as f32 }))
                .await
                .expect("send failed");
        });
    }

    let mut count = 0;
    let result = timeout(Duration::from_secs(2), async {
        while count < 100 {
            rx.recv().await.expect("recv failed");
            count += 1;
        }
    })
    .await;

    assert!(result.is_ok(), "Timeout waiting for events!");
    assert_eq!(count, 100);
}
