use chrono::{DateTime, Utc};
use serde::Serialize;
use xenolexia_types::{
    MAX_INTERVAL_DAYS, MIN_EASE_FACTOR, VocabularyItem, VocabularyStatus, VocabularyUpdate,
};

use crate::error::SchedulerError;

/// Lowest grade that counts as a successful recall
pub const PASSING_QUALITY: u8 = 3;

const MAX_QUALITY: u8 = 5;
const LEARNED_AFTER_REVIEWS: u32 = 5;
const LEARNED_MIN_QUALITY: u8 = 4;
const REVIEW_AFTER_REVIEWS: u32 = 2;

/// Review state computed from one grade
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub ease_factor: f64,
    pub interval: u32,
    pub review_count: u32,
    pub status: VocabularyStatus,
    pub last_reviewed_at: DateTime<Utc>,
}

impl ReviewOutcome {
    pub fn passed(&self) -> bool {
        self.interval > 0
    }

    /// Partial update writing the outcome back to storage
    pub fn to_update(&self) -> VocabularyUpdate {
        VocabularyUpdate {
            last_reviewed_at: Some(self.last_reviewed_at),
            review_count: Some(self.review_count),
            ease_factor: Some(self.ease_factor),
            interval: Some(self.interval),
            status: Some(self.status),
            ..Default::default()
        }
    }
}

/// SM-2 style scheduling
pub struct VocabularyScheduler;

impl VocabularyScheduler {
    /// Next review state for `item` graded `quality` (0-5) at `now`.
    ///
    /// A grade of 3 or more is a pass: the interval grows 0 -> 1 -> 6 -> interval * ease,
    /// capped at [`MAX_INTERVAL_DAYS`], and the ease moves by the SM-2 adjustment. Anything lower resets the interval
    /// to 0 and leaves the ease alone. The item itself is never modified.
    pub fn next_state(
        item: &VocabularyItem,
        quality: u8,
        now: DateTime<Utc>,
    ) -> Result<ReviewOutcome, SchedulerError> {
        if quality > MAX_QUALITY {
            return Err(SchedulerError::InvalidQuality(quality));
        }
        // NaN fails this check too
        if !(item.ease_factor >= MIN_EASE_FACTOR) {
            return Err(SchedulerError::CorruptEaseFactor {
                id: item.id.clone(),
                ease_factor: item.ease_factor,
            });
        }

        let review_count = item.review_count.saturating_add(1);

        if quality < PASSING_QUALITY {
            return Ok(ReviewOutcome {
                ease_factor: item.ease_factor.max(MIN_EASE_FACTOR),
                interval: 0,
                review_count,
                status: VocabularyStatus::Learning,
                last_reviewed_at: now,
            });
        }

        let interval = match item.interval {
            0 => 1,
            1 => 6,
            days => {
                let scaled = (f64::from(days) * item.ease_factor).round();
                // Bounded by the cap, so the cast is exact
                scaled.min(f64::from(MAX_INTERVAL_DAYS)) as u32
            }
        };

        let miss = f64::from(MAX_QUALITY - quality);
        let ease_factor = (item.ease_factor + (0.1 - miss * (0.08 + miss * 0.02))).max(MIN_EASE_FACTOR);

        let status = if review_count >= LEARNED_AFTER_REVIEWS && quality >= LEARNED_MIN_QUALITY {
            VocabularyStatus::Learned
        } else if review_count >= REVIEW_AFTER_REVIEWS {
            VocabularyStatus::Review
        } else {
            VocabularyStatus::Learning
        };

        Ok(ReviewOutcome {
            ease_factor,
            interval,
            review_count,
            status,
            last_reviewed_at: now,
        })
    }
}
