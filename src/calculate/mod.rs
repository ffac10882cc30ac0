//! Watch-time calculation.
//!
//! - Summing content-detail durations into an [`AggregateResult`]
//! - Projecting a total under a playback speed
//!
//! All summation is integer arithmetic on whole seconds; floating point only
//! appears in the display-side projection.

use tracing::warn;

use crate::duration::{format_seconds, parse_duration, DurationSeconds};
use crate::models::{AggregateResult, ContentDetailRecord, ItemDuration, PlaybackSpeed};

/// Sum the durations of every record.
///
/// Undecodable encodings count as zero and are flagged on their item; they
/// never abort the batch.
pub fn aggregate(records: &[ContentDetailRecord]) -> AggregateResult {
    let mut total: DurationSeconds = 0;
    let mut items = Vec::with_capacity(records.len());

    for record in records {
        let (seconds, undecodable) = match parse_duration(&record.duration) {
            Ok(s) => (s, false),
            Err(e) => {
                warn!("Video {}: {}; counting as zero", record.video_id, e);
                (0, true)
            }
        };
        total = total.saturating_add(seconds);
        items.push(ItemDuration {
            video_id: record.video_id.clone(),
            seconds,
            undecodable,
        });
    }

    AggregateResult { total, items }
}

/// Total divided by the speed multiplier.
pub fn project(total: DurationSeconds, speed: PlaybackSpeed) -> f64 {
    total as f64 / speed.multiplier()
}

/// Formatted projection for one speed.
pub fn project_label(total: DurationSeconds, speed: PlaybackSpeed) -> String {
    format_seconds(project(total, speed))
}

/// Projection of `total` under every selectable speed, slowest first.
pub fn projections(total: DurationSeconds) -> Vec<(PlaybackSpeed, f64)> {
    PlaybackSpeed::ALL
        .into_iter()
        .map(|speed| (speed, project(total, speed)))
        .collect()
}
