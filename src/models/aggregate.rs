//! Aggregated watch-time results.

use serde::{Deserialize, Serialize};

use super::VideoId;
use crate::duration::{format_seconds, DurationSeconds};

/// Decoded duration of a single video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDuration {
    pub video_id: VideoId,

    pub seconds: DurationSeconds,

    /// The encoding could not be decoded and counted as zero
    #[serde(default)]
    pub undecodable: bool,
}

impl ItemDuration {
    /// Human-readable breakdown, e.g. `0h 3m 30.00s`.
    pub fn label(&self) -> String {
        format_seconds(self.seconds as f64)
    }
}

/// Total duration across a batch of content-detail records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub total: DurationSeconds,

    /// Per-item durations, in the order the records were aggregated
    pub items: Vec<ItemDuration>,
}

impl AggregateResult {
    /// Human-readable total.
    pub fn label(&self) -> String {
        format_seconds(self.total as f64)
    }

    /// Duration of one video, if it was part of the batch.
    pub fn duration_of(&self, video_id: &VideoId) -> Option<DurationSeconds> {
        self.items
            .iter()
            .find(|i| &i.video_id == video_id)
            .map(|i| i.seconds)
    }

    /// Items whose encoding failed to decode.
    pub fn undecodable(&self) -> impl Iterator<Item = &ItemDuration> {
        self.items.iter().filter(|i| i.undecodable)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
