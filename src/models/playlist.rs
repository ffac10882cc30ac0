//! Playlist entries and content-detail records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PlaylistId, VideoId};

/// Maximum number of entries the playlist lookup returns in one page.
pub const MAX_PAGE_SIZE: u32 = 50;

/// One video in a playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    /// Position within the playlist (0-based)
    pub position: u32,

    /// Video title as shown in the playlist
    pub title: String,

    /// When the video was added/published
    pub published_at: Option<DateTime<Utc>>,

    /// Best available thumbnail URL
    pub thumbnail_url: Option<String>,

    /// Referenced video
    pub video_id: VideoId,
}

impl PlaylistEntry {
    pub fn watch_url(&self) -> String {
        self.video_id.watch_url()
    }
}

/// A single page of playlist entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistPage {
    pub playlist_id: PlaylistId,

    pub entries: Vec<PlaylistEntry>,

    /// Total number of items the service reports for the playlist
    pub total_results: u32,

    /// Items the service returned on this page, including any skipped
    /// for lacking a video id
    pub fetched_items: u32,

    /// Whether the service offered another page
    pub has_more: bool,
}

impl PlaylistPage {
    /// Video ids in playlist order, without duplicates.
    pub fn video_ids(&self) -> Vec<VideoId> {
        let mut seen = std::collections::HashSet::new();
        self.entries
            .iter()
            .filter(|e| seen.insert(e.video_id.clone()))
            .map(|e| e.video_id.clone())
            .collect()
    }

    /// True when the playlist holds more items than this page returned.
    pub fn is_truncated(&self) -> bool {
        self.has_more || self.total_results > self.fetched_items
    }
}

/// Duration details for one video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDetailRecord {
    pub video_id: VideoId,

    /// Compact duration encoding, e.g. `PT1H2M3S`
    pub duration: String,
}

impl ContentDetailRecord {
    pub fn new(video_id: impl Into<VideoId>, duration: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            duration: duration.into(),
        }
    }
}
