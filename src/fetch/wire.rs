//! YouTube Data API v3 response payloads.
//!
//! Only the fields the pipeline reads are modelled. Everything is optional
//! on the wire; conversion into domain models decides what is required.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::models::{ContentDetailRecord, PlaylistEntry, PlaylistId, PlaylistPage, VideoId};

// ── playlistItems ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemsResponse {
    #[serde(default)]
    pub next_page_token: Option<String>,

    #[serde(default)]
    pub page_info: Option<PageInfo>,

    #[serde(default)]
    pub items: Vec<PlaylistItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total_results: Option<u32>,
    pub results_per_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    pub id: Option<String>,
    pub snippet: Option<Snippet>,
    pub content_details: Option<PlaylistItemContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub published_at: Option<DateTime<Utc>>,
    pub title: Option<String>,
    pub position: Option<u32>,
    #[serde(default)]
    pub thumbnails: Thumbnails,
    pub resource_id: Option<ResourceId>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
    pub standard: Option<Thumbnail>,
    pub maxres: Option<Thumbnail>,
}

impl Thumbnails {
    /// Highest resolution the service offered, preferring `high`.
    pub fn best_url(&self) -> Option<String> {
        [
            &self.high,
            &self.maxres,
            &self.standard,
            &self.medium,
            &self.default,
        ]
        .into_iter()
        .flatten()
        .map(|t| t.url.clone())
        .next()
    }
}

#[derive(Debug, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemContentDetails {
    pub video_id: Option<String>,
    pub video_published_at: Option<DateTime<Utc>>,
}

impl PlaylistItem {
    /// Referenced video id, from content details or the snippet resource.
    fn video_id(&self) -> Option<String> {
        self.content_details
            .as_ref()
            .and_then(|c| c.video_id.clone())
            .or_else(|| {
                self.snippet
                    .as_ref()
                    .and_then(|s| s.resource_id.as_ref())
                    .and_then(|r| r.video_id.clone())
            })
            .filter(|id| !id.is_empty())
    }

    fn into_entry(self, fallback_position: u32) -> Option<PlaylistEntry> {
        let video_id = self.video_id()?;
        let snippet = self.snippet;
        let published_at = snippet.as_ref().and_then(|s| s.published_at).or_else(|| {
            self.content_details
                .as_ref()
                .and_then(|c| c.video_published_at)
        });

        Some(PlaylistEntry {
            position: snippet
                .as_ref()
                .and_then(|s| s.position)
                .unwrap_or(fallback_position),
            title: snippet
                .as_ref()
                .and_then(|s| s.title.clone())
                .unwrap_or_default(),
            published_at,
            thumbnail_url: snippet.as_ref().and_then(|s| s.thumbnails.best_url()),
            video_id: VideoId::new(video_id),
        })
    }
}

impl PlaylistItemsResponse {
    /// Convert into a domain page. Items without a video id are skipped.
    pub fn into_page(self, playlist_id: PlaylistId) -> PlaylistPage {
        let item_count = self.items.len();
        let entries: Vec<PlaylistEntry> = self
            .items
            .into_iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let item_id = item.id.clone();
                let entry = item.into_entry(i as u32);
                if entry.is_none() {
                    warn!(
                        "Skipping playlist item {} without a video id",
                        item_id.as_deref().unwrap_or("<unknown>")
                    );
                }
                entry
            })
            .collect();

        let total_results = self
            .page_info
            .and_then(|p| p.total_results)
            .unwrap_or(item_count as u32);

        PlaylistPage {
            playlist_id,
            entries,
            total_results,
            fetched_items: item_count as u32,
            has_more: self.next_page_token.is_some(),
        }
    }
}

// ── videos ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VideosResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: String,
    pub content_details: Option<VideoContentDetails>,
}

#[derive(Debug, Deserialize)]
pub struct VideoContentDetails {
    pub duration: Option<String>,
}

impl VideosResponse {
    /// Convert into content-detail records.
    ///
    /// A video without a duration yields an empty encoding, which the
    /// aggregation treats as an undecodable zero.
    pub fn into_records(self) -> Vec<ContentDetailRecord> {
        self.items
            .into_iter()
            .map(|item| {
                let duration = item
                    .content_details
                    .and_then(|c| c.duration)
                    .unwrap_or_default();
                ContentDetailRecord::new(item.id, duration)
            })
            .collect()
    }
}

// ── errors ──────────────────────────────────────────────────────────────────

/// Google API error envelope: `{"error": {"code": 403, "message": "..."}}`.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub reason: Option<String>,
}

/// Pull a readable message out of an error body, if it is the Google envelope.
pub fn error_message(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    let reason = envelope
        .error
        .errors
        .iter()
        .find_map(|e| e.reason.clone());
    match (envelope.error.message, reason) {
        (Some(msg), Some(reason)) => Some(format!("{} ({})", msg, reason)),
        (Some(msg), None) => Some(msg),
        (None, reason) => reason,
    }
}
