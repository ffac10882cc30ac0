//! Analysis pipeline.
//!
//! Runs one submission end to end:
//! 1. Extract the playlist id from user input
//! 2. Fetch the playlist page
//! 3. Fetch content details for every referenced video in one batch
//! 4. Aggregate durations
//!
//! Speed projection is applied afterwards on the finished report and never
//! triggers another fetch.

pub mod session;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::calculate::{aggregate, project};
use crate::duration::{format_seconds, DurationSeconds};
use crate::extract::{extract, ExtractError};
use crate::fetch::{FetchError, MetadataSource};
use crate::models::{
    AggregateResult, ContentDetailRecord, PlaybackSpeed, PlaylistEntry, PlaylistId, VideoId,
};

pub use session::{Session, SessionError, SessionState, Ticket};

/// Errors that abort a submission.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

impl PipelineError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Extract(_) => "INVALID_PLAYLIST_URL",
            PipelineError::Fetch(_) => "FETCH_FAILED",
        }
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            PipelineError::Extract(_) => "Invalid playlist URL",
            PipelineError::Fetch(_) => "Error fetching playlist data",
        }
    }
}

/// Result of analysing one playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub playlist_id: PlaylistId,

    /// Entries of the fetched page, in playlist order
    pub entries: Vec<PlaylistEntry>,

    /// Item count reported by the service for the whole playlist
    pub item_count: u32,

    /// More items exist than were fetched
    pub truncated: bool,

    /// Durations per entry, summed
    pub aggregate: AggregateResult,

    /// Videos the details lookup did not return (private or deleted)
    pub missing_details: Vec<VideoId>,

    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisReport {
    pub fn total(&self) -> DurationSeconds {
        self.aggregate.total
    }

    pub fn total_label(&self) -> String {
        self.aggregate.label()
    }

    /// Total at the given playback speed, in seconds.
    pub fn projection(&self, speed: PlaybackSpeed) -> f64 {
        project(self.total(), speed)
    }

    pub fn projection_label(&self, speed: PlaybackSpeed) -> String {
        format_seconds(self.projection(speed))
    }

    /// Decoded duration of the video behind an entry.
    pub fn duration_of(&self, entry: &PlaylistEntry) -> Option<DurationSeconds> {
        self.aggregate.duration_of(&entry.video_id)
    }
}

/// Runs submissions against a metadata source.
#[derive(Clone)]
pub struct Analyzer {
    source: Arc<dyn MetadataSource>,
}

impl Analyzer {
    pub fn new(source: Arc<dyn MetadataSource>) -> Self {
        Self { source }
    }

    /// Analyse a playlist from raw user input (URL or query string).
    ///
    /// Input without a `list=` parameter fails before any network call.
    pub async fn analyze(&self, input: &str) -> Result<AnalysisReport, PipelineError> {
        let playlist_id = extract(input)?;
        self.analyze_id(&playlist_id).await
    }

    /// Analyse a playlist by id.
    pub async fn analyze_id(
        &self,
        playlist_id: &PlaylistId,
    ) -> Result<AnalysisReport, PipelineError> {
        info!("Analyzing playlist {} via {}", playlist_id, self.source.name());

        let page = self.source.fetch_playlist_page(playlist_id).await?;
        let video_ids = page.video_ids();
        info!(
            "Playlist {}: {} entries ({} unique videos)",
            playlist_id,
            page.entries.len(),
            video_ids.len()
        );

        let details = self.source.fetch_content_details(&video_ids).await?;
        let (records, missing_details) = match_details(&page.entries, &video_ids, details);

        if !missing_details.is_empty() {
            warn!(
                "No content details for {} videos: {:?}",
                missing_details.len(),
                missing_details
            );
        }

        let aggregate = aggregate(&records);
        info!(
            "Playlist {}: total {} across {} items",
            playlist_id,
            aggregate.label(),
            aggregate.len()
        );

        Ok(AnalysisReport {
            playlist_id: playlist_id.clone(),
            truncated: page.is_truncated(),
            item_count: page.total_results,
            entries: page.entries,
            aggregate,
            missing_details,
            analyzed_at: Utc::now(),
        })
    }
}

/// Line up content-detail records with playlist entries by video id.
///
/// Returns one record per entry whose video has details (so a video listed
/// twice counts twice), plus the requested ids the service did not return.
/// Records for ids that were never requested are ignored.
fn match_details(
    entries: &[PlaylistEntry],
    requested: &[VideoId],
    details: Vec<ContentDetailRecord>,
) -> (Vec<ContentDetailRecord>, Vec<VideoId>) {
    let wanted: HashSet<&VideoId> = requested.iter().collect();
    let mut by_id: HashMap<VideoId, ContentDetailRecord> = HashMap::new();
    for record in details {
        if !wanted.contains(&record.video_id) {
            warn!("Ignoring details for unrequested video {}", record.video_id);
            continue;
        }
        by_id.entry(record.video_id.clone()).or_insert(record);
    }

    let records = entries
        .iter()
        .filter_map(|e| by_id.get(&e.video_id).cloned())
        .collect();
    let missing = requested
        .iter()
        .filter(|id| !by_id.contains_key(*id))
        .cloned()
        .collect();

    (records, missing)
}
