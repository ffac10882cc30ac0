//! Plain-text rendering of analysis reports for the terminal.

use std::fmt::Write;

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::calculate::projections;
use crate::duration::format_seconds;
use crate::models::PlaybackSpeed;
use crate::pipeline::AnalysisReport;

/// How to render a report.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Speed for the adjusted total
    pub speed: PlaybackSpeed,

    /// List the adjusted total for every speed instead of just `speed`
    pub all_speeds: bool,

    /// Fixed UTC offset for publish dates
    pub utc_offset_hours: i32,

    /// Include the per-video listing
    pub show_items: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            speed: PlaybackSpeed::Normal,
            all_speeds: false,
            utc_offset_hours: -5,
            show_items: true,
        }
    }
}

/// Format a timestamp as `15 March 2024, 10:30:00` in a fixed UTC offset.
///
/// Out-of-range offsets fall back to UTC.
pub fn format_published(at: DateTime<Utc>, utc_offset_hours: i32) -> String {
    let offset = utc_offset_hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix());
    at.with_timezone(&offset)
        .format("%-d %B %Y, %H:%M:%S")
        .to_string()
}

/// Render a report as human-readable text.
pub fn render_report(report: &AnalysisReport, options: &RenderOptions) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Playlist {}", report.playlist_id);
    let _ = writeln!(out, "Total videos : {}", report.item_count);
    if report.truncated {
        let _ = writeln!(
            out,
            "Note: only the first {} videos are counted",
            report.entries.len()
        );
    }
    let _ = writeln!(out, "Total duration : {}", report.total_label());

    if options.all_speeds {
        for (speed, seconds) in projections(report.total()) {
            let _ = writeln!(out, "  at {:>6} : {}", speed.to_string(), format_seconds(seconds));
        }
    } else if options.speed != PlaybackSpeed::Normal {
        let _ = writeln!(
            out,
            "At {} : {}",
            options.speed,
            report.projection_label(options.speed)
        );
    }

    if !report.missing_details.is_empty() {
        let _ = writeln!(
            out,
            "Unavailable videos (not counted): {}",
            report
                .missing_details
                .iter()
                .map(|id| id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    if options.show_items && !report.entries.is_empty() {
        out.push('\n');
        for (i, entry) in report.entries.iter().enumerate() {
            let _ = writeln!(out, "{:>3}. {}", i + 1, entry.title);
            if let Some(at) = entry.published_at {
                let _ = writeln!(
                    out,
                    "     Published : {}",
                    format_published(at, options.utc_offset_hours)
                );
            }
            match report.duration_of(entry) {
                Some(seconds) => {
                    let _ = writeln!(out, "     Duration  : {}", format_seconds(seconds as f64));
                }
                None => {
                    let _ = writeln!(out, "     Duration  : unavailable");
                }
            }
            let _ = writeln!(out, "     Watch     : {}", entry.watch_url());
            if let Some(thumb) = &entry.thumbnail_url {
                let _ = writeln!(out, "     Thumbnail : {}", thumb);
            }
        }
    }

    out
}
