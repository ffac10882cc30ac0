//! Playlist identifier extraction from user-supplied URLs.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::models::PlaylistId;

/// Errors from identifier extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("Invalid playlist URL")]
    InvalidPlaylistUrl,
}

fn list_param_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[?&]list=([^#&?]+)").unwrap())
}

/// Extract the playlist id from the `list=` query parameter of `input`.
///
/// The value runs until the next `&`, `#`, `?` or the end of input.
/// Works on full URLs, share links and bare query strings alike.
pub fn extract(input: &str) -> Result<PlaylistId, ExtractError> {
    let input = input.trim();
    list_param_regex()
        .captures(input)
        .and_then(|caps| caps.get(1))
        .and_then(|m| PlaylistId::parse(m.as_str()))
        .ok_or(ExtractError::InvalidPlaylistUrl)
}
