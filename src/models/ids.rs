//! Identifier newtypes for playlists and videos.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters that terminate a playlist id inside a URL.
const URL_DELIMITERS: [char; 3] = ['&', '#', '?'];

/// Opaque playlist identifier.
///
/// Always non-empty and free of URL delimiter characters (`&`, `#`, `?`).
/// Constructed through [`PlaylistId::parse`] or [`crate::extract::extract`].
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlaylistId(String);

impl PlaylistId {
    /// Validate a raw token as a playlist id.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() || raw.contains(URL_DELIMITERS) {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlaylistId({})", self.0)
    }
}

impl TryFrom<String> for PlaylistId {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s).ok_or_else(|| format!("invalid playlist id: {:?}", s))
    }
}

impl From<PlaylistId> for String {
    fn from(id: PlaylistId) -> Self {
        id.0
    }
}

/// Identifier of a single video referenced by a playlist entry.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Public watch URL for this video.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VideoId({})", self.0)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Join video ids into the comma-separated form the content-details lookup takes.
pub fn join_video_ids(ids: &[VideoId]) -> String {
    ids.iter().map(VideoId::as_str).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playlist_id_parse_valid() {
        let id = PlaylistId::parse("PLx0sYbCqOb8TBPRdmBHs5Iftvv9TPboYG").unwrap();
        assert_eq!(id.as_str(), "PLx0sYbCqOb8TBPRdmBHs5Iftvv9TPboYG");
    }

    #[test]
    fn test_playlist_id_rejects_empty() {
        assert!(PlaylistId::parse("").is_none());
    }

    #[test]
    fn test_playlist_id_rejects_delimiters() {
        assert!(PlaylistId::parse("ABC&index=2").is_none());
        assert!(PlaylistId::parse("ABC#t").is_none());
        assert!(PlaylistId::parse("ABC?x").is_none());
    }

    #[test]
    fn test_playlist_id_keeps_inner_spaces() {
        let id = PlaylistId::parse("AB C").unwrap();
        assert_eq!(id.as_str(), "AB C");
    }

    #[test]
    fn test_playlist_id_serde_validates() {
        let ok: PlaylistId = serde_json::from_str("\"ABC123\"").unwrap();
        assert_eq!(ok.as_str(), "ABC123");

        let bad: Result<PlaylistId, _> = serde_json::from_str("\"A&B\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_playlist_id_display_and_debug() {
        let id = PlaylistId::parse("ABC123").unwrap();
        assert_eq!(format!("{}", id), "ABC123");
        assert!(format!("{:?}", id).contains("ABC123"));
    }

    #[test]
    fn test_video_id_watch_url() {
        let id = VideoId::from("dQw4w9WgXcQ");
        assert_eq!(id.watch_url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }

    #[test]
    fn test_join_video_ids() {
        let ids = vec![VideoId::from("v1"), VideoId::from("v2"), VideoId::from("v3")];
        assert_eq!(join_video_ids(&ids), "v1,v2,v3");
        assert_eq!(join_video_ids(&[]), "");
    }
}
