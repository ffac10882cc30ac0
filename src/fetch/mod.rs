//! Metadata client for the YouTube Data API.
//!
//! Two read-only lookups sit behind the [`MetadataSource`] trait so the
//! pipeline can run against a fake source in tests:
//!
//! - playlist entries for a playlist id (a single page of up to 50 items)
//! - content details (durations) for a batch of video ids
//!
//! There is no caching and no retry. Every failure comes back as a
//! [`FetchError`] value.

pub mod wire;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::models::{
    join_video_ids, ContentDetailRecord, PlaylistId, PlaylistPage, VideoId, MAX_PAGE_SIZE,
};

use self::wire::{PlaylistItemsResponse, VideosResponse};

/// Default API root.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Errors that can occur during fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("No YouTube API key configured (set YOUTUBE_API_KEY)")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read-only access to playlist and video metadata.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &'static str;

    /// Fetch the first page (up to 50 entries) of a playlist.
    async fn fetch_playlist_page(&self, id: &PlaylistId) -> Result<PlaylistPage, FetchError>;

    /// Fetch content details for a batch of videos in one call.
    ///
    /// Response order is not guaranteed to match `ids`; callers match by key.
    async fn fetch_content_details(
        &self,
        ids: &[VideoId],
    ) -> Result<Vec<ContentDetailRecord>, FetchError>;
}

/// Configuration for the YouTube client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API credential
    pub api_key: Option<String>,

    /// API root, without trailing slash
    pub base_url: String,

    /// Request timeout
    pub timeout: Duration,

    /// Page size for the playlist lookup (1..=50)
    pub max_results: u32,

    /// User agent string
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
            max_results: MAX_PAGE_SIZE,
            user_agent: format!("watchtime/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// YouTube Data API v3 client.
pub struct YouTubeClient {
    client: Client,
    config: ClientConfig,
}

impl YouTubeClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("watchtime")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    fn api_key(&self) -> Result<&str, FetchError> {
        self.config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(FetchError::MissingApiKey)
    }

    /// Build an endpoint URL. The key is appended last so logs can drop it.
    fn endpoint(&self, resource: &str, params: &[(&str, &str)]) -> Result<Url, FetchError> {
        let base = self.config.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/{}", base, resource))
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", base, e)))?;
        url.query_pairs_mut().extend_pairs(params);
        Ok(url)
    }

    /// GET a JSON resource and decode it.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let key = self.api_key()?;
        debug!("GET {}", url);

        let mut keyed = url.clone();
        keyed.query_pairs_mut().append_pair("key", key);

        let response = self
            .client
            .get(keyed)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            let message = wire::error_message(&body).unwrap_or_else(|| {
                status.canonical_reason().unwrap_or("Unknown").to_string()
            });
            warn!("{} returned HTTP {}: {}", url.path(), status.as_u16(), message);
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    fn map_transport_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.config.timeout)
        } else {
            // Strip the URL so the key never ends up in an error message
            FetchError::Http(err.without_url())
        }
    }
}

#[async_trait]
impl MetadataSource for YouTubeClient {
    fn name(&self) -> &'static str {
        "youtube"
    }

    async fn fetch_playlist_page(&self, id: &PlaylistId) -> Result<PlaylistPage, FetchError> {
        let max_results = self.config.max_results.clamp(1, MAX_PAGE_SIZE).to_string();
        let url = self.endpoint(
            "playlistItems",
            &[
                ("part", "snippet,contentDetails"),
                ("maxResults", max_results.as_str()),
                ("playlistId", id.as_str()),
            ],
        )?;

        info!("Fetching playlist {}", id);
        let response: PlaylistItemsResponse = self.get_json(url).await?;
        let page = response.into_page(id.clone());

        if page.is_truncated() {
            warn!(
                "Playlist {} has {} items; only the first {} are counted",
                id,
                page.total_results,
                page.entries.len()
            );
        }

        Ok(page)
    }

    async fn fetch_content_details(
        &self,
        ids: &[VideoId],
    ) -> Result<Vec<ContentDetailRecord>, FetchError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = join_video_ids(ids);
        let url = self.endpoint(
            "videos",
            &[("part", "contentDetails"), ("id", joined.as_str())],
        )?;

        info!("Fetching content details for {} videos", ids.len());
        let response: VideosResponse = self.get_json(url).await?;
        Ok(response.into_records())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    /// Serve `router` on an ephemeral local port, returning its base URL.
    async fn spawn_api(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(base_url: String, api_key: Option<&str>) -> YouTubeClient {
        YouTubeClient::new(ClientConfig {
            api_key: api_key.map(str::to_string),
            base_url,
            timeout: Duration::from_secs(5),
            ..Default::default()
        })
        .unwrap()
    }

    fn fake_api() -> Router {
        Router::new()
            .route(
                "/playlistItems",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    if q.get("key").map(String::as_str) != Some("test-key") {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(json!({"error": {"code": 400, "message": "API key not valid. Please pass a valid API key."}})),
                        )
                            .into_response();
                    }
                    assert_eq!(q.get("part").map(String::as_str), Some("snippet,contentDetails"));
                    assert_eq!(q.get("maxResults").map(String::as_str), Some("50"));
                    assert_eq!(q.get("playlistId").map(String::as_str), Some("ABC123"));
                    Json(json!({
                        "pageInfo": {"totalResults": 2, "resultsPerPage": 50},
                        "items": [
                            {"snippet": {"title": "One", "position": 0, "resourceId": {"videoId": "v1"}},
                             "contentDetails": {"videoId": "v1"}},
                            {"snippet": {"title": "Two", "position": 1, "resourceId": {"videoId": "v2"}},
                             "contentDetails": {"videoId": "v2"}}
                        ]
                    }))
                    .into_response()
                }),
            )
            .route(
                "/videos",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    assert_eq!(q.get("part").map(String::as_str), Some("contentDetails"));
                    let items: Vec<_> = q
                        .get("id")
                        .map(|ids| ids.split(',').map(str::to_string).collect::<Vec<_>>())
                        .unwrap_or_default()
                        .into_iter()
                        .rev()
                        .map(|id| json!({"id": id, "contentDetails": {"duration": "PT1M"}}))
                        .collect();
                    Json(json!({"items": items}))
                }),
            )
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_API_BASE);
        assert_eq!(config.max_results, 50);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.api_key.is_none());
        assert!(config.user_agent.starts_with("watchtime/"));
    }

    #[test]
    fn test_endpoint_building() {
        let client = client_for("https://example.test/youtube/v3/".to_string(), Some("k"));
        let url = client
            .endpoint("videos", &[("part", "contentDetails"), ("id", "a,b")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.test/youtube/v3/videos?part=contentDetails&id=a%2Cb"
        );
        assert!(!url.as_str().contains("key="));
    }

    #[test]
    fn test_endpoint_invalid_base() {
        let client = client_for("not a url".to_string(), Some("k"));
        assert!(matches!(
            client.endpoint("videos", &[]),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_a_fetch_error() {
        let client = client_for("http://127.0.0.1:9".to_string(), None);
        let id = PlaylistId::parse("PL1").unwrap();
        let err = client.fetch_playlist_page(&id).await.unwrap_err();
        assert!(matches!(err, FetchError::MissingApiKey));

        let blank = client_for("http://127.0.0.1:9".to_string(), Some("   "));
        assert!(matches!(
            blank.fetch_playlist_page(&id).await,
            Err(FetchError::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn test_fetch_playlist_page() {
        let base = spawn_api(fake_api()).await;
        let client = client_for(base, Some("test-key"));

        let page = client
            .fetch_playlist_page(&PlaylistId::parse("ABC123").unwrap())
            .await
            .unwrap();

        assert_eq!(page.playlist_id.as_str(), "ABC123");
        assert_eq!(page.total_results, 2);
        assert_eq!(page.video_ids(), vec![VideoId::from("v1"), VideoId::from("v2")]);
        assert!(!page.is_truncated());
    }

    #[tokio::test]
    async fn test_fetch_content_details_batch() {
        let base = spawn_api(fake_api()).await;
        let client = client_for(base, Some("test-key"));

        let records = client
            .fetch_content_details(&[VideoId::from("v1"), VideoId::from("v2")])
            .await
            .unwrap();

        // The fake answers in reverse order
        let ids: Vec<&str> = records.iter().map(|r| r.video_id.as_str()).collect();
        assert_eq!(ids, vec!["v2", "v1"]);
        assert!(records.iter().all(|r| r.duration == "PT1M"));
    }

    #[tokio::test]
    async fn test_fetch_content_details_empty_skips_network() {
        // Unroutable base: a network call here would fail
        let client = client_for("http://127.0.0.1:9".to_string(), Some("test-key"));
        let records = assert_ok!(client.fetch_content_details(&[]).await);
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_carries_service_message() {
        let base = spawn_api(fake_api()).await;
        let client = client_for(base, Some("wrong-key"));

        let err = assert_err!(
            client
                .fetch_playlist_page(&PlaylistId::parse("ABC123").unwrap())
                .await
        );
        match err {
            FetchError::HttpStatus { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("API key not valid"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_not_found_status() {
        let base = spawn_api(Router::new()).await;
        let client = client_for(base, Some("test-key"));
        let err = client
            .fetch_content_details(&[VideoId::from("v1")])
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_malformed_payload() {
        let router = Router::new().route("/videos", get(|| async { "this is not json" }));
        let base = spawn_api(router).await;
        let client = client_for(base, Some("test-key"));
        let err = client
            .fetch_content_details(&[VideoId::from("v1")])
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Json(_)));
    }

    #[tokio::test]
    async fn test_timeout_surfaces_as_fetch_error() {
        let router = Router::new().route(
            "/videos",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "{}"
            }),
        );
        let base = spawn_api(router).await;
        let client = YouTubeClient::new(ClientConfig {
            api_key: Some("test-key".to_string()),
            base_url: base,
            timeout: Duration::from_millis(200),
            ..Default::default()
        })
        .unwrap();

        let err = client
            .fetch_content_details(&[VideoId::from("v1")])
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Timeout(d) if d == Duration::from_millis(200)));
        assert_eq!(err.to_string(), "Request timed out after 200ms");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            FetchError::HttpStatus {
                status: 403,
                message: "quota".to_string()
            }
            .to_string(),
            "HTTP 403: quota"
        );
        assert!(FetchError::MissingApiKey.to_string().contains("YOUTUBE_API_KEY"));
    }
}
