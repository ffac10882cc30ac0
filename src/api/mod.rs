//! REST API endpoints.
//!
//! Axum-based JSON API over the analysis pipeline. The server holds the
//! single current-result slot; speed projections are computed from it
//! without another fetch.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::pipeline::PipelineError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    InvalidPlaylistUrl(String),

    #[error("{message}")]
    FetchFailed { message: String, detail: String },

    #[error("Superseded: {0}")]
    Superseded(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match &err {
            PipelineError::Extract(_) => ApiError::InvalidPlaylistUrl(err.user_message().to_string()),
            PipelineError::Fetch(cause) => ApiError::FetchFailed {
                message: err.user_message().to_string(),
                detail: cause.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::InvalidPlaylistUrl(_) => (StatusCode::BAD_REQUEST, "INVALID_PLAYLIST_URL"),
            ApiError::FetchFailed { .. } => (StatusCode::BAD_GATEWAY, "FETCH_FAILED"),
            ApiError::Superseded(_) => (StatusCode::CONFLICT, "SUPERSEDED"),
        };

        let detail = match &self {
            ApiError::FetchFailed { detail, .. } => Some(detail.clone()),
            _ => None,
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                detail,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    build_router_with_cors(state, "*")
}

/// Build the API router with a specific CORS origin (`*` allows any).
pub fn build_router_with_cors(state: AppState, cors_origin: &str) -> Router {
    let cors = match cors_origin {
        "*" => CorsLayer::new().allow_origin(Any),
        origin => match HeaderValue::from_str(origin) {
            Ok(value) => CorsLayer::new().allow_origin(value),
            Err(_) => {
                tracing::warn!("Invalid CORS origin {:?}, allowing any", origin);
                CorsLayer::new().allow_origin(Any)
            }
        },
    }
    .allow_methods(Any)
    .allow_headers(Any);

    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/analyze", post(routes::analyze::analyze))
        .route("/api/result", get(routes::result::current))
        .route("/api/result/projection", get(routes::result::projection))
        .route("/api/result/projections", get(routes::result::projections))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractError;
    use crate::fetch::FetchError;

    #[test]
    fn test_pipeline_error_mapping() {
        let invalid: ApiError = PipelineError::Extract(ExtractError::InvalidPlaylistUrl).into();
        assert!(matches!(invalid, ApiError::InvalidPlaylistUrl(_)));
        assert_eq!(invalid.to_string(), "Invalid playlist URL");

        let fetch: ApiError = PipelineError::Fetch(FetchError::MissingApiKey).into();
        match fetch {
            ApiError::FetchFailed { message, detail } => {
                assert_eq!(message, "Error fetching playlist data");
                assert!(detail.contains("YOUTUBE_API_KEY"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::InvalidPlaylistUrl("x".into()), StatusCode::BAD_REQUEST),
            (
                ApiError::FetchFailed {
                    message: "x".into(),
                    detail: "y".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (ApiError::Superseded("x".into()), StatusCode::CONFLICT),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
