use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::pipeline::AnalysisReport;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub generation: u64,
    pub total_label: String,
    pub report: AnalysisReport,
}

/// POST /api/analyze
///
/// Runs a submission and replaces the current result. A submission that
/// was overtaken by a newer one answers 409 and leaves the slot alone.
pub async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    info!("Analyze requested for {:?}", body.url);

    let submission = state.session.submit(&state.analyzer, &body.url).await;
    let generation = submission.ticket.generation();

    if !submission.applied {
        return Err(ApiError::Superseded(format!(
            "submission {} was replaced by a newer one",
            generation
        )));
    }

    let report = submission.result?;
    Ok(Json(AnalyzeResponse {
        generation,
        total_label: report.total_label(),
        report,
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::state::AppState;
    use crate::pipeline::testing::FakeSource;
    use crate::pipeline::Analyzer;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn setup_test_state(source: FakeSource) -> (AppState, Arc<FakeSource>) {
        let source = Arc::new(source);
        (AppState::new(Analyzer::new(source.clone())), source)
    }

    async fn post_json(app: axum::Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_analyze_success() {
        let (state, _) = setup_test_state(FakeSource::with_playlist(
            "ABC123",
            &[("v1", "PT1M30S"), ("v2", "PT2M")],
        ));
        let app = build_router(state.clone());

        let (status, json) = post_json(
            app,
            "/api/analyze",
            r#"{"url":"https://www.youtube.com/playlist?list=ABC123"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["generation"], 1);
        assert_eq!(json["total_label"], "0h 3m 30.00s");
        assert_eq!(json["report"]["playlist_id"], "ABC123");
        assert_eq!(json["report"]["item_count"], 2);
        assert_eq!(json["report"]["aggregate"]["total"], 210);

        let snapshot = state.session.snapshot().await;
        assert!(!snapshot.loading);
        assert!(snapshot.report.is_some());
    }

    #[tokio::test]
    async fn test_analyze_invalid_url() {
        let (state, source) = setup_test_state(FakeSource::default());
        let app = build_router(state.clone());

        let (status, json) =
            post_json(app, "/api/analyze", r#"{"url":"https://example.com/watch?v=x"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "INVALID_PLAYLIST_URL");
        assert_eq!(json["error"]["message"], "Invalid playlist URL");
        assert_eq!(source.call_count(), 0);

        let snapshot = state.session.snapshot().await;
        assert!(!snapshot.loading);
        assert_eq!(
            snapshot.error.map(|e| e.code),
            Some("INVALID_PLAYLIST_URL".to_string())
        );
    }

    #[tokio::test]
    async fn test_analyze_fetch_failure() {
        let (state, _) = setup_test_state(FakeSource::default());
        let app = build_router(state);

        let (status, json) = post_json(app, "/api/analyze", r#"{"url":"?list=NOPE"}"#).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["code"], "FETCH_FAILED");
        assert_eq!(json["error"]["message"], "Error fetching playlist data");
        assert!(json["error"]["detail"].as_str().unwrap().contains("404"));
    }

    #[tokio::test]
    async fn test_analyze_rejects_missing_url_field() {
        let (state, _) = setup_test_state(FakeSource::default());
        let app = build_router(state);

        let (status, _) = post_json(app, "/api/analyze", r#"{"link":"?list=A"}"#).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn test_analyze_replaces_previous_result() {
        let mut source = FakeSource::with_playlist("FIRST", &[("a", "PT1H")]);
        source.playlists.insert("SECOND".to_string(), vec!["b".to_string()]);
        source.durations.insert("b".to_string(), "PT10M".to_string());
        let (state, _) = setup_test_state(source);

        let (_, first) =
            post_json(build_router(state.clone()), "/api/analyze", r#"{"url":"?list=FIRST"}"#)
                .await;
        let (_, second) =
            post_json(build_router(state.clone()), "/api/analyze", r#"{"url":"?list=SECOND"}"#)
                .await;

        assert_eq!(first["generation"], 1);
        assert_eq!(second["generation"], 2);
        let snapshot = state.session.snapshot().await;
        assert_eq!(snapshot.report.map(|r| r.total()), Some(600));
    }
}
