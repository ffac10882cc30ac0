use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::projections as all_projections;
use crate::duration::{format_seconds, DurationSeconds};
use crate::models::PlaybackSpeed;
use crate::pipeline::SessionState;

#[derive(Debug, Deserialize)]
pub struct ProjectionQuery {
    pub speed: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Projection {
    pub speed: PlaybackSpeed,
    pub multiplier: f64,
    pub seconds: f64,
    pub label: String,
}

impl Projection {
    fn new(speed: PlaybackSpeed, seconds: f64) -> Self {
        Self {
            speed,
            multiplier: speed.multiplier(),
            seconds,
            label: format_seconds(seconds),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectionsResponse {
    pub total_seconds: DurationSeconds,
    pub projections: Vec<Projection>,
}

/// GET /api/result
pub async fn current(State(state): State<AppState>) -> Json<SessionState> {
    Json(state.session.snapshot().await)
}

/// GET /api/result/projection?speed=1.5
pub async fn projection(
    State(state): State<AppState>,
    Query(query): Query<ProjectionQuery>,
) -> Result<Json<Projection>, ApiError> {
    let speed: PlaybackSpeed = query
        .speed
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("{}", e)))?;

    let seconds = state
        .session
        .projection(speed)
        .await
        .ok_or_else(|| ApiError::NotFound("No analysis result yet".to_string()))?;

    Ok(Json(Projection::new(speed, seconds)))
}

/// GET /api/result/projections
pub async fn projections(
    State(state): State<AppState>,
) -> Result<Json<ProjectionsResponse>, ApiError> {
    let snapshot = state.session.snapshot().await;
    let report = snapshot
        .report
        .ok_or_else(|| ApiError::NotFound("No analysis result yet".to_string()))?;

    let total = report.total();
    Ok(Json(ProjectionsResponse {
        total_seconds: total,
        projections: all_projections(total)
            .into_iter()
            .map(|(speed, seconds)| Projection::new(speed, seconds))
            .collect(),
    }))
}
