//! Current-result slot shared across submissions.
//!
//! Every submission takes a [`Ticket`] carrying a fresh generation number.
//! Starting a submission overwrites the slot (result and error cleared,
//! loading set). Completing applies the outcome only when the ticket is still
//! the latest generation, so a slow older request can never overwrite a newer
//! one. Completion always clears `loading` for the latest generation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::{AnalysisReport, Analyzer, PipelineError};
use crate::models::PlaybackSpeed;

/// Handle for one in-flight submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Failure shown to the user for the latest submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionError {
    pub code: String,
    pub message: String,
    /// Underlying cause, for logs and debugging
    pub detail: String,
}

impl From<&PipelineError> for SessionError {
    fn from(err: &PipelineError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.user_message().to_string(),
            detail: err.to_string(),
        }
    }
}

/// Snapshot of the current-result slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    /// Generation of the latest submission (0 = none yet)
    pub generation: u64,
    pub loading: bool,
    pub input: Option<String>,
    pub error: Option<SessionError>,
    pub report: Option<AnalysisReport>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Outcome of [`Session::submit`].
#[derive(Debug)]
pub struct Submission {
    pub ticket: Ticket,
    /// Whether the outcome was stored as the current result
    pub applied: bool,
    pub result: Result<AnalysisReport, PipelineError>,
}

/// Generation-guarded current-result slot.
#[derive(Debug, Default)]
pub struct Session {
    state: RwLock<SessionState>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new submission, discarding whatever the slot held.
    pub async fn begin(&self, input: &str) -> Ticket {
        let mut state = self.state.write().await;
        let generation = state.generation + 1;
        *state = SessionState {
            generation,
            loading: true,
            input: Some(input.to_string()),
            error: None,
            report: None,
            started_at: Some(Utc::now()),
            completed_at: None,
        };
        debug!("Submission {} started", generation);
        Ticket { generation }
    }

    /// Store the outcome of a submission if it is still the latest one.
    ///
    /// Returns false when a newer submission has started since.
    pub async fn complete(
        &self,
        ticket: Ticket,
        outcome: &Result<AnalysisReport, PipelineError>,
    ) -> bool {
        let mut state = self.state.write().await;
        if state.generation != ticket.generation {
            debug!(
                "Dropping stale result of submission {} (latest is {})",
                ticket.generation, state.generation
            );
            return false;
        }

        state.loading = false;
        state.completed_at = Some(Utc::now());
        match outcome {
            Ok(report) => {
                state.report = Some(report.clone());
                state.error = None;
            }
            Err(err) => {
                state.report = None;
                state.error = Some(SessionError::from(err));
            }
        }
        true
    }

    /// Run one submission through `analyzer` and record its outcome.
    pub async fn submit(&self, analyzer: &Analyzer, input: &str) -> Submission {
        let ticket = self.begin(input).await;
        let result = analyzer.analyze(input).await;

        match &result {
            Ok(report) => info!(
                "Submission {}: {} items, total {}",
                ticket.generation,
                report.entries.len(),
                report.total_label()
            ),
            Err(e) => warn!("Submission {} failed: {}", ticket.generation, e),
        }

        let applied = self.complete(ticket, &result).await;
        Submission {
            ticket,
            applied,
            result,
        }
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// Projection of the current total under `speed`, if there is a result.
    pub async fn projection(&self, speed: PlaybackSpeed) -> Option<f64> {
        self.state
            .read()
            .await
            .report
            .as_ref()
            .map(|r| r.projection(speed))
    }
}
