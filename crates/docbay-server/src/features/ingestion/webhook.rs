//! Webhook ingress
//!
//! The single untrusted network-facing input of the subsystem: the external
//! processing worker reports progress and outcomes here. The payload shape
//! is fixed wire contract (camelCase):
//!
//! ```json
//! { "jobId": 42, "status": "processing", "progress": 55.5,
//!   "message": "...", "results": { } }
//! ```
//!
//! Tolerance rules: a malformed report (missing/zero `jobId`, out-of-range
//! progress) is rejected before any store access; a report against a job
//! already in a terminal state is acknowledged but not applied, so late and
//! duplicated deliveries cannot rewrite a recorded outcome.

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::db::DbError;
use crate::error::AppError;
use crate::features::ingestion::state_machine::{compute_changes, ACTIVE_STATUSES};
use crate::features::ingestion::types::StatusPatch;
use crate::features::shared::validation::{validate_progress, BoundsValidationError};
use crate::features::FeatureState;
use docbay_common::types::IngestionStatus;

/// A status report from the external worker. Wire contract; do not rename
/// fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookReport {
    /// The ingestion job being reported on. Required and positive.
    #[serde(default)]
    pub job_id: i64,
    pub status: IngestionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<serde_json::Value>,
}

/// Acknowledgement returned to the worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck {
    pub job_id: i64,
    /// False when the report arrived after the job reached a terminal
    /// state and was dropped.
    pub applied: bool,
}

/// Errors that can occur while handling a webhook report
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("jobId is required")]
    MissingJobId,
    #[error(transparent)]
    Validation(#[from] BoundsValidationError),
    #[error("Ingestion job {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<WebhookError> for AppError {
    fn from(err: WebhookError) -> Self {
        match err {
            WebhookError::MissingJobId => AppError::BadRequest("jobId is required".to_string()),
            WebhookError::Validation(e) => AppError::BadRequest(e.to_string()),
            WebhookError::NotFound(id) => {
                AppError::NotFound(format!("Ingestion job {} not found", id))
            },
            WebhookError::Db(e) => e.into(),
        }
    }
}

impl Request<Result<WebhookAck, WebhookError>> for WebhookReport {}

/// Apply a worker report to the referenced job.
///
/// Validation happens before the store is touched; the apply itself is a
/// single conditional write restricted to non-terminal statuses.
#[tracing::instrument(skip(state))]
pub async fn handle(state: FeatureState, report: WebhookReport) -> Result<WebhookAck, WebhookError> {
    if report.job_id <= 0 {
        return Err(WebhookError::MissingJobId);
    }
    if let Some(progress) = report.progress {
        validate_progress(progress)?;
    }

    let patch = StatusPatch {
        status: Some(report.status),
        progress: report.progress,
        error_message: report.message.clone(),
        result_data: report.results.clone(),
    };
    let changes = compute_changes(&patch, state.clock.now());

    let affected = state
        .jobs
        .update_if_status(report.job_id, &ACTIVE_STATUSES, &changes)
        .await?;

    if affected == 0 {
        return match state.jobs.find_by_id(report.job_id).await? {
            Some(job) => {
                tracing::debug!(
                    job_id = report.job_id,
                    status = %job.status,
                    reported = %report.status,
                    "dropping worker report against terminal job"
                );
                Ok(WebhookAck {
                    job_id: report.job_id,
                    applied: false,
                })
            },
            None => Err(WebhookError::NotFound(report.job_id)),
        };
    }

    tracing::info!(job_id = report.job_id, status = %report.status, "worker report applied");

    Ok(WebhookAck {
        job_id: report.job_id,
        applied: true,
    })
}
