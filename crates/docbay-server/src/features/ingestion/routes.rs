//! Ingestion routes
//!
//! The HTTP boundary of the job lifecycle subsystem; every route maps 1:1
//! onto a command or query and propagates its typed failure through
//! [`AppError`] for status-code translation. The webhook route is the one
//! unauthenticated endpoint - it exists for the external worker, not for
//! users.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;

use super::commands::{
    cancel, delete, force_fail, retry, trigger, update_status, CancelJobCommand,
    DeleteAllJobsCommand, DeleteAllJobsResponse, DeleteJobCommand, ForceFailJobCommand,
    RetryJobCommand, TriggerIngestionCommand, UpdateJobStatusCommand,
};
use super::queries::{
    get_job, list_jobs, stats, GetJobQuery, IngestionStatsQuery, IngestionStatsResponse,
    ListJobsQuery, ListMyJobsQuery,
};
use super::types::{IngestionJob, StatusPatch};
use super::webhook::{self, WebhookAck, WebhookReport};
use crate::error::AppError;
use crate::features::shared::actor::CurrentActor;
use crate::features::shared::pagination::{Paginated, PaginationParams};
use crate::features::FeatureState;
use docbay_common::types::{Actor, IngestionStatus, UserRole};

/// Create ingestion routes
pub fn ingestion_routes() -> Router<FeatureState> {
    Router::new()
        .route("/trigger", post(trigger_ingestion))
        .route("/jobs", get(list_all_jobs).delete(delete_all_jobs))
        .route("/jobs/:id", get(get_job_by_id).put(update_job).delete(delete_job))
        .route("/jobs/:id/cancel", put(cancel_job))
        .route("/jobs/:id/retry", put(retry_job))
        .route("/jobs/:id/force-fail", put(force_fail_job))
        .route("/my/jobs", get(list_my_jobs))
        .route("/stats", get(ingestion_stats))
        .route("/webhook", post(ingestion_webhook))
}

fn require_admin(actor: &Actor) -> Result<(), AppError> {
    if !actor.is_admin() {
        return Err(AppError::Forbidden("Administrator role required".to_string()));
    }
    Ok(())
}

fn require_editor(actor: &Actor) -> Result<(), AppError> {
    if actor.role == UserRole::Viewer {
        return Err(AppError::Forbidden("Editor role required".to_string()));
    }
    Ok(())
}

/// Body for POST /trigger
#[derive(Debug, Deserialize)]
struct TriggerIngestionRequest {
    document_id: i64,
    priority: Option<i32>,
    max_retries: Option<i32>,
}

/// Body for PUT /jobs/:id/force-fail
#[derive(Debug, Deserialize)]
struct ForceFailRequest {
    message: String,
}

/// Query parameters for the list endpoints
#[derive(Debug, Deserialize)]
struct ListParams {
    page: Option<i64>,
    per_page: Option<i64>,
    status: Option<IngestionStatus>,
}

/// Trigger document ingestion
///
/// POST /trigger
async fn trigger_ingestion(
    State(state): State<FeatureState>,
    CurrentActor(actor): CurrentActor,
    Json(body): Json<TriggerIngestionRequest>,
) -> Result<(StatusCode, Json<IngestionJob>), AppError> {
    require_editor(&actor)?;

    let job = trigger::handle(
        state,
        TriggerIngestionCommand {
            actor,
            document_id: body.document_id,
            priority: body.priority,
            max_retries: body.max_retries,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(job)))
}

/// List all ingestion jobs (privileged)
///
/// GET /jobs?page=1&per_page=20&status=failed
async fn list_all_jobs(
    State(state): State<FeatureState>,
    CurrentActor(actor): CurrentActor,
    Query(params): Query<ListParams>,
) -> Result<Json<Paginated<IngestionJob>>, AppError> {
    require_admin(&actor)?;

    let page = list_jobs::handle_list(
        state,
        ListJobsQuery {
            pagination: PaginationParams::new(params.page, params.per_page),
            status: params.status,
        },
    )
    .await?;

    Ok(Json(page))
}

/// Get an ingestion job by id (owner or admin)
///
/// GET /jobs/:id
async fn get_job_by_id(
    State(state): State<FeatureState>,
    CurrentActor(actor): CurrentActor,
    Path(job_id): Path<i64>,
) -> Result<Json<IngestionJob>, AppError> {
    let job = get_job::handle(state, GetJobQuery { actor, job_id }).await?;
    Ok(Json(job))
}

/// Apply a direct status update (admin only)
///
/// PUT /jobs/:id
async fn update_job(
    State(state): State<FeatureState>,
    CurrentActor(actor): CurrentActor,
    Path(job_id): Path<i64>,
    Json(patch): Json<StatusPatch>,
) -> Result<Json<IngestionJob>, AppError> {
    require_admin(&actor)?;

    let job = update_status::handle(state, UpdateJobStatusCommand { job_id, patch }).await?;
    Ok(Json(job))
}

/// Cancel an ingestion job (owner or admin)
///
/// PUT /jobs/:id/cancel
async fn cancel_job(
    State(state): State<FeatureState>,
    CurrentActor(actor): CurrentActor,
    Path(job_id): Path<i64>,
) -> Result<Json<IngestionJob>, AppError> {
    let job = cancel::handle(state, CancelJobCommand { actor, job_id }).await?;
    Ok(Json(job))
}

/// Retry a failed ingestion job (owner or admin)
///
/// PUT /jobs/:id/retry
async fn retry_job(
    State(state): State<FeatureState>,
    CurrentActor(actor): CurrentActor,
    Path(job_id): Path<i64>,
) -> Result<Json<IngestionJob>, AppError> {
    let job = retry::handle(state, RetryJobCommand { actor, job_id }).await?;
    Ok(Json(job))
}

/// Force a stuck job into `failed` (admin only)
///
/// PUT /jobs/:id/force-fail
async fn force_fail_job(
    State(state): State<FeatureState>,
    CurrentActor(actor): CurrentActor,
    Path(job_id): Path<i64>,
    Json(body): Json<ForceFailRequest>,
) -> Result<Json<IngestionJob>, AppError> {
    require_admin(&actor)?;

    let job = force_fail::handle(
        state,
        ForceFailJobCommand {
            job_id,
            message: body.message,
        },
    )
    .await?;
    Ok(Json(job))
}

/// Delete an ingestion job (admin only)
///
/// DELETE /jobs/:id
async fn delete_job(
    State(state): State<FeatureState>,
    CurrentActor(actor): CurrentActor,
    Path(job_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    require_admin(&actor)?;

    delete::handle(state, DeleteJobCommand { job_id }).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete every ingestion job (admin only, bulk reset)
///
/// DELETE /jobs
async fn delete_all_jobs(
    State(state): State<FeatureState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<DeleteAllJobsResponse>, AppError> {
    require_admin(&actor)?;

    let response = delete::handle_all(state, DeleteAllJobsCommand).await?;
    Ok(Json(response))
}

/// List the caller's own ingestion jobs
///
/// GET /my/jobs?page=1&per_page=20
async fn list_my_jobs(
    State(state): State<FeatureState>,
    CurrentActor(actor): CurrentActor,
    Query(params): Query<ListParams>,
) -> Result<Json<Paginated<IngestionJob>>, AppError> {
    let page = list_jobs::handle_list_mine(
        state,
        ListMyJobsQuery {
            user_id: actor.id,
            pagination: PaginationParams::new(params.page, params.per_page),
        },
    )
    .await?;

    Ok(Json(page))
}

/// Get ingestion statistics
///
/// GET /stats
async fn ingestion_stats(
    State(state): State<FeatureState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<IngestionStatsResponse>, AppError> {
    require_editor(&actor)?;

    let response = stats::handle(state, IngestionStatsQuery).await?;
    Ok(Json(response))
}

/// Webhook endpoint for worker status reports (unauthenticated)
///
/// POST /webhook
async fn ingestion_webhook(
    State(state): State<FeatureState>,
    Json(report): Json<WebhookReport>,
) -> Result<Json<WebhookAck>, AppError> {
    let ack = webhook::handle(state, report).await?;
    Ok(Json(ack))
}
