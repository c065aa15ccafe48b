//! Delete job commands
//!
//! Administrative hard-delete of a single job and the bulk reset. Both
//! bypass lifecycle invariants by design.

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::db::DbError;
use crate::error::AppError;
use crate::features::FeatureState;

/// Command to delete one ingestion job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteJobCommand {
    pub job_id: i64,
}

/// Command to delete every ingestion job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAllJobsCommand;

/// Response for the bulk delete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAllJobsResponse {
    pub deleted: u64,
}

/// Errors that can occur when deleting jobs
#[derive(Debug, thiserror::Error)]
pub enum DeleteJobError {
    #[error("Ingestion job {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<DeleteJobError> for AppError {
    fn from(err: DeleteJobError) -> Self {
        match err {
            DeleteJobError::NotFound(id) => {
                AppError::NotFound(format!("Ingestion job {} not found", id))
            },
            DeleteJobError::Db(e) => e.into(),
        }
    }
}

impl Request<Result<(), DeleteJobError>> for DeleteJobCommand {}
impl Request<Result<DeleteAllJobsResponse, DeleteJobError>> for DeleteAllJobsCommand {}

#[tracing::instrument(skip(state))]
pub async fn handle(state: FeatureState, command: DeleteJobCommand) -> Result<(), DeleteJobError> {
    let removed = state.jobs.delete(command.job_id).await?;
    if removed == 0 {
        return Err(DeleteJobError::NotFound(command.job_id));
    }
    tracing::info!(job_id = command.job_id, "ingestion job deleted");
    Ok(())
}

#[tracing::instrument(skip(state))]
pub async fn handle_all(
    state: FeatureState,
    _command: DeleteAllJobsCommand,
) -> Result<DeleteAllJobsResponse, DeleteJobError> {
    let deleted = state.jobs.delete_all().await?;
    tracing::warn!(deleted, "all ingestion jobs deleted");
    Ok(DeleteAllJobsResponse { deleted })
}
