//! Force-fail job command
//!
//! The watchdog hook: no timeout is modeled for jobs stuck in `processing`,
//! so an external policy (operator or scheduler) uses this to apply the
//! failure transition with an explanatory message. Terminal jobs are left
//! untouched.

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::db::DbError;
use crate::error::AppError;
use crate::features::ingestion::state_machine::{fail_changes, ACTIVE_STATUSES};
use crate::features::ingestion::types::IngestionJob;
use crate::features::FeatureState;

/// Command to force a stuck job into `failed`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForceFailJobCommand {
    pub job_id: i64,
    pub message: String,
}

/// Errors that can occur when force-failing a job
#[derive(Debug, thiserror::Error)]
pub enum ForceFailJobError {
    #[error("Ingestion job {0} not found")]
    NotFound(i64),
    #[error("Cannot force-fail job {0}: already in a terminal state")]
    AlreadyTerminal(i64),
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ForceFailJobError> for AppError {
    fn from(err: ForceFailJobError) -> Self {
        match err {
            ForceFailJobError::NotFound(id) => {
                AppError::NotFound(format!("Ingestion job {} not found", id))
            },
            ForceFailJobError::AlreadyTerminal(id) => AppError::InvalidTransition(format!(
                "Ingestion job {} is already in a terminal state",
                id
            )),
            ForceFailJobError::Db(e) => e.into(),
        }
    }
}

impl Request<Result<IngestionJob, ForceFailJobError>> for ForceFailJobCommand {}

#[tracing::instrument(skip(state))]
pub async fn handle(
    state: FeatureState,
    command: ForceFailJobCommand,
) -> Result<IngestionJob, ForceFailJobError> {
    let changes = fail_changes(&command.message, state.clock.now());
    let affected = state
        .jobs
        .update_if_status(command.job_id, &ACTIVE_STATUSES, &changes)
        .await?;

    if affected == 0 {
        return match state.jobs.find_by_id(command.job_id).await? {
            Some(_) => Err(ForceFailJobError::AlreadyTerminal(command.job_id)),
            None => Err(ForceFailJobError::NotFound(command.job_id)),
        };
    }

    tracing::warn!(job_id = command.job_id, reason = %command.message, "ingestion job force-failed");

    state
        .jobs
        .find_by_id(command.job_id)
        .await?
        .ok_or(ForceFailJobError::NotFound(command.job_id))
}
