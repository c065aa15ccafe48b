//! Update job status command
//!
//! The direct administrative write path, also used by the webhook ingress
//! after its own guards. Computes the derived diff and applies it without a
//! transition check: trusted callers may move a job anywhere, which is the
//! deliberate counterpart to the guarded cancel/retry paths.

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::db::DbError;
use crate::error::AppError;
use crate::features::ingestion::state_machine::compute_changes;
use crate::features::ingestion::types::{IngestionJob, StatusPatch};
use crate::features::shared::validation::{validate_progress, BoundsValidationError};
use crate::features::FeatureState;

/// Command to apply a direct status update to a job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateJobStatusCommand {
    pub job_id: i64,
    pub patch: StatusPatch,
}

/// Errors that can occur when updating a job
#[derive(Debug, thiserror::Error)]
pub enum UpdateJobStatusError {
    #[error("Ingestion job {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    Validation(#[from] BoundsValidationError),
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<UpdateJobStatusError> for AppError {
    fn from(err: UpdateJobStatusError) -> Self {
        match err {
            UpdateJobStatusError::NotFound(id) => {
                AppError::NotFound(format!("Ingestion job {} not found", id))
            },
            UpdateJobStatusError::Validation(e) => AppError::Validation(e.to_string()),
            UpdateJobStatusError::Db(e) => e.into(),
        }
    }
}

impl Request<Result<IngestionJob, UpdateJobStatusError>> for UpdateJobStatusCommand {}

#[tracing::instrument(skip(state))]
pub async fn handle(
    state: FeatureState,
    command: UpdateJobStatusCommand,
) -> Result<IngestionJob, UpdateJobStatusError> {
    if let Some(progress) = command.patch.progress {
        validate_progress(progress)?;
    }

    let changes = compute_changes(&command.patch, state.clock.now());
    let affected = state.jobs.update(command.job_id, &changes).await?;
    if affected == 0 {
        return Err(UpdateJobStatusError::NotFound(command.job_id));
    }

    state
        .jobs
        .find_by_id(command.job_id)
        .await?
        .ok_or(UpdateJobStatusError::NotFound(command.job_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::test_support::{queued_job, test_state};
    use docbay_common::types::IngestionStatus;

    #[tokio::test]
    async fn test_update_moves_job_and_stamps_started_at() {
        let env = test_state();
        env.seed_job(queued_job(5, 10, 2));

        let command = UpdateJobStatusCommand {
            job_id: 5,
            patch: StatusPatch {
                status: Some(IngestionStatus::Processing),
                progress: Some(10.0),
                ..Default::default()
            },
        };
        let job = handle(env.feature_state(), command).await.unwrap();

        assert_eq!(job.status, IngestionStatus::Processing);
        assert_eq!(job.progress, 10.0);
        assert_eq!(job.started_at, Some(env.clock.now()));
        assert_eq!(job.completed_at, None);
    }

    #[tokio::test]
    async fn test_update_unknown_job_is_not_found() {
        let env = test_state();
        let command = UpdateJobStatusCommand {
            job_id: 404,
            patch: StatusPatch::default(),
        };
        assert!(matches!(
            handle(env.feature_state(), command).await,
            Err(UpdateJobStatusError::NotFound(404))
        ));
    }

    #[tokio::test]
    async fn test_update_rejects_out_of_range_progress() {
        let env = test_state();
        env.seed_job(queued_job(5, 10, 2));

        let command = UpdateJobStatusCommand {
            job_id: 5,
            patch: StatusPatch {
                progress: Some(150.0),
                ..Default::default()
            },
        };
        assert!(matches!(
            handle(env.feature_state(), command).await,
            Err(UpdateJobStatusError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_admin_path_bypasses_transition_checks() {
        // A terminal job can still be rewritten through the direct path.
        let env = test_state();
        let mut job = queued_job(5, 10, 2);
        job.status = IngestionStatus::Completed;
        env.seed_job(job);

        let command = UpdateJobStatusCommand {
            job_id: 5,
            patch: StatusPatch {
                status: Some(IngestionStatus::Queued),
                ..Default::default()
            },
        };
        let job = handle(env.feature_state(), command).await.unwrap();
        assert_eq!(job.status, IngestionStatus::Queued);
    }
}
