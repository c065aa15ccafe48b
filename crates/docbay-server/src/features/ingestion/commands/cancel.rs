//! Cancel job command
//!
//! Owner/admin cancellation of a job that has not reached a terminal state.
//! The guard runs against a loaded snapshot; the commit re-checks the
//! active-status predicate inside the write, so a webhook landing between
//! the two surfaces as a conflict instead of silently overwriting.

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::db::DbError;
use crate::error::AppError;
use crate::features::ingestion::state_machine::{
    cancel_changes, ensure_can_cancel, TransitionError, ACTIVE_STATUSES,
};
use crate::features::ingestion::types::IngestionJob;
use crate::features::FeatureState;
use docbay_common::types::Actor;

/// Command to cancel an ingestion job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelJobCommand {
    pub actor: Actor,
    pub job_id: i64,
}

/// Errors that can occur when cancelling a job
#[derive(Debug, thiserror::Error)]
pub enum CancelJobError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("Job {0} changed state while the cancel was in flight")]
    Conflict(i64),
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<CancelJobError> for AppError {
    fn from(err: CancelJobError) -> Self {
        match err {
            CancelJobError::Transition(e) => e.into(),
            CancelJobError::Conflict(id) => {
                AppError::Conflict(format!("Ingestion job {} changed state concurrently", id))
            },
            CancelJobError::Db(e) => e.into(),
        }
    }
}

impl Request<Result<IngestionJob, CancelJobError>> for CancelJobCommand {}

#[tracing::instrument(skip(state))]
pub async fn handle(
    state: FeatureState,
    command: CancelJobCommand,
) -> Result<IngestionJob, CancelJobError> {
    let job = state.jobs.find_by_id(command.job_id).await?;
    ensure_can_cancel(job.as_ref(), &command.actor)?;

    let changes = cancel_changes(state.clock.now());
    let affected = state
        .jobs
        .update_if_status(command.job_id, &ACTIVE_STATUSES, &changes)
        .await?;
    if affected == 0 {
        return Err(CancelJobError::Conflict(command.job_id));
    }

    tracing::info!(job_id = command.job_id, actor_id = command.actor.id, "ingestion job cancelled");

    state
        .jobs
        .find_by_id(command.job_id)
        .await?
        .ok_or(CancelJobError::Conflict(command.job_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::test_support::{queued_job, test_state};
    use docbay_common::types::{IngestionStatus, UserRole};

    #[tokio::test]
    async fn test_owner_cancels_active_job() {
        let env = test_state();
        let mut job = queued_job(7, 10, 2);
        job.status = IngestionStatus::Processing;
        env.seed_job(job);

        let command = CancelJobCommand {
            actor: Actor::new(2, UserRole::Editor),
            job_id: 7,
        };
        let job = handle(env.feature_state(), command).await.unwrap();

        assert_eq!(job.status, IngestionStatus::Cancelled);
        assert_eq!(job.completed_at, Some(env.clock.now()));
    }

    #[tokio::test]
    async fn test_stranger_cancel_is_forbidden() {
        let env = test_state();
        let mut job = queued_job(7, 10, 2);
        job.status = IngestionStatus::Processing;
        env.seed_job(job);

        let command = CancelJobCommand {
            actor: Actor::new(3, UserRole::Editor),
            job_id: 7,
        };
        assert!(matches!(
            handle(env.feature_state(), command).await,
            Err(CancelJobError::Transition(TransitionError::Forbidden))
        ));
    }

    #[tokio::test]
    async fn test_cancel_terminal_job_is_invalid_transition() {
        let env = test_state();
        let mut job = queued_job(7, 10, 2);
        job.status = IngestionStatus::Completed;
        env.seed_job(job);

        let command = CancelJobCommand {
            actor: Actor::new(99, UserRole::Admin),
            job_id: 7,
        };
        assert!(matches!(
            handle(env.feature_state(), command).await,
            Err(CancelJobError::Transition(TransitionError::InvalidTransition { .. }))
        ));
    }

    #[tokio::test]
    async fn test_cancel_missing_job_is_not_found() {
        let env = test_state();
        let command = CancelJobCommand {
            actor: Actor::new(99, UserRole::Admin),
            job_id: 404,
        };
        assert!(matches!(
            handle(env.feature_state(), command).await,
            Err(CancelJobError::Transition(TransitionError::NotFound))
        ));
    }
}
