//! Retry job command
//!
//! Resubmits a failed job as queued, burning one unit of retry budget.
//! The guard gives precise rejections (wrong status vs. exhausted budget);
//! the commit re-evaluates both predicates inside the write, so two racing
//! retries can never spend the same budget unit twice.

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::db::DbError;
use crate::error::AppError;
use crate::features::ingestion::state_machine::{ensure_can_retry, TransitionError};
use crate::features::ingestion::types::IngestionJob;
use crate::features::FeatureState;
use docbay_common::types::Actor;

/// Command to retry a failed ingestion job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryJobCommand {
    pub actor: Actor,
    pub job_id: i64,
}

/// Errors that can occur when retrying a job
#[derive(Debug, thiserror::Error)]
pub enum RetryJobError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("Job {0} changed state while the retry was in flight")]
    Conflict(i64),
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<RetryJobError> for AppError {
    fn from(err: RetryJobError) -> Self {
        match err {
            RetryJobError::Transition(e) => e.into(),
            RetryJobError::Conflict(id) => {
                AppError::Conflict(format!("Ingestion job {} changed state concurrently", id))
            },
            RetryJobError::Db(e) => e.into(),
        }
    }
}

impl Request<Result<IngestionJob, RetryJobError>> for RetryJobCommand {}

#[tracing::instrument(skip(state))]
pub async fn handle(
    state: FeatureState,
    command: RetryJobCommand,
) -> Result<IngestionJob, RetryJobError> {
    let job = state.jobs.find_by_id(command.job_id).await?;
    ensure_can_retry(job.as_ref(), &command.actor)?;

    let affected = state
        .jobs
        .apply_retry(command.job_id, state.clock.now())
        .await?;
    if affected == 0 {
        return Err(RetryJobError::Conflict(command.job_id));
    }

    tracing::info!(job_id = command.job_id, actor_id = command.actor.id, "ingestion job requeued");

    state
        .jobs
        .find_by_id(command.job_id)
        .await?
        .ok_or(RetryJobError::Conflict(command.job_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::test_support::{queued_job, test_state};
    use docbay_common::types::{IngestionStatus, UserRole};

    fn failed_job(id: i64, retry_count: i32, max_retries: i32) -> IngestionJob {
        let mut job = queued_job(id, 10, 2);
        job.status = IngestionStatus::Failed;
        job.retry_count = retry_count;
        job.max_retries = max_retries;
        job.error_message = Some("OCR engine timeout".to_string());
        job
    }

    #[tokio::test]
    async fn test_retry_requeues_and_burns_budget() {
        let env = test_state();
        env.seed_job(failed_job(7, 2, 3));

        let command = RetryJobCommand {
            actor: Actor::new(2, UserRole::Editor),
            job_id: 7,
        };
        let job = handle(env.feature_state(), command.clone()).await.unwrap();

        assert_eq!(job.status, IngestionStatus::Queued);
        assert_eq!(job.retry_count, 3);
        assert_eq!(job.started_at, None);
        assert_eq!(job.completed_at, None);
        assert_eq!(job.error_message, None);

        // The job fails again; its budget is now spent.
        let mut exhausted = job;
        exhausted.status = IngestionStatus::Failed;
        env.seed_job(exhausted);

        assert!(matches!(
            handle(env.feature_state(), command).await,
            Err(RetryJobError::Transition(TransitionError::RetryBudgetExhausted {
                retry_count: 3,
                max_retries: 3,
            }))
        ));
    }

    #[tokio::test]
    async fn test_retry_non_failed_job_is_invalid_transition() {
        let env = test_state();
        env.seed_job(queued_job(7, 10, 2));

        let command = RetryJobCommand {
            actor: Actor::new(2, UserRole::Editor),
            job_id: 7,
        };
        assert!(matches!(
            handle(env.feature_state(), command).await,
            Err(RetryJobError::Transition(TransitionError::InvalidTransition { .. }))
        ));
    }

    #[tokio::test]
    async fn test_retry_budget_rejection_applies_to_admins_too() {
        let env = test_state();
        env.seed_job(failed_job(7, 3, 3));

        let command = RetryJobCommand {
            actor: Actor::new(99, UserRole::Admin),
            job_id: 7,
        };
        assert!(matches!(
            handle(env.feature_state(), command).await,
            Err(RetryJobError::Transition(TransitionError::RetryBudgetExhausted { .. }))
        ));
    }

    #[tokio::test]
    async fn test_retry_by_stranger_is_forbidden() {
        let env = test_state();
        env.seed_job(failed_job(7, 0, 3));

        let command = RetryJobCommand {
            actor: Actor::new(3, UserRole::Viewer),
            job_id: 7,
        };
        assert!(matches!(
            handle(env.feature_state(), command).await,
            Err(RetryJobError::Transition(TransitionError::Forbidden))
        ));
    }
}
