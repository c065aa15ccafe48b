//! Ingestion job state machine
//!
//! Pure decision logic for the job lifecycle:
//!
//! ```text
//! queued -> processing        (worker starts)
//! processing -> completed     (worker reports success)
//! processing -> failed        (worker reports failure)
//! queued | processing -> cancelled   (owner/admin cancel)
//! failed -> queued            (owner/admin retry, under budget)
//! ```
//!
//! Everything here takes the current record and a timestamp and returns
//! either a [`JobChanges`] diff or a typed rejection; no I/O, no clock
//! access. The command handlers own loading the job, committing the diff,
//! and choosing the status predicate for the conditional write.

use chrono::{DateTime, Utc};
use docbay_common::types::{Actor, IngestionStatus};
use thiserror::Error;

use super::types::{IngestionJob, JobChanges, StatusPatch};

/// Statuses a guarded cancel (and a worker report) may still act on.
pub const ACTIVE_STATUSES: [IngestionStatus; 2] =
    [IngestionStatus::Queued, IngestionStatus::Processing];

/// Typed rejection of a requested state change.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransitionError {
    #[error("Ingestion job not found")]
    NotFound,

    #[error("Not allowed to modify this ingestion job")]
    Forbidden,

    #[error("Cannot {action} a job in status '{status}'")]
    InvalidTransition {
        action: &'static str,
        status: IngestionStatus,
    },

    #[error("Max retries reached ({retry_count}/{max_retries})")]
    RetryBudgetExhausted { retry_count: i32, max_retries: i32 },
}

/// Build the derived diff for a direct status update.
///
/// This is a diff-builder, not a validator: it has no awareness of the
/// job's current state and copies whatever fields are present. Transition
/// checking belongs to the action-specific guards below; the administrative
/// update path uses this permissiveness deliberately. The one piece of
/// derivation: entering `processing` stamps `started_at`, and entering a
/// terminal state stamps `completed_at`.
pub fn compute_changes(patch: &StatusPatch, now: DateTime<Utc>) -> JobChanges {
    let mut changes = JobChanges::at(now);

    if let Some(status) = patch.status {
        changes.status = Some(status);
        if status == IngestionStatus::Processing {
            changes.started_at = Some(Some(now));
        }
        if status.is_terminal() {
            changes.completed_at = Some(Some(now));
        }
    }
    if let Some(progress) = patch.progress {
        changes.progress = Some(progress);
    }
    if let Some(ref message) = patch.error_message {
        changes.error_message = Some(Some(message.clone()));
    }
    if let Some(ref results) = patch.result_data {
        changes.result_data = Some(results.clone());
    }

    changes
}

/// Authorize a cancel request against the current record.
///
/// Returns the job unchanged so the caller can derive the cancel diff, or
/// rejects with the reason: absent record, foreign actor, or a job already
/// in a terminal state.
pub fn ensure_can_cancel<'a>(
    job: Option<&'a IngestionJob>,
    actor: &Actor,
) -> Result<&'a IngestionJob, TransitionError> {
    let job = job.ok_or(TransitionError::NotFound)?;
    if !actor.is_admin() && job.triggered_by_id != actor.id {
        return Err(TransitionError::Forbidden);
    }
    if job.status.is_terminal() {
        return Err(TransitionError::InvalidTransition {
            action: "cancel",
            status: job.status,
        });
    }
    Ok(job)
}

/// Authorize a retry request against the current record.
///
/// Same ownership rules as cancel; additionally the job must be `failed`
/// and still have retry budget. An attempt beyond the budget is rejected,
/// never silently capped.
pub fn ensure_can_retry<'a>(
    job: Option<&'a IngestionJob>,
    actor: &Actor,
) -> Result<&'a IngestionJob, TransitionError> {
    let job = job.ok_or(TransitionError::NotFound)?;
    if !actor.is_admin() && job.triggered_by_id != actor.id {
        return Err(TransitionError::Forbidden);
    }
    if job.status != IngestionStatus::Failed {
        return Err(TransitionError::InvalidTransition {
            action: "retry",
            status: job.status,
        });
    }
    if job.retry_count >= job.max_retries {
        return Err(TransitionError::RetryBudgetExhausted {
            retry_count: job.retry_count,
            max_retries: job.max_retries,
        });
    }
    Ok(job)
}

/// The diff committed by a successful cancel.
pub fn cancel_changes(now: DateTime<Utc>) -> JobChanges {
    let mut changes = JobChanges::at(now);
    changes.status = Some(IngestionStatus::Cancelled);
    changes.completed_at = Some(Some(now));
    changes
}

/// The diff committed by a successful retry: back to the queue with one
/// more attempt burned and the previous run's traces cleared.
pub fn retry_changes(job: &IngestionJob, now: DateTime<Utc>) -> JobChanges {
    let mut changes = JobChanges::at(now);
    changes.status = Some(IngestionStatus::Queued);
    changes.retry_count = Some(job.retry_count + 1);
    changes.started_at = Some(None);
    changes.completed_at = Some(None);
    changes.error_message = Some(None);
    changes
}

/// The diff committed by a forced failure (watchdog path for jobs stuck in
/// `processing`).
pub fn fail_changes(message: &str, now: DateTime<Utc>) -> JobChanges {
    let mut changes = JobChanges::at(now);
    changes.status = Some(IngestionStatus::Failed);
    changes.completed_at = Some(Some(now));
    changes.error_message = Some(Some(message.to_string()));
    changes
}
