//! Trigger ingestion command
//!
//! Creates a queued job for a document the actor may see, then hands the
//! work to the external processing worker. Dispatch is fire-and-forget: a
//! worker that cannot be reached right now will find the job still queued.

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::db::DbError;
use crate::error::AppError;
use crate::features::documents::queries::get_document::{
    handle as get_document, GetDocumentError, GetDocumentQuery,
};
use crate::features::ingestion::types::{IngestionJob, NewJob};
use crate::features::shared::validation::{
    validate_max_retries, validate_priority, BoundsValidationError,
};
use crate::features::FeatureState;
use crate::worker::DispatchRequest;
use docbay_common::types::Actor;

/// Default retry budget for newly created jobs.
pub const DEFAULT_MAX_RETRIES: i32 = 3;

/// Command to trigger ingestion of a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerIngestionCommand {
    pub actor: Actor,
    pub document_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<i32>,
}

/// Errors that can occur when triggering ingestion
#[derive(Debug, thiserror::Error)]
pub enum TriggerIngestionError {
    /// The document is absent or not visible to the actor
    #[error(transparent)]
    Document(#[from] GetDocumentError),
    /// A numeric field is out of bounds
    #[error(transparent)]
    Validation(#[from] BoundsValidationError),
    /// A database error occurred
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<TriggerIngestionError> for AppError {
    fn from(err: TriggerIngestionError) -> Self {
        match err {
            TriggerIngestionError::Document(e) => e.into(),
            TriggerIngestionError::Validation(e) => AppError::Validation(e.to_string()),
            TriggerIngestionError::Db(e) => e.into(),
        }
    }
}

impl Request<Result<IngestionJob, TriggerIngestionError>> for TriggerIngestionCommand {}

/// Handles the trigger ingestion command
///
/// # Errors
///
/// - `Document` - the document does not exist or the actor may not see it
/// - `Validation` - priority outside 0..=10 or maxRetries outside 1..=10
/// - `Db` - a database error occurred
#[tracing::instrument(skip(state))]
pub async fn handle(
    state: FeatureState,
    command: TriggerIngestionCommand,
) -> Result<IngestionJob, TriggerIngestionError> {
    let priority = command.priority.unwrap_or(0);
    let max_retries = command.max_retries.unwrap_or(DEFAULT_MAX_RETRIES);
    validate_priority(priority)?;
    validate_max_retries(max_retries)?;

    let document = get_document(
        state.clone(),
        GetDocumentQuery {
            actor: command.actor,
            document_id: command.document_id,
        },
    )
    .await?;

    let job = state
        .jobs
        .create(NewJob {
            document_id: command.document_id,
            triggered_by_id: command.actor.id,
            priority,
            max_retries,
            created_at: state.clock.now(),
        })
        .await?;

    tracing::info!(job_id = job.id, document_id = job.document_id, "ingestion job queued");

    let dispatch = DispatchRequest {
        job_id: job.id,
        document_id: document.id,
        file_path: document.file_path,
        file_name: document.file_name,
        mime_type: document.mime_type,
    };
    let worker = state.worker.clone();
    tokio::spawn(async move {
        worker.dispatch(dispatch).await;
    });

    Ok(job)
}
