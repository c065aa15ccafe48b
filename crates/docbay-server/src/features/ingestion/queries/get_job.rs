//! Get job query
//!
//! Owner/admin-scoped fetch of a single job. Absence and denial stay
//! distinguishable for the HTTP layer.

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::db::DbError;
use crate::error::AppError;
use crate::features::ingestion::types::IngestionJob;
use crate::features::FeatureState;
use docbay_common::types::Actor;

/// Query to fetch a job by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetJobQuery {
    pub actor: Actor,
    pub job_id: i64,
}

/// Error type for the get job query
#[derive(Debug, thiserror::Error)]
pub enum GetJobError {
    #[error("Ingestion job {0} not found")]
    NotFound(i64),
    #[error("Not allowed to view ingestion job {0}")]
    Forbidden(i64),
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<GetJobError> for AppError {
    fn from(err: GetJobError) -> Self {
        match err {
            GetJobError::NotFound(id) => {
                AppError::NotFound(format!("Ingestion job {} not found", id))
            },
            GetJobError::Forbidden(_) => {
                AppError::Forbidden("Not allowed to view this ingestion job".to_string())
            },
            GetJobError::Db(e) => e.into(),
        }
    }
}

impl Request<Result<IngestionJob, GetJobError>> for GetJobQuery {}

#[tracing::instrument(skip(state))]
pub async fn handle(state: FeatureState, query: GetJobQuery) -> Result<IngestionJob, GetJobError> {
    let job = state
        .jobs
        .find_by_id(query.job_id)
        .await?
        .ok_or(GetJobError::NotFound(query.job_id))?;

    if !query.actor.is_admin() && job.triggered_by_id != query.actor.id {
        return Err(GetJobError::Forbidden(query.job_id));
    }

    Ok(job)
}
