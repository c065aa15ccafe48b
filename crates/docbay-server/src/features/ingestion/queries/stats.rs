//! Ingestion statistics query

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::db::DbError;
use crate::error::AppError;
use crate::features::FeatureState;

/// Query for ingestion statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestionStatsQuery;

/// Response for the stats query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionStatsResponse {
    pub total_jobs: i64,
}

/// Error type for the stats query
#[derive(Debug, thiserror::Error)]
pub enum IngestionStatsError {
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<IngestionStatsError> for AppError {
    fn from(err: IngestionStatsError) -> Self {
        match err {
            IngestionStatsError::Db(e) => e.into(),
        }
    }
}

impl Request<Result<IngestionStatsResponse, IngestionStatsError>> for IngestionStatsQuery {}

#[tracing::instrument(skip(state))]
pub async fn handle(
    state: FeatureState,
    _query: IngestionStatsQuery,
) -> Result<IngestionStatsResponse, IngestionStatsError> {
    let total_jobs = state.jobs.count().await?;
    Ok(IngestionStatsResponse { total_jobs })
}
