//! List jobs queries
//!
//! Paginated listings: the privileged all-jobs view (optional status
//! filter) and the caller's own jobs.

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::db::DbError;
use crate::error::AppError;
use crate::features::ingestion::types::IngestionJob;
use crate::features::shared::pagination::{Paginated, PaginationParams};
use crate::features::FeatureState;
use docbay_common::types::IngestionStatus;

/// Query to list all jobs (privileged)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListJobsQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    /// Filter by lifecycle status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<IngestionStatus>,
}

/// Query to list the jobs one principal triggered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMyJobsQuery {
    pub user_id: i64,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Error type for the list queries
#[derive(Debug, thiserror::Error)]
pub enum ListJobsError {
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ListJobsError> for AppError {
    fn from(err: ListJobsError) -> Self {
        match err {
            ListJobsError::Db(e) => e.into(),
        }
    }
}

impl Request<Result<Paginated<IngestionJob>, ListJobsError>> for ListJobsQuery {}
impl Request<Result<Paginated<IngestionJob>, ListJobsError>> for ListMyJobsQuery {}

#[tracing::instrument(skip(state))]
pub async fn handle_list(
    state: FeatureState,
    query: ListJobsQuery,
) -> Result<Paginated<IngestionJob>, ListJobsError> {
    let params = &query.pagination;
    let (jobs, total) = state
        .jobs
        .list(query.status, params.per_page(), params.offset())
        .await?;

    Ok(Paginated::from_items(jobs, params, total))
}

#[tracing::instrument(skip(state))]
pub async fn handle_list_mine(
    state: FeatureState,
    query: ListMyJobsQuery,
) -> Result<Paginated<IngestionJob>, ListJobsError> {
    let params = &query.pagination;
    let (jobs, total) = state
        .jobs
        .list_by_user(query.user_id, params.per_page(), params.offset())
        .await?;

    Ok(Paginated::from_items(jobs, params, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::test_support::{queued_job, test_state};

    #[tokio::test]
    async fn test_list_all_with_status_filter() {
        let env = test_state();
        env.seed_job(queued_job(1, 10, 2));
        let mut failed = queued_job(2, 11, 2);
        failed.status = IngestionStatus::Failed;
        env.seed_job(failed);
        env.seed_job(queued_job(3, 12, 4));

        let query = ListJobsQuery {
            pagination: PaginationParams::default(),
            status: None,
        };
        let page = handle_list(env.feature_state(), query).await.unwrap();
        assert_eq!(page.pagination.total, 3);

        let query = ListJobsQuery {
            pagination: PaginationParams::default(),
            status: Some(IngestionStatus::Failed),
        };
        let page = handle_list(env.feature_state(), query).await.unwrap();
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.items[0].id, 2);
    }

    #[tokio::test]
    async fn test_list_mine_scopes_to_owner() {
        let env = test_state();
        env.seed_job(queued_job(1, 10, 2));
        env.seed_job(queued_job(2, 11, 2));
        env.seed_job(queued_job(3, 12, 4));

        let query = ListMyJobsQuery {
            user_id: 2,
            pagination: PaginationParams::default(),
        };
        let page = handle_list_mine(env.feature_state(), query).await.unwrap();
        assert_eq!(page.pagination.total, 2);
        assert!(page.items.iter().all(|job| job.triggered_by_id == 2));
    }

    #[tokio::test]
    async fn test_pagination_metadata_is_computed() {
        let env = test_state();
        for id in 1..=5 {
            env.seed_job(queued_job(id, 10 + id, 2));
        }

        let query = ListJobsQuery {
            pagination: PaginationParams::new(Some(2), Some(2)),
            status: None,
        };
        let page = handle_list(env.feature_state(), query).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pagination.total, 5);
        assert_eq!(page.pagination.pages, 3);
        assert!(page.pagination.has_next);
        assert!(page.pagination.has_prev);
    }
}
