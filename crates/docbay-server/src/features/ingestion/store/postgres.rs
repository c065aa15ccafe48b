//! Postgres job store adapter
//!
//! Queries are runtime-checked (`sqlx::query_as` with binds) so the crate
//! builds without a live database. Guarded updates are single statements:
//! the status predicate rides in the WHERE clause, never in application
//! code between a read and a write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docbay_common::types::IngestionStatus;
use sqlx::PgPool;

use crate::db::{DbError, DbResult};
use crate::features::ingestion::types::{IngestionJob, JobChanges, NewJob};

use super::JobStore;

/// Job store backed by the `ingestion_jobs` table.
#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const JOB_COLUMNS: &str = "id, document_id, triggered_by_id, status, progress, \
     started_at, completed_at, error_message, result_data, \
     priority, retry_count, max_retries, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    id: i64,
    document_id: i64,
    triggered_by_id: i64,
    status: String,
    progress: f64,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    error_message: Option<String>,
    result_data: Option<serde_json::Value>,
    priority: i32,
    retry_count: i32,
    max_retries: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for IngestionJob {
    type Error = DbError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let status: IngestionStatus = row
            .status
            .parse()
            .map_err(|_| DbError::corrupt("ingestion_jobs.status", &row.status))?;

        Ok(IngestionJob {
            id: row.id,
            document_id: row.document_id,
            triggered_by_id: row.triggered_by_id,
            status,
            progress: row.progress,
            started_at: row.started_at,
            completed_at: row.completed_at,
            error_message: row.error_message,
            result_data: row.result_data,
            priority: row.priority,
            retry_count: row.retry_count,
            max_retries: row.max_retries,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Shared SET clause for diff application; see [`JobChanges`] for the
/// clear-vs-keep encoding of the nullable columns.
const UPDATE_SET_CLAUSE: &str = r#"
    updated_at = $2,
    status = COALESCE($3, status),
    progress = COALESCE($4, progress),
    started_at = CASE WHEN $5 THEN $6 ELSE started_at END,
    completed_at = CASE WHEN $7 THEN $8 ELSE completed_at END,
    error_message = CASE WHEN $9 THEN $10 ELSE error_message END,
    result_data = COALESCE($11, result_data),
    retry_count = COALESCE($12, retry_count)
"#;

fn bind_changes<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    changes: &'q JobChanges,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    query
        .bind(changes.updated_at)
        .bind(changes.status.map(|s| s.to_string()))
        .bind(changes.progress)
        .bind(changes.started_at.is_some())
        .bind(changes.started_at.flatten())
        .bind(changes.completed_at.is_some())
        .bind(changes.completed_at.flatten())
        .bind(changes.error_message.is_some())
        .bind(changes.error_message.clone().flatten())
        .bind(changes.result_data.clone())
        .bind(changes.retry_count)
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn create(&self, new: NewJob) -> DbResult<IngestionJob> {
        let sql = format!(
            r#"
            INSERT INTO ingestion_jobs
                (document_id, triggered_by_id, status, progress, priority,
                 retry_count, max_retries, created_at, updated_at)
            VALUES ($1, $2, 'queued', 0, $3, 0, $4, $5, $5)
            RETURNING {JOB_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(new.document_id)
            .bind(new.triggered_by_id)
            .bind(new.priority)
            .bind(new.max_retries)
            .bind(new.created_at)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<IngestionJob>> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM ingestion_jobs WHERE id = $1");

        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(IngestionJob::try_from).transpose()
    }

    async fn update(&self, id: i64, changes: &JobChanges) -> DbResult<u64> {
        let sql = format!("UPDATE ingestion_jobs SET {UPDATE_SET_CLAUSE} WHERE id = $1");

        let result = bind_changes(sqlx::query(&sql).bind(id), changes)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn update_if_status(
        &self,
        id: i64,
        expected: &[IngestionStatus],
        changes: &JobChanges,
    ) -> DbResult<u64> {
        let sql = format!(
            "UPDATE ingestion_jobs SET {UPDATE_SET_CLAUSE} \
             WHERE id = $1 AND status = ANY($13)"
        );

        let expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
        let result = bind_changes(sqlx::query(&sql).bind(id), changes)
            .bind(expected)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn apply_retry(&self, id: i64, now: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE ingestion_jobs SET
                status = 'queued',
                retry_count = retry_count + 1,
                started_at = NULL,
                completed_at = NULL,
                error_message = NULL,
                updated_at = $2
            WHERE id = $1
              AND status = 'failed'
              AND retry_count < max_retries
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn list(
        &self,
        status: Option<IngestionStatus>,
        limit: i64,
        offset: i64,
    ) -> DbResult<(Vec<IngestionJob>, i64)> {
        let mut where_clause = String::from("WHERE 1=1");
        if let Some(status) = status {
            where_clause.push_str(&format!(" AND status = '{}'", status));
        }

        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM ingestion_jobs {where_clause} \
             ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        );
        let count_sql = format!("SELECT COUNT(*) FROM ingestion_jobs {where_clause}");

        let rows = sqlx::query_as::<_, JobRow>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: (i64,) = sqlx::query_as(&count_sql).fetch_one(&self.pool).await?;

        let jobs = rows
            .into_iter()
            .map(IngestionJob::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((jobs, total.0))
    }

    async fn list_by_user(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> DbResult<(Vec<IngestionJob>, i64)> {
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM ingestion_jobs WHERE triggered_by_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        );

        let rows = sqlx::query_as::<_, JobRow>(&sql)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM ingestion_jobs WHERE triggered_by_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        let jobs = rows
            .into_iter()
            .map(IngestionJob::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((jobs, total.0))
    }

    async fn count(&self) -> DbResult<i64> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ingestion_jobs")
            .fetch_one(&self.pool)
            .await?;
        Ok(total.0)
    }

    async fn delete(&self, id: i64) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM ingestion_jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_all(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM ingestion_jobs")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
