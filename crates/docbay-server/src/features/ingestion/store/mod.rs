//! Job store
//!
//! The single shared mutable resource of the ingestion subsystem. All
//! writes go through the command handlers; reads may be performed by any
//! component. Update operations return affected-row counts so callers can
//! distinguish "applied" from "the record moved under us" — the guarded
//! variants re-check the expected status inside the write itself, which is
//! what makes cancel/retry/webhook application atomic per job.

mod memory;
mod postgres;

pub use memory::InMemoryJobStore;
pub use postgres::PgJobStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docbay_common::types::IngestionStatus;

use crate::db::DbResult;

use super::types::{IngestionJob, JobChanges, NewJob};

/// Durable record store for ingestion jobs.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new job in its initial state (`queued`, progress 0,
    /// retry_count 0) and return the stored record.
    async fn create(&self, new: NewJob) -> DbResult<IngestionJob>;

    async fn find_by_id(&self, id: i64) -> DbResult<Option<IngestionJob>>;

    /// Apply a diff unconditionally. Returns the number of rows touched
    /// (0 when the job does not exist).
    async fn update(&self, id: i64, changes: &JobChanges) -> DbResult<u64>;

    /// Apply a diff only while the job is still in one of the expected
    /// statuses. Returns 0 when the job is absent or has moved on.
    async fn update_if_status(
        &self,
        id: i64,
        expected: &[IngestionStatus],
        changes: &JobChanges,
    ) -> DbResult<u64>;

    /// Atomically resubmit a failed job: back to `queued`, one more retry
    /// burned, run state cleared. The budget predicate
    /// (`status = failed AND retry_count < max_retries`) is evaluated
    /// inside the write. Returns 0 when the predicate no longer holds.
    async fn apply_retry(&self, id: i64, now: DateTime<Utc>) -> DbResult<u64>;

    /// Page through all jobs, newest first, optionally filtered by status.
    /// Returns the page and the total match count.
    async fn list(
        &self,
        status: Option<IngestionStatus>,
        limit: i64,
        offset: i64,
    ) -> DbResult<(Vec<IngestionJob>, i64)>;

    /// Page through the jobs a principal triggered, newest first.
    async fn list_by_user(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> DbResult<(Vec<IngestionJob>, i64)>;

    /// Total number of job records.
    async fn count(&self) -> DbResult<i64>;

    /// Hard-delete one job. Returns the number of rows removed.
    async fn delete(&self, id: i64) -> DbResult<u64>;

    /// Hard-delete every job (administrative reset).
    async fn delete_all(&self) -> DbResult<u64>;
}
