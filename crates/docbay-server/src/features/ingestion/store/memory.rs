//! In-memory job store adapter
//!
//! Mirrors the Postgres adapter's semantics (including the guarded update
//! predicates) over a `Mutex<HashMap>`. Used by the test suite, where its
//! write counter backs the "no store write happened" assertions, and usable
//! for running the service without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docbay_common::types::IngestionStatus;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::db::DbResult;
use crate::features::ingestion::types::{IngestionJob, JobChanges, NewJob};

use super::JobStore;

#[derive(Default)]
struct Inner {
    jobs: HashMap<i64, IngestionJob>,
    next_id: i64,
    writes: u64,
}

/// Job store held in process memory.
#[derive(Default)]
pub struct InMemoryJobStore {
    inner: Mutex<Inner>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mutating store operations performed so far.
    pub fn write_count(&self) -> u64 {
        self.lock().writes
    }

    /// Insert or replace a job record directly, bypassing the lifecycle.
    /// Test seam; does not count as a write.
    pub fn seed(&self, job: IngestionJob) {
        let mut inner = self.lock();
        inner.next_id = inner.next_id.max(job.id);
        inner.jobs.insert(job.id, job);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, new: NewJob) -> DbResult<IngestionJob> {
        let mut inner = self.lock();
        inner.next_id += 1;
        inner.writes += 1;

        let job = IngestionJob {
            id: inner.next_id,
            document_id: new.document_id,
            triggered_by_id: new.triggered_by_id,
            status: IngestionStatus::Queued,
            progress: 0.0,
            started_at: None,
            completed_at: None,
            error_message: None,
            result_data: None,
            priority: new.priority,
            retry_count: 0,
            max_retries: new.max_retries,
            created_at: new.created_at,
            updated_at: new.created_at,
        };
        inner.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<IngestionJob>> {
        Ok(self.lock().jobs.get(&id).cloned())
    }

    async fn update(&self, id: i64, changes: &JobChanges) -> DbResult<u64> {
        let mut inner = self.lock();
        inner.writes += 1;
        match inner.jobs.get_mut(&id) {
            Some(job) => {
                job.apply(changes);
                Ok(1)
            },
            None => Ok(0),
        }
    }

    async fn update_if_status(
        &self,
        id: i64,
        expected: &[IngestionStatus],
        changes: &JobChanges,
    ) -> DbResult<u64> {
        let mut inner = self.lock();
        inner.writes += 1;
        match inner.jobs.get_mut(&id) {
            Some(job) if expected.contains(&job.status) => {
                job.apply(changes);
                Ok(1)
            },
            _ => Ok(0),
        }
    }

    async fn apply_retry(&self, id: i64, now: DateTime<Utc>) -> DbResult<u64> {
        let mut inner = self.lock();
        inner.writes += 1;
        match inner.jobs.get_mut(&id) {
            Some(job)
                if job.status == IngestionStatus::Failed && job.retry_count < job.max_retries =>
            {
                job.status = IngestionStatus::Queued;
                job.retry_count += 1;
                job.started_at = None;
                job.completed_at = None;
                job.error_message = None;
                job.updated_at = now;
                Ok(1)
            },
            _ => Ok(0),
        }
    }

    async fn list(
        &self,
        status: Option<IngestionStatus>,
        limit: i64,
        offset: i64,
    ) -> DbResult<(Vec<IngestionJob>, i64)> {
        let inner = self.lock();
        let mut jobs: Vec<IngestionJob> = inner
            .jobs
            .values()
            .filter(|job| status.map(|s| job.status == s).unwrap_or(true))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = jobs.len() as i64;
        let page = jobs
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn list_by_user(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> DbResult<(Vec<IngestionJob>, i64)> {
        let inner = self.lock();
        let mut jobs: Vec<IngestionJob> = inner
            .jobs
            .values()
            .filter(|job| job.triggered_by_id == user_id)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = jobs.len() as i64;
        let page = jobs
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn count(&self) -> DbResult<i64> {
        Ok(self.lock().jobs.len() as i64)
    }

    async fn delete(&self, id: i64) -> DbResult<u64> {
        let mut inner = self.lock();
        inner.writes += 1;
        Ok(inner.jobs.remove(&id).map(|_| 1).unwrap_or(0))
    }

    async fn delete_all(&self) -> DbResult<u64> {
        let mut inner = self.lock();
        inner.writes += 1;
        let removed = inner.jobs.len() as u64;
        inner.jobs.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 5, 14, 0, 0).unwrap()
    }

    fn new_job(document_id: i64, triggered_by_id: i64) -> NewJob {
        NewJob {
            document_id,
            triggered_by_id,
            priority: 0,
            max_retries: 3,
            created_at: now(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids_and_initial_state() {
        let store = InMemoryJobStore::new();
        let first = store.create(new_job(10, 1)).await.unwrap();
        let second = store.create(new_job(11, 1)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.status, IngestionStatus::Queued);
        assert_eq!(first.progress, 0.0);
        assert_eq!(first.retry_count, 0);
    }

    #[tokio::test]
    async fn test_guarded_update_respects_expected_statuses() {
        let store = InMemoryJobStore::new();
        let job = store.create(new_job(10, 1)).await.unwrap();

        let mut to_processing = JobChanges::at(now());
        to_processing.status = Some(IngestionStatus::Processing);
        let affected = store
            .update_if_status(job.id, &[IngestionStatus::Queued], &to_processing)
            .await
            .unwrap();
        assert_eq!(affected, 1);

        // Same guard no longer matches.
        let affected = store
            .update_if_status(job.id, &[IngestionStatus::Queued], &to_processing)
            .await
            .unwrap();
        assert_eq!(affected, 0);
    }

    #[tokio::test]
    async fn test_apply_retry_enforces_predicate_in_the_write() {
        let store = InMemoryJobStore::new();
        let created = store.create(new_job(10, 1)).await.unwrap();

        // Not failed yet: no-op.
        assert_eq!(store.apply_retry(created.id, now()).await.unwrap(), 0);

        let mut failed = created.clone();
        failed.status = IngestionStatus::Failed;
        failed.retry_count = 2;
        failed.error_message = Some("boom".to_string());
        store.seed(failed);

        assert_eq!(store.apply_retry(created.id, now()).await.unwrap(), 1);
        let job = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(job.status, IngestionStatus::Queued);
        assert_eq!(job.retry_count, 3);
        assert_eq!(job.error_message, None);

        // Budget exhausted now (3/3): predicate fails inside the write.
        let mut failed_again = job;
        failed_again.status = IngestionStatus::Failed;
        store.seed(failed_again);
        assert_eq!(store.apply_retry(created.id, now()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_filters_and_paginates() {
        let store = InMemoryJobStore::new();
        for i in 0..5 {
            store.create(new_job(10 + i, 1)).await.unwrap();
        }
        let mut to_failed = JobChanges::at(now());
        to_failed.status = Some(IngestionStatus::Failed);
        store.update(1, &to_failed).await.unwrap();

        let (all, total) = store.list(None, 10, 0).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(all.len(), 5);

        let (failed, failed_total) = store
            .list(Some(IngestionStatus::Failed), 10, 0)
            .await
            .unwrap();
        assert_eq!(failed_total, 1);
        assert_eq!(failed[0].id, 1);

        let (page, total) = store.list(None, 2, 4).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(page.len(), 1);
    }

    #[tokio::test]
    async fn test_write_counter_tracks_mutations_only() {
        let store = InMemoryJobStore::new();
        assert_eq!(store.write_count(), 0);

        let job = store.create(new_job(10, 1)).await.unwrap();
        assert_eq!(store.write_count(), 1);

        store.find_by_id(job.id).await.unwrap();
        store.list(None, 10, 0).await.unwrap();
        store.count().await.unwrap();
        assert_eq!(store.write_count(), 1);

        store.delete(job.id).await.unwrap();
        assert_eq!(store.write_count(), 2);
    }
}
