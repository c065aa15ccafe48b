//! Ingestion job records and mutation payloads
//!
//! Each mutation source has its own typed payload carrying only the fields
//! that source may legally set: administrators send a [`StatusPatch`], the
//! worker sends a webhook report (see `webhook`), and cancel/retry carry
//! nothing beyond the job id and the actor. The state machine turns any of
//! them into a [`JobChanges`] diff, which is the only thing a store will
//! accept for an update.

use chrono::{DateTime, Utc};
use docbay_common::types::IngestionStatus;
use serde::{Deserialize, Serialize};

/// A tracked processing run of one document by the external worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestionJob {
    pub id: i64,
    pub document_id: i64,
    pub triggered_by_id: i64,
    pub status: IngestionStatus,
    pub progress: f64,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub result_data: Option<serde_json::Value>,
    pub priority: i32,
    pub retry_count: i32,
    pub max_retries: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IngestionJob {
    /// Apply a computed diff to this record in place.
    ///
    /// Used by the in-memory store; the Postgres adapter applies the same
    /// diff as a single UPDATE statement.
    pub fn apply(&mut self, changes: &JobChanges) {
        self.updated_at = changes.updated_at;
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(progress) = changes.progress {
            self.progress = progress;
        }
        if let Some(started_at) = changes.started_at {
            self.started_at = started_at;
        }
        if let Some(completed_at) = changes.completed_at {
            self.completed_at = completed_at;
        }
        if let Some(ref error_message) = changes.error_message {
            self.error_message = error_message.clone();
        }
        if let Some(ref result_data) = changes.result_data {
            self.result_data = Some(result_data.clone());
        }
        if let Some(retry_count) = changes.retry_count {
            self.retry_count = retry_count;
        }
    }
}

/// Fields for a job about to be created.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub document_id: i64,
    pub triggered_by_id: i64,
    pub priority: i32,
    pub max_retries: i32,
    pub created_at: DateTime<Utc>,
}

/// Optionally-present fields of a direct status update.
///
/// This is the administrative payload; it deliberately bypasses transition
/// checks (the admin path and the webhook path share the same diff builder).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<IngestionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_data: Option<serde_json::Value>,
}

/// A validated diff against one job record.
///
/// Outer `None` means "leave the column alone"; for the nullable timestamp
/// and message columns an explicit `Some(None)` clears the value (the retry
/// transition resets them).
#[derive(Debug, Clone, PartialEq)]
pub struct JobChanges {
    pub updated_at: DateTime<Utc>,
    pub status: Option<IngestionStatus>,
    pub progress: Option<f64>,
    pub started_at: Option<Option<DateTime<Utc>>>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
    pub error_message: Option<Option<String>>,
    pub result_data: Option<serde_json::Value>,
    pub retry_count: Option<i32>,
}

impl JobChanges {
    /// An empty diff that only touches `updated_at`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            updated_at: now,
            status: None,
            progress: None,
            started_at: None,
            completed_at: None,
            error_message: None,
            result_data: None,
            retry_count: None,
        }
    }
}
