//! Document records
//!
//! Documents are uploaded and stored by the gateway; this service consumes
//! their metadata read-only, for visibility checks and for handing file
//! locations to the processing worker.

use chrono::{DateTime, Utc};
use docbay_common::types::DocumentStatus;
use serde::{Deserialize, Serialize};

/// A document registered on the platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub status: DocumentStatus,
    pub uploaded_by_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
