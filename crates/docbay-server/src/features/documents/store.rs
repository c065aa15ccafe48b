//! Document store adapters
//!
//! Read-only access to document metadata. The Postgres adapter backs the
//! running server; the in-memory adapter backs the test suite.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::db::{DbError, DbResult};
use chrono::{DateTime, Utc};
use docbay_common::types::DocumentStatus;

use super::types::Document;

/// Read access to document metadata.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> DbResult<Option<Document>>;
}

// ============================================================================
// Postgres adapter
// ============================================================================

/// Document store backed by the `documents` table.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: i64,
    title: String,
    description: Option<String>,
    file_name: String,
    file_path: String,
    file_size: i64,
    mime_type: String,
    status: String,
    uploaded_by_id: i64,
    tags: Option<String>,
    metadata: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = DbError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        let status: DocumentStatus = row
            .status
            .parse()
            .map_err(|_| DbError::corrupt("documents.status", &row.status))?;

        Ok(Document {
            id: row.id,
            title: row.title,
            description: row.description,
            file_name: row.file_name,
            file_path: row.file_path,
            file_size: row.file_size,
            mime_type: row.mime_type,
            status,
            uploaded_by_id: row.uploaded_by_id,
            tags: row.tags,
            metadata: row.metadata,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find_by_id(&self, id: i64) -> DbResult<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, title, description, file_name, file_path, file_size,
                   mime_type, status, uploaded_by_id, tags, metadata,
                   created_at, updated_at
            FROM documents
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Document::try_from).transpose()
    }
}

// ============================================================================
// In-memory adapter
// ============================================================================

/// Document store held in process memory. Used by the test suite and for
/// running the service without a database.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: Mutex<HashMap<i64, Document>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document.
    pub fn seed(&self, document: Document) {
        let mut documents = self.documents.lock().unwrap_or_else(|e| e.into_inner());
        documents.insert(document.id, document);
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find_by_id(&self, id: i64) -> DbResult<Option<Document>> {
        let documents = self.documents.lock().unwrap_or_else(|e| e.into_inner());
        Ok(documents.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_document(id: i64, uploaded_by_id: i64) -> Document {
        let at = Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap();
        Document {
            id,
            title: format!("Document {}", id),
            description: None,
            file_name: "report.pdf".to_string(),
            file_path: format!("/data/uploads/{}/report.pdf", uploaded_by_id),
            file_size: 4096,
            mime_type: "application/pdf".to_string(),
            status: DocumentStatus::Pending,
            uploaded_by_id,
            tags: None,
            metadata: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn test_in_memory_store_round_trip() {
        let store = InMemoryDocumentStore::new();
        store.seed(sample_document(10, 1));

        let found = store.find_by_id(10).await.unwrap();
        assert_eq!(found.map(|d| d.uploaded_by_id), Some(1));
        assert!(store.find_by_id(11).await.unwrap().is_none());
    }
}
