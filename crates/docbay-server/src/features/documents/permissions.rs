//! Document access policy
//!
//! Decides whether an acting principal may see or change a document (and,
//! by extension, the ingestion jobs attached to it). The checks are boolean:
//! absence of the document answers `false` here, and the caller decides
//! whether that surfaces as a 404 or a 403.

use async_trait::async_trait;
use docbay_common::types::Actor;
use std::sync::Arc;

use crate::db::DbResult;

use super::store::DocumentStore;

/// Capability interface for document-level authorization.
///
/// `can_edit` currently delegates to `can_view`. The two are kept as
/// separate entry points so the edit rules can diverge without touching
/// call sites.
#[async_trait]
pub trait AccessPolicy: Send + Sync {
    async fn can_view(&self, actor: &Actor, document_id: i64) -> DbResult<bool>;

    async fn can_edit(&self, actor: &Actor, document_id: i64) -> DbResult<bool> {
        self.can_view(actor, document_id).await
    }
}

/// Ownership-based policy: administrators see everything, everyone else
/// sees only the documents they uploaded.
pub struct DocumentPermissions {
    store: Arc<dyn DocumentStore>,
}

impl DocumentPermissions {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AccessPolicy for DocumentPermissions {
    async fn can_view(&self, actor: &Actor, document_id: i64) -> DbResult<bool> {
        if actor.is_admin() {
            return Ok(true);
        }
        let document = self.store.find_by_id(document_id).await?;
        Ok(document.map(|d| d.uploaded_by_id == actor.id).unwrap_or(false))
    }
}
