//! Get document query
//!
//! The visibility check used before a document-scoped operation may proceed.
//! Absence and denial stay distinguishable: a missing document is NotFound,
//! an existing document the actor may not see is Forbidden.

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::db::DbError;
use crate::error::AppError;
use crate::features::documents::types::Document;
use crate::features::FeatureState;
use docbay_common::types::Actor;

/// Query to fetch a document on behalf of an actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetDocumentQuery {
    pub actor: Actor,
    pub document_id: i64,
}

/// Error type for the get document query
#[derive(Debug, thiserror::Error)]
pub enum GetDocumentError {
    #[error("Document {0} not found")]
    NotFound(i64),
    #[error("Access to document {0} denied")]
    Forbidden(i64),
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<GetDocumentError> for AppError {
    fn from(err: GetDocumentError) -> Self {
        match err {
            GetDocumentError::NotFound(id) => {
                AppError::NotFound(format!("Document {} not found", id))
            },
            GetDocumentError::Forbidden(_) => {
                AppError::Forbidden("Access to document denied".to_string())
            },
            GetDocumentError::Db(e) => e.into(),
        }
    }
}

impl Request<Result<Document, GetDocumentError>> for GetDocumentQuery {}

#[tracing::instrument(skip(state))]
pub async fn handle(
    state: FeatureState,
    query: GetDocumentQuery,
) -> Result<Document, GetDocumentError> {
    let document = state
        .documents
        .find_by_id(query.document_id)
        .await?
        .ok_or(GetDocumentError::NotFound(query.document_id))?;

    if !state.policy.can_view(&query.actor, query.document_id).await? {
        return Err(GetDocumentError::Forbidden(query.document_id));
    }

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::test_support::{sample_document, test_state};
    use docbay_common::types::UserRole;

    #[tokio::test]
    async fn test_uploader_gets_document() {
        let env = test_state();
        env.seed_document(sample_document(10, 2));

        let query = GetDocumentQuery {
            actor: Actor::new(2, UserRole::Editor),
            document_id: 10,
        };
        let document = handle(env.feature_state(), query).await.unwrap();
        assert_eq!(document.id, 10);
    }

    #[tokio::test]
    async fn test_missing_document_is_not_found() {
        let env = test_state();

        let query = GetDocumentQuery {
            actor: Actor::new(2, UserRole::Editor),
            document_id: 10,
        };
        let result = handle(env.feature_state(), query).await;
        assert!(matches!(result, Err(GetDocumentError::NotFound(10))));
    }

    #[tokio::test]
    async fn test_stranger_is_forbidden() {
        let env = test_state();
        env.seed_document(sample_document(10, 2));

        let query = GetDocumentQuery {
            actor: Actor::new(3, UserRole::Viewer),
            document_id: 10,
        };
        let result = handle(env.feature_state(), query).await;
        assert!(matches!(result, Err(GetDocumentError::Forbidden(10))));
    }
}
