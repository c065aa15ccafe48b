//! Feature modules implementing the docbay API
//!
//! Each feature is a vertical slice following the CQRS pattern: commands
//! for write operations, queries for reads, and its route definitions.
//!
//! # Features
//!
//! - **documents**: document records, store adapters, and the access policy
//!   consumed by the ingestion subsystem (document CRUD itself lives behind
//!   the gateway)
//! - **ingestion**: the job lifecycle core - state machine, coordinator
//!   commands, queries, webhook ingress, and the job store

pub mod documents;
pub mod ingestion;
pub mod shared;

use std::sync::Arc;

use axum::Router;

use crate::worker::WorkerDispatcher;
use documents::{AccessPolicy, DocumentStore};
use ingestion::store::JobStore;
use shared::clock::Clock;

/// Shared state for all feature routes.
///
/// Everything is behind a trait object so the same handlers run against
/// Postgres in production and the in-memory adapters under test.
#[derive(Clone)]
pub struct FeatureState {
    pub jobs: Arc<dyn JobStore>,
    pub documents: Arc<dyn DocumentStore>,
    pub policy: Arc<dyn AccessPolicy>,
    pub clock: Arc<dyn Clock>,
    pub worker: Arc<dyn WorkerDispatcher>,
}

impl std::fmt::Debug for FeatureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureState").finish_non_exhaustive()
    }
}

/// Creates the main API router with all feature routes mounted
///
/// - `/ingestion` - job lifecycle operations and the worker webhook
pub fn router(state: FeatureState) -> Router<()> {
    Router::new().nest("/ingestion", ingestion::ingestion_routes().with_state(state))
}
