//! Ingestion feature module
//!
//! The job lifecycle core: the state machine over persisted job records,
//! the coordinator commands that are its only writers, the read queries,
//! the worker webhook ingress, and the job store adapters.

pub mod commands;
pub mod queries;
pub mod routes;
pub mod state_machine;
pub mod store;
pub mod types;
pub mod webhook;

#[cfg(test)]
mod routes_test;

pub use routes::ingestion_routes;
pub use types::IngestionJob;
