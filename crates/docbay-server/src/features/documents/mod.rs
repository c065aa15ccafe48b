//! Documents feature module
//!
//! Document CRUD and storage live behind the gateway; this module only
//! exposes the read side the ingestion subsystem needs: the document record,
//! the store adapters, the access policy, and the visibility-check query.

pub mod permissions;
pub mod queries;
pub mod store;
pub mod types;

pub use permissions::{AccessPolicy, DocumentPermissions};
pub use store::{DocumentStore, InMemoryDocumentStore, PgDocumentStore};
pub use types::Document;
