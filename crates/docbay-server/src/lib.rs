//! Docbay Server Library
//!
//! HTTP server for managing documents and their asynchronous ingestion.
//!
//! # Overview
//!
//! Documents registered on the platform are processed out of band by an
//! external worker. This server owns the lifecycle of the **ingestion
//! jobs** tracking that processing:
//!
//! - **State Machine**: pure transition logic over job records
//! - **Coordinator Commands**: trigger, cancel, retry, force-fail, direct
//!   updates - the only writers of job state
//! - **Webhook Ingress**: the worker's report channel, tolerant of late
//!   and duplicated deliveries
//! - **Job Store**: Postgres adapter with per-job atomic conditional
//!   writes, plus an in-memory adapter for tests
//!
//! # Architecture
//!
//! The server follows a **CQRS (Command Query Responsibility Segregation)**
//! architecture: each feature is a vertical slice with command handlers
//! (write operations), query handlers (reads), and its route definitions.
//! Commands and queries implement the mediator pattern via the `mediator`
//! crate.
//!
//! ## Framework Stack
//!
//! - **Axum**: web framework
//! - **SQLx**: asynchronous Postgres access
//! - **Tower / tower-http**: middleware (CORS, request tracing)
//!
//! # Example
//!
//! ```no_run
//! use docbay_server::config::Config;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     println!("would bind {}:{}", config.server.host, config.server.port);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod cqrs;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;
pub mod worker;

// Re-export commonly used types
pub use error::{ApiResult, AppError};
pub use features::FeatureState;
