//! Docbay Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the docbay project.
//!
//! # Overview
//!
//! This crate provides common functionality used across all docbay workspace
//! members:
//!
//! - **Error Handling**: Custom error types and result types
//! - **Logging**: Centralized tracing configuration and initialization
//! - **Types**: Shared domain enums and the acting principal type
//!
//! # Example
//!
//! ```no_run
//! use docbay_common::{Result, DocbayError};
//! use docbay_common::types::IngestionStatus;
//!
//! fn parse_status(raw: &str) -> Result<IngestionStatus> {
//!     let status: IngestionStatus = raw.parse()?;
//!     Ok(status)
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{DocbayError, Result};
