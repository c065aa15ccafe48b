//! Database pool construction and adapter-level errors

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use thiserror::Error;

use crate::config::DatabaseConfig;

/// Errors surfaced by the store adapters
#[derive(Error, Debug)]
pub enum DbError {
    /// SQL query or connection error
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Database configuration is invalid or missing
    #[error("Database configuration error: {0}. Check DATABASE_URL and connection settings.")]
    Config(String),

    /// A persisted value could not be decoded into its domain type
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl DbError {
    /// Create a corrupt-record error with column context
    pub fn corrupt(column: &str, value: impl std::fmt::Display) -> Self {
        Self::Corrupt(format!("column '{}' holds unexpected value '{}'", column, value))
    }
}

pub type DbResult<T> = Result<T, DbError>;

/// Create a connection pool from the database configuration
pub async fn create_pool(config: &DatabaseConfig) -> DbResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await?;

    Ok(pool)
}
