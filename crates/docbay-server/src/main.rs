//! Docbay Server - Main entry point

use anyhow::Result;
use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use docbay_common::logging::{init_logging, LogConfig};
use serde_json::json;
use sqlx::PgPool;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tracing::info;

use docbay_server::{
    config::Config,
    db,
    features::{
        self,
        documents::{DocumentPermissions, PgDocumentStore},
        ingestion::store::PgJobStore,
        shared::clock::SystemClock,
        FeatureState,
    },
    middleware,
    worker::{HttpWorkerDispatcher, NoopDispatcher, WorkerDispatcher},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with configuration from environment
    let log_config = LogConfig::builder()
        .log_file_prefix("docbay-server".to_string())
        .filter_directives("docbay_server=debug,tower_http=debug,sqlx=info".to_string())
        .build();

    // Environment variables take precedence
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    init_logging(&log_config)?;

    info!("Starting Docbay Server");

    // Load configuration
    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    // Initialize database connection pool
    let pool = db::create_pool(&config.database).await?;
    info!("Database connection pool established");

    // Run migrations
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
    info!("Database migrations completed");

    // Worker dispatch: HTTP when configured, otherwise the worker polls
    let worker: Arc<dyn WorkerDispatcher> = if config.worker.base_url.is_some() {
        info!("Worker dispatch enabled");
        Arc::new(HttpWorkerDispatcher::from_config(&config.worker)?)
    } else {
        info!("No worker endpoint configured, dispatch disabled");
        Arc::new(NoopDispatcher)
    };

    // Wire the feature state against Postgres
    let documents = Arc::new(PgDocumentStore::new(pool.clone()));
    let state = FeatureState {
        jobs: Arc::new(PgJobStore::new(pool.clone())),
        documents: documents.clone(),
        policy: Arc::new(DocumentPermissions::new(documents)),
        clock: Arc::new(SystemClock),
        worker,
    };

    // Build the application router
    let app = create_router(pool, state, &config);

    // Create socket address
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_router(pool: PgPool, state: FeatureState, config: &Config) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .with_state(pool)
        .nest("/api/v1", features::router(state))
        // Apply layers from innermost to outermost
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Root handler
async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Docbay Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// Health check handler
async fn health_check(
    axum::extract::State(pool): axum::extract::State<PgPool>,
) -> Result<impl IntoResponse, StatusCode> {
    match sqlx::query("SELECT 1").fetch_one(&pool).await {
        Ok(_) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected"
            })),
        )),
        Err(e) => {
            tracing::error!("Database health check failed: {:?}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        },
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    // Give ongoing requests time to complete
    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
