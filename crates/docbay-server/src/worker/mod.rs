//! External processing worker dispatch
//!
//! After a job is queued, the worker is told about it over HTTP. Dispatch
//! is best-effort: every failure is logged and swallowed, because the job
//! record is already durable and the worker can always pick queued work up
//! on its own schedule. Status flows back exclusively through the webhook.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::config::WorkerConfig;

/// Work handed to the external worker for one queued job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequest {
    pub job_id: i64,
    pub document_id: i64,
    pub file_path: String,
    pub file_name: String,
    pub mime_type: String,
}

/// Outbound payload: the dispatch request plus the webhook the worker
/// should report back to.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DispatchPayload<'a> {
    #[serde(flatten)]
    request: &'a DispatchRequest,
    callback_url: &'a str,
}

/// Capability for handing queued jobs to the external worker.
#[async_trait]
pub trait WorkerDispatcher: Send + Sync {
    async fn dispatch(&self, request: DispatchRequest);
}

/// HTTP dispatcher talking to the worker's ingest endpoint.
pub struct HttpWorkerDispatcher {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    retry_attempts: u32,
    callback_url: String,
}

impl HttpWorkerDispatcher {
    /// Build a dispatcher from configuration. Fails when no worker base
    /// URL is configured or the HTTP client cannot be constructed.
    pub fn from_config(config: &WorkerConfig) -> anyhow::Result<Self> {
        let base_url = config
            .base_url
            .clone()
            .ok_or_else(|| anyhow::anyhow!("WORKER_BASE_URL is not configured"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            retry_attempts: config.retry_attempts.max(1),
            callback_url: config.callback_url.clone(),
        })
    }

    fn ingest_url(&self) -> String {
        format!("{}/api/ingest", self.base_url)
    }
}

#[async_trait]
impl WorkerDispatcher for HttpWorkerDispatcher {
    async fn dispatch(&self, request: DispatchRequest) {
        let url = self.ingest_url();
        let payload = DispatchPayload {
            request: &request,
            callback_url: &self.callback_url,
        };

        for attempt in 1..=self.retry_attempts {
            let result = self
                .client
                .post(&url)
                .header("X-API-Key", &self.api_key)
                .json(&payload)
                .send()
                .await
                .and_then(|response| response.error_for_status());

            match result {
                Ok(_) => {
                    tracing::info!(job_id = request.job_id, attempt, "job dispatched to worker");
                    return;
                },
                Err(err) => {
                    tracing::warn!(
                        job_id = request.job_id,
                        attempt,
                        error = %err,
                        "worker dispatch attempt failed"
                    );
                },
            }
        }

        tracing::error!(
            job_id = request.job_id,
            attempts = self.retry_attempts,
            "worker dispatch gave up; job stays queued"
        );
    }
}

/// Dispatcher used when no worker endpoint is configured (and under test):
/// jobs stay queued until the worker polls or reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDispatcher;

#[async_trait]
impl WorkerDispatcher for NoopDispatcher {
    async fn dispatch(&self, request: DispatchRequest) {
        tracing::debug!(job_id = request.job_id, "worker dispatch disabled, job left queued");
    }
}
