//! Common test utilities for docbay server integration tests
//!
//! Wires the feature router against the in-memory store adapters, so the
//! suite exercises the full HTTP surface without a database.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

use docbay_common::types::{DocumentStatus, IngestionStatus};
use docbay_server::features::documents::store::InMemoryDocumentStore;
use docbay_server::features::documents::types::Document;
use docbay_server::features::documents::DocumentPermissions;
use docbay_server::features::ingestion::store::InMemoryJobStore;
use docbay_server::features::ingestion::types::IngestionJob;
use docbay_server::features::shared::clock::FixedClock;
use docbay_server::features::{self, FeatureState};
use docbay_server::worker::NoopDispatcher;

/// The app under test plus handles on its in-memory adapters.
pub struct TestApp {
    router: Router,
    pub jobs: Arc<InMemoryJobStore>,
    pub documents: Arc<InMemoryDocumentStore>,
    pub clock: Arc<FixedClock>,
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap()
}

pub fn spawn_app() -> TestApp {
    let jobs = Arc::new(InMemoryJobStore::new());
    let documents = Arc::new(InMemoryDocumentStore::new());
    let clock = Arc::new(FixedClock::at(base_time()));

    let state = FeatureState {
        jobs: jobs.clone(),
        documents: documents.clone(),
        policy: Arc::new(DocumentPermissions::new(documents.clone())),
        clock: clock.clone(),
        worker: Arc::new(NoopDispatcher),
    };

    TestApp {
        router: features::router(state),
        jobs,
        documents,
        clock,
    }
}

impl TestApp {
    /// Send a request and return status plus parsed JSON body (Null for
    /// empty bodies).
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        actor: Option<(i64, &str)>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some((id, role)) = actor {
            builder = builder
                .header("x-user-id", id.to_string())
                .header("x-user-role", role);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub fn seed_document(&self, id: i64, uploaded_by_id: i64) {
        self.documents.seed(Document {
            id,
            title: format!("Document {}", id),
            description: Some("integration fixture".to_string()),
            file_name: "report.pdf".to_string(),
            file_path: format!("/data/uploads/{}/report.pdf", uploaded_by_id),
            file_size: 4096,
            mime_type: "application/pdf".to_string(),
            status: DocumentStatus::Pending,
            uploaded_by_id,
            tags: None,
            metadata: None,
            created_at: base_time(),
            updated_at: base_time(),
        });
    }

    pub fn seed_job(&self, id: i64, triggered_by_id: i64, status: IngestionStatus) -> IngestionJob {
        let job = IngestionJob {
            id,
            document_id: 10,
            triggered_by_id,
            status,
            progress: 0.0,
            started_at: None,
            completed_at: None,
            error_message: None,
            result_data: None,
            priority: 0,
            retry_count: 0,
            max_retries: 3,
            created_at: base_time(),
            updated_at: base_time(),
        };
        self.jobs.seed(job.clone());
        job
    }
}
