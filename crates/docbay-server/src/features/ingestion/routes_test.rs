//! Router tests for the ingestion endpoints
//!
//! Drive the axum router directly against the in-memory stores: role
//! guards, the unauthenticated webhook, and the error translation.

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::json;
    use tower::ServiceExt;

    use crate::features::ingestion::ingestion_routes;
    use crate::features::ingestion::store::JobStore;
    use crate::features::test_support::{queued_job, sample_document, test_state, TestEnv};
    use docbay_common::types::IngestionStatus;

    fn create_test_router(env: &TestEnv) -> Router {
        ingestion_routes().with_state(env.feature_state())
    }

    fn request(method: &str, uri: &str, actor: Option<(i64, &str)>, body: Option<serde_json::Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some((id, role)) = actor {
            builder = builder
                .header("x-user-id", id.to_string())
                .header("x-user-role", role);
        }
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_trigger_creates_job() {
        let env = test_state();
        env.seed_document(sample_document(10, 2));
        let app = create_test_router(&env);

        let response = app
            .oneshot(request(
                "POST",
                "/trigger",
                Some((2, "editor")),
                Some(json!({"document_id": 10})),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_trigger_requires_editor_role() {
        let env = test_state();
        env.seed_document(sample_document(10, 2));
        let app = create_test_router(&env);

        let response = app
            .oneshot(request(
                "POST",
                "/trigger",
                Some((2, "viewer")),
                Some(json!({"document_id": 10})),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_missing_gateway_headers_are_unauthorized() {
        let env = test_state();
        let app = create_test_router(&env);

        let response = app
            .oneshot(request("GET", "/my/jobs", None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_list_all_is_admin_only() {
        let env = test_state();
        let app = create_test_router(&env);

        let response = app
            .clone()
            .oneshot(request("GET", "/jobs", Some((2, "editor")), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .oneshot(request("GET", "/jobs?status=failed&per_page=10", Some((1, "admin")), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_job_not_found() {
        let env = test_state();
        let app = create_test_router(&env);

        let response = app
            .oneshot(request("GET", "/jobs/999", Some((1, "admin")), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_job_hides_foreign_jobs() {
        let env = test_state();
        env.seed_job(queued_job(7, 10, 2));
        let app = create_test_router(&env);

        let response = app
            .oneshot(request("GET", "/jobs/7", Some((3, "editor")), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_webhook_rejects_zero_job_id_without_store_write() {
        let env = test_state();
        let app = create_test_router(&env);

        let response = app
            .oneshot(request(
                "POST",
                "/webhook",
                None,
                Some(json!({"jobId": 0, "status": "processing"})),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(env.jobs.write_count(), 0);
    }

    #[tokio::test]
    async fn test_webhook_rejects_missing_job_id_without_store_write() {
        let env = test_state();
        let app = create_test_router(&env);

        let response = app
            .oneshot(request(
                "POST",
                "/webhook",
                None,
                Some(json!({"status": "processing"})),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(env.jobs.write_count(), 0);
    }

    #[tokio::test]
    async fn test_webhook_needs_no_auth_headers() {
        let env = test_state();
        env.seed_job(queued_job(5, 10, 2));
        let app = create_test_router(&env);

        let response = app
            .oneshot(request(
                "POST",
                "/webhook",
                None,
                Some(json!({"jobId": 5, "status": "processing", "progress": 12.5})),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let job = env.jobs.find_by_id(5).await.unwrap().unwrap();
        assert_eq!(job.status, IngestionStatus::Processing);
    }

    #[tokio::test]
    async fn test_cancel_terminal_job_is_bad_request() {
        let env = test_state();
        let mut job = queued_job(7, 10, 2);
        job.status = IngestionStatus::Completed;
        env.seed_job(job);
        let app = create_test_router(&env);

        let response = app
            .oneshot(request("PUT", "/jobs/7/cancel", Some((1, "admin")), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_is_admin_only() {
        let env = test_state();
        env.seed_job(queued_job(7, 10, 2));
        let app = create_test_router(&env);

        let response = app
            .clone()
            .oneshot(request("DELETE", "/jobs/7", Some((2, "editor")), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .oneshot(request("DELETE", "/jobs/7", Some((1, "admin")), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_stats_allows_editors() {
        let env = test_state();
        let app = create_test_router(&env);

        let response = app
            .oneshot(request("GET", "/stats", Some((2, "editor")), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
