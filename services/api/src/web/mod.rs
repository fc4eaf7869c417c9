pub mod rest;
pub mod state;

pub use rest::{
    create_problem_handler, delete_problem_handler, list_problems_handler, update_problem_handler,
};

use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;
use state::AppState;

/// Builds the `/api/problems` router.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/problems",
            get(list_problems_handler).post(create_problem_handler),
        )
        .route(
            "/api/problems/{id}",
            put(update_problem_handler).delete(delete_problem_handler),
        )
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    };
    use fill_blank_core::domain::{Problem, ProblemInput};
    use fill_blank_core::memory::InMemoryProblemRepository;
    use fill_blank_core::ports::{PortError, PortResult, ProblemRepository};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    struct FailingRepository;

    #[async_trait]
    impl ProblemRepository for FailingRepository {
        async fn list_problems(&self) -> PortResult<Vec<Problem>> {
            Err(PortError::Storage("database unavailable".to_string()))
        }
        async fn create_problem(&self, _input: ProblemInput) -> PortResult<Problem> {
            Err(PortError::Storage("database unavailable".to_string()))
        }
        async fn update_problem(&self, _id: Uuid, _input: ProblemInput) -> PortResult<()> {
            Err(PortError::Storage("database unavailable".to_string()))
        }
        async fn delete_problem(&self, _id: Uuid) -> PortResult<()> {
            Err(PortError::Storage("database unavailable".to_string()))
        }
    }

    fn app() -> Router {
        router(Arc::new(AppState::new(Arc::new(
            InMemoryProblemRepository::new(),
        ))))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn paris() -> Value {
        json!({ "text": "The capital of France is ___.", "answers": ["Paris"], "blanks": 1 })
    }

    #[tokio::test]
    async fn create_then_list_round_trips() {
        let app = app();

        let (status, created) = send(&app, Method::POST, "/api/problems", Some(paris())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["text"], "The capital of France is ___.");
        assert_eq!(created["answers"], json!(["Paris"]));
        assert_eq!(created["blanks"], 1);
        assert!(created.get("createdAt").is_none());
        let id = created["id"].as_str().unwrap().to_string();

        let (status, listed) = send(&app, Method::GET, "/api/problems", None).await;
        assert_eq!(status, StatusCode::OK);
        let listed = listed.as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["id"], id.as_str());
        assert_eq!(listed[0]["text"], "The capital of France is ___.");
        assert_eq!(listed[0]["answers"], json!(["Paris"]));
        assert_eq!(listed[0]["blanks"], 1);
        assert!(listed[0]["createdAt"].is_string());
        assert!(listed[0].get("updatedAt").is_none());
    }

    #[tokio::test]
    async fn update_rewrites_fields_and_keeps_identity() {
        let app = app();
        let (_, created) = send(&app, Method::POST, "/api/problems", Some(paris())).await;
        let id = created["id"].as_str().unwrap().to_string();
        let (_, before) = send(&app, Method::GET, "/api/problems", None).await;

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/api/problems/{}", id),
            Some(json!({
                "text": "___ is the capital of ___.",
                "answers": ["Paris", "France"],
                "blanks": 2
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));

        let (_, after) = send(&app, Method::GET, "/api/problems", None).await;
        let (before, after) = (&before[0], &after[0]);
        assert_eq!(after["id"], before["id"]);
        assert_eq!(after["createdAt"], before["createdAt"]);
        assert_eq!(after["text"], "___ is the capital of ___.");
        assert_eq!(after["answers"], json!(["Paris", "France"]));
        assert_eq!(after["blanks"], 2);
        assert!(after["updatedAt"].is_string());
    }

    #[tokio::test]
    async fn missing_ids_report_success() {
        let app = app();
        let missing = format!("/api/problems/{}", Uuid::new_v4());

        let (status, body) = send(&app, Method::DELETE, &missing, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));

        let (status, body) = send(&app, Method::PUT, &missing, Some(paris())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));

        let (_, listed) = send(&app, Method::GET, "/api/problems", None).await;
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn delete_removes_the_problem() {
        let app = app();
        let (_, created) = send(&app, Method::POST, "/api/problems", Some(paris())).await;
        let uri = format!("/api/problems/{}", created["id"].as_str().unwrap());

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, listed) = send(&app, Method::GET, "/api/problems", None).await;
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn malformed_ids_are_server_errors() {
        let app = app();

        let (status, body) = send(&app, Method::DELETE, "/api/problems/not-an-id", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("not-an-id"));

        let (status, body) = send(&app, Method::PUT, "/api/problems/42", Some(paris())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn inconsistent_problems_are_rejected() {
        let app = app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/problems",
            Some(json!({ "text": "___ and ___", "answers": ["salt", " "], "blanks": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains('2') && message.contains('1'));

        let (_, listed) = send(&app, Method::GET, "/api/problems", None).await;
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn unreadable_bodies_get_the_uniform_error_body() {
        let app = app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/problems",
            Some(json!({ "text": 5 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("text"));

        let uri = format!("/api/problems/{}", Uuid::new_v4());
        let not_a_problem = json!(["not", "a", "problem"]);
        let (status, body) = send(&app, Method::PUT, &uri, Some(not_a_problem)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (_, listed) = send(&app, Method::GET, "/api/problems", None).await;
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn missing_content_type_gets_the_uniform_error_body() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/problems")
            .body(Body::from(paris().to_string()))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn stored_blank_count_is_derived_from_text() {
        let app = app();
        let (status, created) = send(
            &app,
            Method::POST,
            "/api/problems",
            Some(json!({ "text": "___", "answers": ["a", ""], "blanks": 7 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["blanks"], 1);
        assert_eq!(created["answers"], json!(["a"]));
    }

    #[tokio::test]
    async fn storage_failures_become_500_with_message() {
        let app = router(Arc::new(AppState::new(Arc::new(FailingRepository))));

        let (status, body) = send(&app, Method::GET, "/api/problems", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "database unavailable" }));

        let (status, body) = send(&app, Method::POST, "/api/problems", Some(paris())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "database unavailable" }));

        let uri = format!("/api/problems/{}", Uuid::new_v4());
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn api_doc_lists_the_problem_endpoints() {
        use utoipa::OpenApi;

        let doc = serde_json::to_value(super::rest::ApiDoc::openapi()).unwrap();
        let collection = &doc["paths"]["/api/problems"];
        let item = &doc["paths"]["/api/problems/{id}"];
        assert!(collection["get"].is_object());
        assert!(collection["post"].is_object());
        assert!(item["put"].is_object());
        assert!(item["delete"].is_object());
        assert!(doc["components"]["schemas"]["ErrorResponse"].is_object());
    }
}
