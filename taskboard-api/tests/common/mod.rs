/// Common test utilities for integration tests
///
/// Provides a `TestContext` wrapping the full router over a fresh in-memory
/// store, plus helpers for issuing requests and seeding users and tasks.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::store::Store;
use tower::Service as _;

/// Test context holding the app under test
pub struct TestContext {
    pub app: Router,
}

impl TestContext {
    /// Creates a new test context with an empty store
    pub fn new() -> Self {
        let state = AppState::new(Store::in_memory(), Config::default());
        Self {
            app: build_router(state),
        }
    }

    /// Issues one request and returns (status, parsed body).
    ///
    /// Bodyless responses (204) parse as `Value::Null`.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Creates a user, asserting success, and returns its document
    pub async fn create_user(&self, name: &str, email: &str) -> Value {
        let (status, body) = self
            .request(
                "POST",
                "/api/users",
                Some(json!({ "name": name, "email": email })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create_user failed: {body}");
        body["data"].clone()
    }

    /// Creates a task, returning (status, parsed body) unasserted so tests
    /// can exercise the failure paths too
    pub async fn create_task(
        &self,
        name: &str,
        deadline: &str,
        assigned_user: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut payload = json!({ "name": name, "deadline": deadline });
        if let Some(user_id) = assigned_user {
            payload["assignedUser"] = json!(user_id);
        }
        self.request("POST", "/api/tasks", Some(payload)).await
    }
}

/// Percent-encodes one query-parameter value
pub fn encode(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}
