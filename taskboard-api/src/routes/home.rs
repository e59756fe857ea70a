/// Service banner endpoints
///
/// # Endpoints
///
/// - `GET /` - Service banner with the endpoint map
/// - `GET /api` - Service banner

use axum::Json;
use serde_json::{json, Value};

use crate::response::Envelope;

/// Root banner with the endpoint map
pub async fn index() -> Json<Envelope<Value>> {
    Json(Envelope::new(
        "Taskboard API is running",
        json!({
            "users": "/api/users",
            "tasks": "/api/tasks",
        }),
    ))
}

/// API-root banner
pub async fn api_root() -> Json<Envelope<Value>> {
    Json(Envelope::new("Taskboard API is running", Value::Null))
}
