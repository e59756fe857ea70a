/// User CRUD endpoints
///
/// # Endpoints
///
/// - `GET    /api/users` - List users (query translation, no default limit)
/// - `POST   /api/users` - Create user
/// - `GET    /api/users/:id` - Get user by id
/// - `PUT    /api/users/:id` - Update user
/// - `DELETE /api/users/:id` - Delete user and unassign its tasks
///
/// Creation and update take `pendingTasks` from the caller as-is; the list
/// is only cross-checked against tasks when assignments flow through the
/// task endpoints. Deleting a user cascades an unassign over every task
/// that still references it.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use taskboard_shared::models::user::User;
use taskboard_shared::store::query::Filter;
use taskboard_shared::store::Document;
use uuid::Uuid;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    query::{self, ListParams},
    response::Envelope,
};

/// Create/update request body; required fields are checked in the handlers
/// so a missing field answers 400 in the service envelope
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub pending_tasks: Option<Vec<Uuid>>,
}

impl UserPayload {
    /// Returns (name, email), rejecting missing or empty values
    fn require_name_email(&self) -> ApiResult<(String, String)> {
        match (self.name.as_deref(), self.email.as_deref()) {
            (Some(name), Some(email)) if !name.is_empty() && !email.is_empty() => {
                Ok((name.to_string(), email.to_string()))
            }
            _ => Err(ApiError::Validation(
                "Name and email are required".to_string(),
            )),
        }
    }
}

fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidId("Invalid user ID".to_string()))
}

async fn email_taken(state: &AppState, email: &str) -> ApiResult<bool> {
    let filter = Filter::field_eq("email", json!(email));
    Ok(state.store.users.count(&filter).await? > 0)
}

/// List users
///
/// Supports `where`, `sort`, `select`, `skip`, `limit`, and `count` query
/// parameters. Unlike tasks, no limit is applied unless the caller asks
/// for one.
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Envelope<Value>>> {
    let request = query::translate(&params, User::FIELDS, None)?;

    if request.count {
        let count = state.store.users.count(&request.query.filter).await?;
        return Ok(Json(Envelope::ok(json!({ "count": count }))));
    }

    let users = state.store.users.find(&request.query).await?;
    let mut data = serde_json::to_value(users)?;
    query::project_list(&mut data, request.projection.as_ref());
    Ok(Json(Envelope::ok(data)))
}

/// Create a user
///
/// # Errors
///
/// - `400 Bad Request`: missing name/email, or the email is already in use
/// - `500 Internal Server Error`: store failure
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<UserPayload>,
) -> ApiResult<(StatusCode, Json<Envelope<User>>)> {
    let (name, email) = payload.require_name_email()?;

    if email_taken(&state, &email).await? {
        return Err(ApiError::DuplicateEmail);
    }

    let user = User::new(name, email, payload.pending_tasks.unwrap_or_default());
    // a racing insert still surfaces as DuplicateEmail via the unique index
    state.store.users.insert(&user).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::new("User created successfully", user)),
    ))
}

/// Get a user by id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<User>>> {
    let id = parse_id(&id)?;
    let user = state
        .store
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(Envelope::ok(user)))
}

/// Update a user
///
/// Name and email are required. Email uniqueness is re-checked only when
/// the email actually changes. `pendingTasks` is replaced wholesale with
/// whatever the caller sent (or emptied when absent).
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UserPayload>,
) -> ApiResult<Json<Envelope<User>>> {
    let id = parse_id(&id)?;
    let mut user = state
        .store
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let (name, email) = payload.require_name_email()?;

    if email != user.email && email_taken(&state, &email).await? {
        return Err(ApiError::DuplicateEmail);
    }

    user.name = name;
    user.email = email;
    user.pending_tasks = payload.pending_tasks.unwrap_or_default();
    state.store.users.replace(user.id, &user).await?;

    Ok(Json(Envelope::new("User updated successfully", user)))
}

/// Delete a user
///
/// Removes the user, then unassigns every task that referenced it. The two
/// steps are not atomic; the cascade is best-effort after the delete has
/// already happened.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;

    let deleted = state.store.users.delete(id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    state.store.integrity().cascade_unassign_all(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
