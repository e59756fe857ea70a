/// Task CRUD endpoints
///
/// # Endpoints
///
/// - `GET    /api/tasks` - List tasks (query translation, default limit 100)
/// - `POST   /api/tasks` - Create task, assigning it when requested
/// - `GET    /api/tasks/:id` - Get task by id
/// - `PUT    /api/tasks/:id` - Update task, reassigning when the owner changes
/// - `DELETE /api/tasks/:id` - Delete task and pull it from its owner
///
/// Assignment coupling differs by operation. Creation is strict: when the
/// requested assignee does not exist, nothing is persisted. Update and
/// delete are best-effort: the user-side bookkeeping runs first and is not
/// rolled back when a later step fails.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use taskboard_shared::models::task::{lenient_deadline, Task};
use taskboard_shared::store::Document;
use uuid::Uuid;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    query::{self, ListParams},
    response::Envelope,
};

/// Tasks' default page size when the caller sends no usable limit
const DEFAULT_LIMIT: u64 = 100;

/// Create/update request body; required fields are checked in the handlers
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Accepts RFC 3339 or bare `YYYY-MM-DD`
    #[serde(default, deserialize_with = "lenient_deadline::deserialize")]
    pub deadline: Option<DateTime<Utc>>,
    pub completed: Option<bool>,
    pub assigned_user: Option<Uuid>,
}

impl TaskPayload {
    /// Returns (name, deadline), rejecting missing or empty values
    fn require_name_deadline(&self) -> ApiResult<(String, DateTime<Utc>)> {
        match (self.name.as_deref(), self.deadline) {
            (Some(name), Some(deadline)) if !name.is_empty() => {
                Ok((name.to_string(), deadline))
            }
            _ => Err(ApiError::Validation(
                "Name and deadline are required".to_string(),
            )),
        }
    }
}

fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidId("Invalid task ID".to_string()))
}

/// List tasks
///
/// Supports `where`, `sort`, `select`, `skip`, `limit`, and `count` query
/// parameters; at most 100 tasks come back unless the caller raises the
/// limit.
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Envelope<Value>>> {
    let request = query::translate(&params, Task::FIELDS, Some(DEFAULT_LIMIT))?;

    if request.count {
        let count = state.store.tasks.count(&request.query.filter).await?;
        return Ok(Json(Envelope::ok(serde_json::json!({ "count": count }))));
    }

    let tasks = state.store.tasks.find(&request.query).await?;
    let mut data = serde_json::to_value(tasks)?;
    query::project_list(&mut data, request.projection.as_ref());
    Ok(Json(Envelope::ok(data)))
}

/// Create a task
///
/// When `assignedUser` is supplied the assignment runs before the insert,
/// and a missing assignee aborts the whole creation: the task is never
/// persisted half-made.
///
/// # Errors
///
/// - `400 Bad Request`: missing name/deadline, or the assignee does not exist
/// - `500 Internal Server Error`: store failure
pub async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<TaskPayload>,
) -> ApiResult<(StatusCode, Json<Envelope<Task>>)> {
    let (name, deadline) = payload.require_name_deadline()?;

    let mut task = Task::new(
        name,
        payload.description.clone().unwrap_or_default(),
        deadline,
        payload.completed.unwrap_or(false),
    );

    if let Some(user_id) = payload.assigned_user {
        state.store.integrity().assign(&mut task, user_id).await?;
    }

    state.store.tasks.insert(&task).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::new("Task created successfully", task)),
    ))
}

/// Get a task by id
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<Task>>> {
    let id = parse_id(&id)?;
    let task = state
        .store
        .tasks
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    Ok(Json(Envelope::ok(task)))
}

/// Update a task
///
/// The reference-side bookkeeping settles before the task's own write:
/// the old owner's pull and the new owner's insert run first, and only
/// then is the task persisted with its new fields. A missing new assignee
/// fails the whole update while leaving the old-side removal applied.
/// `dateCreated` is never modified.
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<TaskPayload>,
) -> ApiResult<Json<Envelope<Task>>> {
    let id = parse_id(&id)?;
    let mut task = state
        .store
        .tasks
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let (name, deadline) = payload.require_name_deadline()?;

    let old_assigned = task.assigned_user;
    let new_assigned = payload.assigned_user;

    task.name = name;
    task.description = payload.description.clone().unwrap_or_default();
    task.deadline = deadline;
    task.completed = payload.completed.unwrap_or(false);

    state
        .store
        .integrity()
        .reassign(&mut task, old_assigned, new_assigned)
        .await?;

    state.store.tasks.replace(task.id, &task).await?;

    Ok(Json(Envelope::new("Task updated successfully", task)))
}

/// Delete a task
///
/// Pulls the task from its owner's `pendingTasks`, then deletes it. The
/// two steps are not rolled back on partial failure.
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    let task = state
        .store
        .tasks
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    state
        .store
        .integrity()
        .cascade_remove_from_owner(task.id, task.assigned_user)
        .await?;
    state.store.tasks.delete(task.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
