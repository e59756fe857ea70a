/// Two-way reference maintenance between Users and Tasks
///
/// A task's `assignedUser` and its owner's `pendingTasks` form one
/// relationship written from two sides. This module owns every mutation of
/// that relationship so the handlers never touch `pendingTasks` or
/// `assignedUserName` inline.
///
/// The store offers no multi-document transactions, and this layer does not
/// pretend otherwise: `reassign` applies the old-side removal and the
/// new-side insertion as two independent steps, and a missing new user
/// leaves the removal in place while the error surfaces to the caller.
/// Cascades on user/task deletion are per-document best-effort in the same
/// way.
///
/// # Example
///
/// ```
/// use taskboard_shared::models::{Task, User};
/// use taskboard_shared::models::task::parse_deadline;
/// use taskboard_shared::store::Store;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Store::in_memory();
/// let user = User::new("Ada".to_string(), "ada@example.com".to_string(), vec![]);
/// store.users.insert(&user).await?;
///
/// let mut task = Task::new(
///     "Ship".to_string(),
///     String::new(),
///     parse_deadline("2025-01-01").unwrap(),
///     false,
/// );
/// store.integrity().assign(&mut task, user.id).await?;
/// store.tasks.insert(&task).await?;
/// assert_eq!(task.assigned_user_name, "Ada");
/// # Ok(())
/// # }
/// ```

use serde_json::json;
use uuid::Uuid;

use crate::models::task::UNASSIGNED;
use crate::models::{Task, User};
use crate::store::query::{Filter, ListQuery};
use crate::store::{CollectionHandle, StoreError};

/// Errors from reference-integrity operations
#[derive(Debug, thiserror::Error)]
pub enum IntegrityError {
    /// The user a task was being assigned to does not exist
    #[error("assigned user {0} not found")]
    TargetNotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The denormalized assigned-user name for a task.
///
/// Every write path goes through this one function so the sentinel can
/// never drift out of sync with the reference.
pub fn name_or_unassigned(user: Option<&User>) -> String {
    match user {
        Some(user) => user.name.clone(),
        None => UNASSIGNED.to_string(),
    }
}

/// Maintains `User.pendingTasks` ↔ `Task.assignedUser` across mutations
pub struct ReferenceIntegrity {
    users: CollectionHandle<User>,
    tasks: CollectionHandle<Task>,
}

impl ReferenceIntegrity {
    pub fn new(users: CollectionHandle<User>, tasks: CollectionHandle<Task>) -> Self {
        Self { users, tasks }
    }

    /// Assigns `task` to the given user.
    ///
    /// Loads the user (absent → [`IntegrityError::TargetNotFound`]), appends
    /// the task id to `pendingTasks` only when not already present, sets the
    /// task's reference and denormalized name, and persists the user. The
    /// task itself is persisted by the caller. Calling this twice with the
    /// same pair is a no-op the second time.
    pub async fn assign(&self, task: &mut Task, user_id: Uuid) -> Result<(), IntegrityError> {
        let Some(mut user) = self.users.find_by_id(user_id).await? else {
            return Err(IntegrityError::TargetNotFound(user_id));
        };

        if !user.pending_tasks.contains(&task.id) {
            user.pending_tasks.push(task.id);
        }
        task.assigned_user = Some(user_id);
        task.assigned_user_name = name_or_unassigned(Some(&user));
        self.users.replace(user.id, &user).await?;
        Ok(())
    }

    /// Removes `task_id` from the given user's `pendingTasks`.
    ///
    /// Tolerant on every axis: a null user id, a user that no longer
    /// exists, and a task id that is not in the list are all quiet no-ops.
    pub async fn unassign(
        &self,
        task_id: Uuid,
        user_id: Option<Uuid>,
    ) -> Result<(), IntegrityError> {
        let Some(user_id) = user_id else {
            return Ok(());
        };
        let Some(mut user) = self.users.find_by_id(user_id).await? else {
            return Ok(());
        };

        let before = user.pending_tasks.len();
        user.pending_tasks.retain(|id| *id != task_id);
        if user.pending_tasks.len() != before {
            self.users.replace(user.id, &user).await?;
        }
        Ok(())
    }

    /// Moves `task` from `old` to `new`.
    ///
    /// The old-side removal and the new-side insertion are two independent
    /// best-effort steps. When the new user does not exist the removal has
    /// already been applied and stays applied; the error surfaces to the
    /// caller, which must not persist the task. Equal old and new ids skip
    /// the removal; the idempotent assign still verifies the user exists
    /// and refreshes the denormalized name.
    pub async fn reassign(
        &self,
        task: &mut Task,
        old: Option<Uuid>,
        new: Option<Uuid>,
    ) -> Result<(), IntegrityError> {
        if old != new {
            self.unassign(task.id, old).await?;
        }
        match new {
            Some(user_id) => self.assign(task, user_id).await?,
            None => {
                task.assigned_user = None;
                task.assigned_user_name = name_or_unassigned(None);
            }
        }
        Ok(())
    }

    /// Unassigns every task owned by a deleted user.
    ///
    /// Bulk but not atomic with the user delete; each task is rewritten on
    /// its own.
    pub async fn cascade_unassign_all(&self, user_id: Uuid) -> Result<(), IntegrityError> {
        let query = ListQuery::filtered(Filter::field_eq("assignedUser", json!(user_id)));
        let owned = self.tasks.find(&query).await?;

        tracing::debug!(user = %user_id, tasks = owned.len(), "unassigning tasks of deleted user");
        for mut task in owned {
            task.assigned_user = None;
            task.assigned_user_name = name_or_unassigned(None);
            self.tasks.replace(task.id, &task).await?;
        }
        Ok(())
    }

    /// Pulls a deleted task out of its owner's `pendingTasks`
    pub async fn cascade_remove_from_owner(
        &self,
        task_id: Uuid,
        user_id: Option<Uuid>,
    ) -> Result<(), IntegrityError> {
        self.unassign(task_id, user_id).await
    }
}
