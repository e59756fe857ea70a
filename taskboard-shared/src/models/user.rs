/// User document model
///
/// A user owns an ordered list of pending task ids. The list is maintained
/// by the reference-integrity layer whenever tasks are assigned, reassigned,
/// or deleted; on user creation and update it is taken from the caller as-is.
///
/// # Wire format
///
/// ```json
/// {
///   "id": "7e4f0f6a-...",
///   "name": "Ada Lovelace",
///   "email": "ada@example.com",
///   "pendingTasks": ["b1c2d3e4-..."]
/// }
/// ```
///
/// Email must be unique across all users; the store enforces this as a
/// unique field and the handlers additionally pre-check it.
///
/// # Example
///
/// ```
/// use taskboard_shared::models::user::User;
///
/// let user = User::new("Ada Lovelace".to_string(), "ada@example.com".to_string(), vec![]);
/// assert!(user.pending_tasks.is_empty());
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::Document;

/// User document
///
/// `pending_tasks` may legitimately hold the same id at most once after any
/// assignment path: inserts go through a membership check, while removals
/// drop every occurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user id
    pub id: Uuid,

    /// Display name (required, non-empty)
    pub name: String,

    /// Email address, unique across users
    pub email: String,

    /// Ids of tasks currently assigned to this user, in assignment order
    #[serde(default)]
    pub pending_tasks: Vec<Uuid>,
}

impl User {
    /// Creates a user with a fresh id
    pub fn new(name: String, email: String, pending_tasks: Vec<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            pending_tasks,
        }
    }
}

impl Document for User {
    const COLLECTION: &'static str = "users";
    const FIELDS: &'static [&'static str] = &["id", "name", "email", "pendingTasks"];
    const UNIQUE: &'static [&'static str] = &["email"];

    fn id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_is_camel_case() {
        let user = User::new("Ada".to_string(), "ada@example.com".to_string(), vec![]);
        let value = serde_json::to_value(&user).unwrap();

        assert!(value.get("pendingTasks").is_some());
        assert!(value.get("pending_tasks").is_none());
        assert_eq!(value["name"], "Ada");
    }

    #[test]
    fn test_pending_tasks_defaults_to_empty() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": Uuid::new_v4(),
            "name": "Ada",
            "email": "ada@example.com",
        }))
        .unwrap();

        assert!(user.pending_tasks.is_empty());
    }
}
