/// Task document model
///
/// A task optionally references the user it is assigned to. Alongside the
/// reference it carries `assignedUserName`, a denormalized copy of that
/// user's display name, so task listings never need a second lookup. The
/// copy is kept in sync by the reference-integrity layer; when no user is
/// assigned it holds the sentinel `"unassigned"`.
///
/// # Wire format
///
/// ```json
/// {
///   "id": "b1c2d3e4-...",
///   "name": "Ship the release",
///   "description": "",
///   "deadline": "2025-01-01T00:00:00Z",
///   "completed": false,
///   "assignedUser": "7e4f0f6a-...",
///   "assignedUserName": "Ada Lovelace",
///   "dateCreated": "2024-12-01T09:30:00Z"
/// }
/// ```
///
/// `dateCreated` is set once at creation and never changed by updates.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::Document;

/// Denormalized name used whenever a task has no assigned user
pub const UNASSIGNED: &str = "unassigned";

/// Task document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task id
    pub id: Uuid,

    /// Task name (required, non-empty)
    pub name: String,

    /// Free-form description, empty by default
    #[serde(default)]
    pub description: String,

    /// When the task is due
    pub deadline: DateTime<Utc>,

    /// Whether the task has been completed
    #[serde(default)]
    pub completed: bool,

    /// Id of the user this task is assigned to, if any
    pub assigned_user: Option<Uuid>,

    /// Denormalized name of the assigned user, `"unassigned"` when none
    pub assigned_user_name: String,

    /// Creation timestamp, immutable after creation
    pub date_created: DateTime<Utc>,
}

impl Task {
    /// Creates an unassigned task with a fresh id and creation timestamp
    pub fn new(name: String, description: String, deadline: DateTime<Utc>, completed: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            deadline,
            completed,
            assigned_user: None,
            assigned_user_name: UNASSIGNED.to_string(),
            date_created: Utc::now(),
        }
    }
}

impl Document for Task {
    const COLLECTION: &'static str = "tasks";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "deadline",
        "completed",
        "assignedUser",
        "assignedUserName",
        "dateCreated",
    ];

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Parses a deadline from its wire representation.
///
/// Accepts a full RFC 3339 timestamp or a bare `YYYY-MM-DD` date, the latter
/// read as midnight UTC. Callers sending `"2025-01-01"` and callers sending
/// `"2025-01-01T12:00:00Z"` both succeed.
pub fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

/// serde helper for optional deadline fields in request payloads
pub mod lenient_deadline {
    use super::parse_deadline;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => parse_deadline(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid deadline `{raw}`"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_defaults() {
        let deadline = parse_deadline("2025-06-01").unwrap();
        let task = Task::new("Ship".to_string(), String::new(), deadline, false);

        assert_eq!(task.description, "");
        assert!(!task.completed);
        assert!(task.assigned_user.is_none());
        assert_eq!(task.assigned_user_name, UNASSIGNED);
    }

    #[test]
    fn test_parse_deadline_rfc3339() {
        let parsed = parse_deadline("2025-01-01T12:30:00Z").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2025-01-01T12:30:00+00:00");
    }

    #[test]
    fn test_parse_deadline_bare_date_is_midnight_utc() {
        let parsed = parse_deadline("2025-01-01").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_deadline_rejects_garbage() {
        assert!(parse_deadline("next tuesday").is_none());
        assert!(parse_deadline("2025-13-01").is_none());
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let deadline = parse_deadline("2025-06-01").unwrap();
        let task = Task::new("Ship".to_string(), String::new(), deadline, false);
        let value = serde_json::to_value(&task).unwrap();

        assert!(value.get("assignedUserName").is_some());
        assert!(value.get("dateCreated").is_some());
        assert_eq!(value["assignedUser"], serde_json::Value::Null);
    }
}
