/// Document models for Taskboard
///
/// This module contains the two document types stored by the service and
/// their public wire format (camelCase JSON).
///
/// # Models
///
/// - `user`: User accounts with their pending-task list
/// - `task`: Tasks with an optional assigned user and the denormalized
///   assigned-user name

pub mod task;
pub mod user;

pub use task::Task;
pub use user::User;
