/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `home`: Service banner endpoints (`/`, `/api`)
/// - `users`: User CRUD endpoints
/// - `tasks`: Task CRUD endpoints

pub mod home;
pub mod tasks;
pub mod users;
