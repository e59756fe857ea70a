//! # Taskboard Shared Library
//!
//! This crate contains the domain types, the document-store abstraction, and
//! the reference-integrity logic shared by the Taskboard binaries.
//!
//! ## Module Organization
//!
//! - `models`: Document models (User, Task) and their wire format
//! - `store`: Document-store interface, query expressions, in-memory backend
//! - `integrity`: Two-way reference maintenance between Users and Tasks

pub mod integrity;
pub mod models;
pub mod store;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
