//! Core domain logic for project todos.
//! This crate is the single source of truth for todo lifecycle invariants.

pub mod access;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use access::{
    Actor, Authorizer, MarkdownRenderer, ParagraphRenderer, ProjectGrants, TodoAction,
};
pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::comment::{Comment, CommentId};
pub use model::todo::{Collection, Todo, TodoContent, TodoId, TodoValidationError};
pub use model::user::UserRef;
pub use repo::comment_repo::{CommentRepository, StoreCommentRepository};
pub use repo::todo_repo::{StoreTodoRepository, TodoRepository};
pub use repo::{RepoError, RepoResult};
pub use service::error::{Outcome, TodoServiceError};
pub use service::lifecycle::{DeleteRequest, LifecycleManager, TodoState, Transition};
pub use service::listing::{ListingEngine, TodoPage, TODOS_PER_PAGE};
pub use service::todo_service::{ServiceResult, TodoService};
pub use store::{Bucket, EntityStore, SqliteEntityStore, StoreError};

/// Minimal health-check API for embedding binaries.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
