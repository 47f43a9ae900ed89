//! Core domain logic for Taskboard.
//! This crate is the single source of truth for user/task business rules.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use db::{open_db, open_db_in_memory, with_transaction, DbError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{Priority, Task, TaskDraft, TaskFields, TaskId, TaskStatus, UnknownTaskStatus};
pub use model::user::{User, UserDraft, UserFields, UserId};
pub use repo::task_repo::{SqliteTaskRepository, TaskQuery, TaskRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::task_service::{TaskService, UserTasks};
pub use service::user_service::UserService;
pub use service::{ServiceError, ServiceResult};
pub use validation::{validate_task, validate_user, ValidationError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
