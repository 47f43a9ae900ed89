//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into user/task use cases.
//! - Enforce validation on every write path.
//!
//! # Invariants
//! - Services never bypass `crate::validation` before a full-record write.
//! - Services stay storage-agnostic; callers own the transaction boundary.

use crate::db::DbError;
use crate::model::task::TaskId;
use crate::model::user::UserId;
use crate::repo::RepoError;
use crate::validation::ValidationError;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod task_service;
pub mod user_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure of a service operation.
#[derive(Debug)]
pub enum ServiceError {
    /// Candidate violates a business rule; recoverable by resubmission.
    Validation(ValidationError),
    TaskNotFound(TaskId),
    UserNotFound(UserId),
    /// Storage fault, never a client error.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::TaskNotFound(_) | Self::UserNotFound(_) => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateIdentity => Self::Validation(ValidationError::DuplicateUser),
            other => Self::Repo(other),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

fn rejected(event: &str, err: ValidationError) -> ServiceError {
    warn!("event={event} module=service status=rejected reason=\"{err}\"");
    ServiceError::Validation(err)
}
