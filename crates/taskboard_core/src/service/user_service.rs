//! User use-case service.
//!
//! # Responsibility
//! - Provide create/update/get/list/delete for users.
//! - Reject duplicate persons before insert.
//!
//! # Invariants
//! - Updates fully replace first name, last name and birth date.
//! - Duplicate persons are rejected by lookup on create and by the storage
//!   unique index on every write.

use super::{rejected, ServiceError, ServiceResult};
use crate::clock::Clock;
use crate::model::user::{User, UserDraft, UserId};
use crate::repo::user_repo::UserRepository;
use crate::validation::{validate_user, ValidationError};
use log::info;

/// User service facade over a repository implementation.
pub struct UserService<'c, R: UserRepository> {
    repo: R,
    clock: &'c dyn Clock,
}

impl<'c, R: UserRepository> UserService<'c, R> {
    pub fn new(repo: R, clock: &'c dyn Clock) -> Self {
        Self { repo, clock }
    }

    pub fn list_all(&self) -> ServiceResult<Vec<User>> {
        Ok(self.repo.list_users()?)
    }

    /// Absent users are `Ok(None)`, not an error.
    pub fn get_by_id(&self, id: UserId) -> ServiceResult<Option<User>> {
        Ok(self.repo.get_user(id)?)
    }

    /// Validates and persists a new user.
    pub fn create(&self, draft: &UserDraft) -> ServiceResult<User> {
        let fields = validate_user(draft, self.clock.today())
            .map_err(|err| rejected("user_create", err))?;

        if self.repo.find_by_identity(&fields.identity_key())?.is_some() {
            return Err(rejected("user_create", ValidationError::DuplicateUser));
        }

        let user = self.repo.insert_user(&fields)?;
        info!(
            "event=user_create module=service status=ok user_id={}",
            user.id
        );
        Ok(user)
    }

    /// Replaces all mutable fields of an existing user.
    pub fn update(&self, id: UserId, draft: &UserDraft) -> ServiceResult<User> {
        let mut user = self
            .repo
            .get_user(id)?
            .ok_or(ServiceError::UserNotFound(id))?;

        let fields = validate_user(draft, self.clock.today())
            .map_err(|err| rejected("user_update", err))?;
        user.replace_fields(fields);

        self.repo.update_user(&user)?;
        info!("event=user_update module=service status=ok user_id={id}");
        Ok(user)
    }

    pub fn delete(&self, id: UserId) -> ServiceResult<()> {
        if self.repo.get_user(id)?.is_none() {
            return Err(ServiceError::UserNotFound(id));
        }
        self.repo.delete_user(id)?;
        info!("event=user_delete module=service status=ok user_id={id}");
        Ok(())
    }
}
