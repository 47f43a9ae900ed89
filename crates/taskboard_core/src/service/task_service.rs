//! Task use-case service.
//!
//! # Responsibility
//! - Provide task CRUD plus lookups by assignee, creator, tag, status and
//!   priority.
//! - Apply partial-merge semantics on update and revalidate the result.
//!
//! # Invariants
//! - `create` and `update` persist only fully validated records.
//! - `update_status` touches status and `update_time` only.
//! - Lookups by an unknown user return an empty list, not an error.

use super::{rejected, ServiceError, ServiceResult};
use crate::clock::Clock;
use crate::model::task::{Priority, Task, TaskDraft, TaskId, TaskStatus};
use crate::model::user::{User, UserId};
use crate::repo::task_repo::{TaskQuery, TaskRepository};
use crate::repo::user_repo::UserRepository;
use crate::validation::{validate_task, ValidationError};
use log::info;

/// One user together with the tasks assigned to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserTasks {
    pub user: User,
    pub tasks: Vec<Task>,
}

/// Task service facade over task and user repositories.
pub struct TaskService<'c, T: TaskRepository, U: UserRepository> {
    tasks: T,
    users: U,
    clock: &'c dyn Clock,
}

impl<'c, T: TaskRepository, U: UserRepository> TaskService<'c, T, U> {
    pub fn new(tasks: T, users: U, clock: &'c dyn Clock) -> Self {
        Self {
            tasks,
            users,
            clock,
        }
    }

    pub fn list_all(&self) -> ServiceResult<Vec<Task>> {
        Ok(self.tasks.list_tasks(&TaskQuery::default())?)
    }

    /// Absent tasks are `Ok(None)`, not an error.
    pub fn get_by_id(&self, id: TaskId) -> ServiceResult<Option<Task>> {
        Ok(self.tasks.get_task(id)?)
    }

    /// Tasks assigned to `user_id`; empty when the user does not exist.
    pub fn list_by_assignee(&self, user_id: UserId) -> ServiceResult<Vec<Task>> {
        match self.users.get_user(user_id)? {
            Some(user) => Ok(self.tasks.list_tasks(&TaskQuery::assignee(user.id))?),
            None => Ok(Vec::new()),
        }
    }

    /// Tasks created by `user_id`; empty when the user does not exist.
    pub fn list_by_creator(&self, user_id: UserId) -> ServiceResult<Vec<Task>> {
        match self.users.get_user(user_id)? {
            Some(user) => Ok(self.tasks.list_tasks(&TaskQuery::creator(user.id))?),
            None => Ok(Vec::new()),
        }
    }

    /// Tasks whose tags text contains `tag`.
    pub fn list_by_tag(&self, tag: &str) -> ServiceResult<Vec<Task>> {
        Ok(self.tasks.list_tasks(&TaskQuery::tag(tag))?)
    }

    pub fn list_by_status(&self, status: TaskStatus) -> ServiceResult<Vec<Task>> {
        let query = TaskQuery {
            status: Some(status),
            ..TaskQuery::default()
        };
        Ok(self.tasks.list_tasks(&query)?)
    }

    pub fn list_by_priority(&self, priority: Priority) -> ServiceResult<Vec<Task>> {
        let query = TaskQuery {
            priority: Some(priority),
            ..TaskQuery::default()
        };
        Ok(self.tasks.list_tasks(&query)?)
    }

    /// Every user with their assigned tasks, in user listing order.
    pub fn list_grouped_by_assignee(&self) -> ServiceResult<Vec<UserTasks>> {
        let users = self.users.list_users()?;
        let mut groups = Vec::with_capacity(users.len());
        for user in users {
            let tasks = self.tasks.list_tasks(&TaskQuery::assignee(user.id))?;
            groups.push(UserTasks { user, tasks });
        }
        Ok(groups)
    }

    /// Validates and persists a new task with both timestamps at "now".
    pub fn create(&self, draft: &TaskDraft) -> ServiceResult<Task> {
        let fields = validate_task(draft, self.clock.today())
            .map_err(|err| rejected("task_create", err))?;
        self.ensure_user_exists(fields.creator_id, ValidationError::CreatorNotFound)?;
        self.ensure_user_exists(fields.assignee_id, ValidationError::AssigneeNotFound)?;

        let task = self.tasks.insert_task(&fields, self.clock.now())?;
        info!(
            "event=task_create module=service status=ok task_id={} priority={} status_label={}",
            task.id,
            task.priority.get(),
            task.status
        );
        Ok(task)
    }

    /// Merges `patch` onto the stored task, revalidates and persists.
    pub fn update(&self, id: TaskId, patch: TaskDraft) -> ServiceResult<Task> {
        let mut task = self
            .tasks
            .get_task(id)?
            .ok_or(ServiceError::TaskNotFound(id))?;

        let new_creator = patch.creator_id.filter(|user_id| *user_id != task.creator_id);
        let new_assignee = patch
            .assignee_id
            .filter(|user_id| *user_id != task.assignee_id);

        let mut merged = TaskDraft::from(&task);
        merged.merge(patch);
        let fields = validate_task(&merged, self.clock.today())
            .map_err(|err| rejected("task_update", err))?;

        if let Some(user_id) = new_creator {
            self.ensure_user_exists(user_id, ValidationError::CreatorNotFound)?;
        }
        if let Some(user_id) = new_assignee {
            self.ensure_user_exists(user_id, ValidationError::AssigneeNotFound)?;
        }

        task.replace_fields(fields);
        task.touch(self.clock.now());
        self.tasks.update_task(&task)?;
        info!("event=task_update module=service status=ok task_id={id}");
        Ok(task)
    }

    /// Sets status only; other fields are not revalidated.
    pub fn update_status(&self, id: TaskId, status: TaskStatus) -> ServiceResult<Task> {
        let mut task = self
            .tasks
            .get_task(id)?
            .ok_or(ServiceError::TaskNotFound(id))?;

        task.status = status;
        task.touch(self.clock.now());
        self.tasks.update_task(&task)?;
        info!("event=task_update_status module=service status=ok task_id={id} status_label={status}");
        Ok(task)
    }

    pub fn delete(&self, id: TaskId) -> ServiceResult<()> {
        if self.tasks.get_task(id)?.is_none() {
            return Err(ServiceError::TaskNotFound(id));
        }
        self.tasks.delete_task(id)?;
        info!("event=task_delete module=service status=ok task_id={id}");
        Ok(())
    }

    fn ensure_user_exists(
        &self,
        user_id: UserId,
        missing: fn(UserId) -> ValidationError,
    ) -> ServiceResult<()> {
        if self.users.get_user(user_id)?.is_none() {
            return Err(rejected("task_reference", missing(user_id)));
        }
        Ok(())
    }
}
