//! Request and response bodies that differ from the domain types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use taskboard_core::{Task, User, UserId, UserTasks};

/// User as returned by the API, with age derived at response time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub age: i32,
}

impl UserResponse {
    pub fn from_user(user: User, today: NaiveDate) -> Self {
        let age = user.age(today);
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            birth_date: user.birth_date,
            age,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTasksResponse {
    pub user: UserResponse,
    pub tasks: Vec<Task>,
}

impl UserTasksResponse {
    pub fn from_group(group: UserTasks, today: NaiveDate) -> Self {
        Self {
            user: UserResponse::from_user(group.user, today),
            tasks: group.tasks,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StatusUpdateRequest {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedResponse {
    pub message: String,
    pub users: String,
    pub tasks: String,
}
