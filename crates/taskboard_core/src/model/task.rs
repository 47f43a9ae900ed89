//! Task domain model.
//!
//! # Responsibility
//! - Define the persisted task record, its status and priority types.
//! - Define the candidate shape used for both creation and partial updates.
//! - Own the partial-merge rule applied by task updates.
//!
//! # Invariants
//! - `creation_time` is set once; `update_time` strictly increases on every
//!   mutation.
//! - `creator_id` and `assignee_id` are always present on a persisted task.

use crate::model::user::UserId;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable task identifier.
pub type TaskId = Uuid;

/// Task lifecycle label.
///
/// Closed set; unknown labels are rejected at every write path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
    Cancelled,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::Cancelled,
    ];

    /// Wire and storage label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status label outside the known set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTaskStatus(pub String);

impl Display for UnknownTaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown task status `{}`", self.0)
    }
}

impl Error for UnknownTaskStatus {}

impl FromStr for TaskStatus {
    type Err = UnknownTaskStatus;

    /// Trims and matches case-insensitively.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownTaskStatus(trimmed.to_string()))
    }
}

/// Task priority, `1..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Priority(u8);

impl Priority {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 3;

    pub fn new(value: i64) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            u8::try_from(value).ok().map(Self)
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Priority {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("priority {value} is outside 1..=3"))
    }
}

impl From<Priority> for i64 {
    fn from(value: Priority) -> Self {
        i64::from(value.0)
    }
}

/// Persisted task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub end_date: NaiveDate,
    pub creator_id: UserId,
    pub assignee_id: UserId,
    pub tags: Option<String>,
    pub priority: Priority,
    pub status: TaskStatus,
    pub creation_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl Task {
    /// Builds a fresh record with both timestamps set to `now`.
    pub fn from_fields(id: TaskId, fields: TaskFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: fields.title,
            description: fields.description,
            end_date: fields.end_date,
            creator_id: fields.creator_id,
            assignee_id: fields.assignee_id,
            tags: fields.tags,
            priority: fields.priority,
            status: fields.status,
            creation_time: now,
            update_time: now,
        }
    }

    /// Overwrites every mutable field with validated values.
    pub fn replace_fields(&mut self, fields: TaskFields) {
        self.title = fields.title;
        self.description = fields.description;
        self.end_date = fields.end_date;
        self.creator_id = fields.creator_id;
        self.assignee_id = fields.assignee_id;
        self.tags = fields.tags;
        self.priority = fields.priority;
        self.status = fields.status;
    }

    /// Refreshes `update_time`, keeping it strictly increasing.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        let floor = self.update_time + Duration::milliseconds(1);
        self.update_time = if now > self.update_time { now } else { floor };
    }
}

/// Unvalidated task candidate.
///
/// Used as the creation payload and as the patch for partial updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub end_date: Option<NaiveDate>,
    pub creator_id: Option<UserId>,
    pub assignee_id: Option<UserId>,
    pub tags: Option<String>,
    pub priority: Option<i64>,
    pub status: Option<String>,
}

impl TaskDraft {
    /// Applies a patch: supplied fields win, omitted ones keep prior values.
    ///
    /// `title` and `status` are only taken when non-blank after trimming.
    pub fn merge(&mut self, patch: TaskDraft) {
        if let Some(title) = patch.title.filter(|value| !value.trim().is_empty()) {
            self.title = Some(title);
        }
        if patch.description.is_some() {
            self.description = patch.description;
        }
        if patch.end_date.is_some() {
            self.end_date = patch.end_date;
        }
        if patch.tags.is_some() {
            self.tags = patch.tags;
        }
        if patch.priority.is_some() {
            self.priority = patch.priority;
        }
        if let Some(status) = patch.status.filter(|value| !value.trim().is_empty()) {
            self.status = Some(status);
        }
        if patch.assignee_id.is_some() {
            self.assignee_id = patch.assignee_id;
        }
        if patch.creator_id.is_some() {
            self.creator_id = patch.creator_id;
        }
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        Self {
            title: Some(task.title.clone()),
            description: task.description.clone(),
            end_date: Some(task.end_date),
            creator_id: Some(task.creator_id),
            assignee_id: Some(task.assignee_id),
            tags: task.tags.clone(),
            priority: Some(i64::from(task.priority)),
            status: Some(task.status.as_str().to_string()),
        }
    }
}

/// Task fields that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFields {
    pub title: String,
    pub description: Option<String>,
    pub end_date: NaiveDate,
    pub creator_id: UserId,
    pub assignee_id: UserId,
    pub tags: Option<String>,
    pub priority: Priority,
    pub status: TaskStatus,
}

#[cfg(test)]
mod tests {
    use super::{Priority, Task, TaskDraft, TaskFields, TaskStatus};
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    #[test]
    fn status_parses_case_insensitively_after_trim() {
        assert_eq!(" done ".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert_eq!(
            "in_progress".parse::<TaskStatus>().unwrap(),
            TaskStatus::InProgress
        );
        assert!("BLOCKED".parse::<TaskStatus>().is_err());
        assert!("".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn priority_accepts_only_one_to_three() {
        assert!(Priority::new(0).is_none());
        assert_eq!(Priority::new(2).map(Priority::get), Some(2));
        assert!(Priority::new(4).is_none());
    }

    #[test]
    fn merge_keeps_prior_values_for_omitted_and_blank_fields() {
        let mut base = TaskDraft {
            title: Some("Draft roadmap".to_string()),
            description: Some("first".to_string()),
            end_date: NaiveDate::from_ymd_opt(2030, 1, 1),
            priority: Some(2),
            status: Some("TODO".to_string()),
            ..TaskDraft::default()
        };

        base.merge(TaskDraft {
            title: Some("   ".to_string()),
            description: Some(String::new()),
            status: Some("DONE".to_string()),
            ..TaskDraft::default()
        });

        assert_eq!(base.title.as_deref(), Some("Draft roadmap"));
        assert_eq!(base.description.as_deref(), Some(""));
        assert_eq!(base.priority, Some(2));
        assert_eq!(base.status.as_deref(), Some("DONE"));
    }

    #[test]
    fn task_serializes_with_camel_case_fields() {
        let user = Uuid::new_v4();
        let task = Task::from_fields(
            Uuid::new_v4(),
            TaskFields {
                title: "Draft roadmap".to_string(),
                description: None,
                end_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
                creator_id: user,
                assignee_id: user,
                tags: Some("planning".to_string()),
                priority: Priority::new(3).unwrap(),
                status: TaskStatus::InProgress,
            },
            Utc.with_ymd_and_hms(2029, 12, 1, 8, 0, 0).unwrap(),
        );

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["endDate"], "2030-01-01");
        assert_eq!(value["creatorId"], user.to_string());
        assert_eq!(value["priority"], 3);
        assert_eq!(value["status"], "IN_PROGRESS");
        assert!(value["description"].is_null());
        assert_eq!(value["creationTime"], value["updateTime"]);

        let back: Task = serde_json::from_value(value).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn draft_keeps_raw_priority_and_rejects_non_numeric() {
        let draft: TaskDraft =
            serde_json::from_str(r#"{"title":"x","priority":7,"status":"TODO"}"#).unwrap();
        assert_eq!(draft.priority, Some(7));
        assert!(serde_json::from_str::<TaskDraft>(r#"{"priority":"high"}"#).is_err());
    }
}
