//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD plus the indexed lookups used by task queries.
//! - Keep timestamp encoding (epoch milliseconds) inside storage.
//!
//! # Invariants
//! - Creator and assignee columns are foreign keys to `users`.
//! - Listing order is insertion order.

use super::{
    date_to_db, ensure_connection_ready, parse_date, parse_millis, parse_uuid, RepoError,
    RepoResult,
};
use crate::clock::truncate_to_millis;
use crate::model::task::{Priority, Task, TaskFields, TaskId, TaskStatus};
use crate::model::user::UserId;
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    description,
    end_date,
    creator_uuid,
    assignee_uuid,
    tags,
    priority,
    status,
    created_at,
    updated_at
FROM tasks";

/// Predicates for listing tasks. Set fields are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub assignee_id: Option<UserId>,
    pub creator_id: Option<UserId>,
    /// Case-sensitive substring of the stored tags text.
    pub tag_contains: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
}

impl TaskQuery {
    pub fn assignee(user_id: UserId) -> Self {
        Self {
            assignee_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn creator(user_id: UserId) -> Self {
        Self {
            creator_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag_contains: Some(tag.into()),
            ..Self::default()
        }
    }
}

/// Repository interface for task storage.
pub trait TaskRepository {
    /// Persists validated fields under a new id with both timestamps at `now`.
    fn insert_task(&self, fields: &TaskFields, now: DateTime<Utc>) -> RepoResult<Task>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, query: &TaskQuery) -> RepoResult<Vec<Task>>;
    /// Saves every mutable field and `update_time`; `creation_time` is kept.
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Creates repository from a migrated connection or transaction.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["users", "tasks"])?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn insert_task(&self, fields: &TaskFields, now: DateTime<Utc>) -> RepoResult<Task> {
        let task = Task::from_fields(Uuid::new_v4(), fields.clone(), truncate_to_millis(now));
        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                title,
                description,
                end_date,
                creator_uuid,
                assignee_uuid,
                tags,
                priority,
                status,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                task.id.to_string(),
                task.title.as_str(),
                task.description.as_deref(),
                date_to_db(task.end_date),
                task.creator_id.to_string(),
                task.assignee_id.to_string(),
                task.tags.as_deref(),
                i64::from(task.priority),
                task.status.as_str(),
                task.creation_time.timestamp_millis(),
                task.update_time.timestamp_millis(),
            ],
        )?;
        Ok(task)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list_tasks(&self, query: &TaskQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(assignee_id) = query.assignee_id {
            sql.push_str(" AND assignee_uuid = ?");
            bind_values.push(Value::Text(assignee_id.to_string()));
        }
        if let Some(creator_id) = query.creator_id {
            sql.push_str(" AND creator_uuid = ?");
            bind_values.push(Value::Text(creator_id.to_string()));
        }
        if let Some(tag) = query.tag_contains.as_ref() {
            // instr() keeps the match case-sensitive and free of LIKE wildcards.
            sql.push_str(" AND tags IS NOT NULL AND instr(tags, ?) > 0");
            bind_values.push(Value::Text(tag.clone()));
        }
        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(priority) = query.priority {
            sql.push_str(" AND priority = ?");
            bind_values.push(Value::Integer(i64::from(priority)));
        }

        sql.push_str(" ORDER BY rowid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?1,
                description = ?2,
                end_date = ?3,
                creator_uuid = ?4,
                assignee_uuid = ?5,
                tags = ?6,
                priority = ?7,
                status = ?8,
                updated_at = ?9
             WHERE uuid = ?10;",
            params![
                task.title.as_str(),
                task.description.as_deref(),
                date_to_db(task.end_date),
                task.creator_id.to_string(),
                task.assignee_id.to_string(),
                task.tags.as_deref(),
                i64::from(task.priority),
                task.status.as_str(),
                task.update_time.timestamp_millis(),
                task.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(task.id));
        }
        Ok(())
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let end_date_text: String = row.get("end_date")?;
    let creator_text: String = row.get("creator_uuid")?;
    let assignee_text: String = row.get("assignee_uuid")?;

    let priority_value: i64 = row.get("priority")?;
    let priority = Priority::new(priority_value).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_value}` in tasks.priority"
        ))
    })?;

    let status_text: String = row.get("status")?;
    let status = status_text.parse::<TaskStatus>().map_err(|_| {
        RepoError::InvalidData(format!("invalid task status `{status_text}` in tasks.status"))
    })?;

    Ok(Task {
        id: parse_uuid(&uuid_text, "tasks.uuid")?,
        title: row.get("title")?,
        description: row.get("description")?,
        end_date: parse_date(&end_date_text, "tasks.end_date")?,
        creator_id: parse_uuid(&creator_text, "tasks.creator_uuid")?,
        assignee_id: parse_uuid(&assignee_text, "tasks.assignee_uuid")?,
        tags: row.get("tags")?,
        priority,
        status,
        creation_time: parse_millis(row.get("created_at")?, "tasks.created_at")?,
        update_time: parse_millis(row.get("updated_at")?, "tasks.updated_at")?,
    })
}
