//! User repository contract and SQLite implementation.
//!
//! # Invariants
//! - `identity_key` is recomputed from the record on every write.
//! - Listing order is insertion order.

use super::{
    date_to_db, ensure_connection_ready, is_unique_violation, parse_date, parse_uuid, RepoError,
    RepoResult,
};
use crate::model::user::{User, UserFields, UserId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT
    uuid,
    first_name,
    last_name,
    birth_date
FROM users";

/// Repository interface for user storage.
pub trait UserRepository {
    /// Persists validated fields under a newly generated id.
    fn insert_user(&self, fields: &UserFields) -> RepoResult<User>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn list_users(&self) -> RepoResult<Vec<User>>;
    /// Looks up the user owning `identity_key`, if any.
    fn find_by_identity(&self, identity_key: &str) -> RepoResult<Option<User>>;
    /// Saves all mutable fields of an existing user.
    fn update_user(&self, user: &User) -> RepoResult<()>;
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Creates repository from a migrated connection or transaction.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["users"])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn insert_user(&self, fields: &UserFields) -> RepoResult<User> {
        let user = User::from_fields(Uuid::new_v4(), fields.clone());
        self.conn
            .execute(
                "INSERT INTO users (
                    uuid,
                    first_name,
                    last_name,
                    birth_date,
                    identity_key
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    user.id.to_string(),
                    user.first_name.as_str(),
                    user.last_name.as_str(),
                    date_to_db(user.birth_date),
                    user.identity_key(),
                ],
            )
            .map_err(map_identity_conflict)?;
        Ok(user)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn find_by_identity(&self, identity_key: &str) -> RepoResult<Option<User>> {
        let uuid_text: Option<String> = self
            .conn
            .query_row(
                "SELECT uuid FROM users WHERE identity_key = ?1;",
                [identity_key],
                |row| row.get(0),
            )
            .optional()?;
        match uuid_text {
            Some(text) => self.get_user(parse_uuid(&text, "users.uuid")?),
            None => Ok(None),
        }
    }

    fn update_user(&self, user: &User) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE users
                 SET
                    first_name = ?1,
                    last_name = ?2,
                    birth_date = ?3,
                    identity_key = ?4
                 WHERE uuid = ?5;",
                params![
                    user.first_name.as_str(),
                    user.last_name.as_str(),
                    date_to_db(user.birth_date),
                    user.identity_key(),
                    user.id.to_string(),
                ],
            )
            .map_err(map_identity_conflict)?;

        if changed == 0 {
            return Err(RepoError::NotFound(user.id));
        }
        Ok(())
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM users WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn map_identity_conflict(err: rusqlite::Error) -> RepoError {
    if is_unique_violation(&err) {
        RepoError::DuplicateIdentity
    } else {
        err.into()
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let uuid_text: String = row.get("uuid")?;
    let birth_text: String = row.get("birth_date")?;
    Ok(User {
        id: parse_uuid(&uuid_text, "users.uuid")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        birth_date: parse_date(&birth_text, "users.birth_date")?,
    })
}
