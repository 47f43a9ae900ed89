//! Shared handler state and the bridge from async handlers to SQLite.
//!
//! # Responsibility
//! - Own the single connection and the clock handed to every service.
//! - Run service work on the blocking pool so the runtime never waits on disk.
//!
//! # Invariants
//! - Every write request runs inside one IMMEDIATE transaction.
//! - Requests are serialized on the connection mutex.

use crate::error::ApiErrorResponse;
use log::error;
use rusqlite::{Connection, TransactionBehavior};
use std::sync::{Arc, Mutex, MutexGuard};
use taskboard_core::{
    with_transaction, Clock, ServiceError, ServiceResult, SqliteTaskRepository,
    SqliteUserRepository, TaskService, UserService,
};

pub type SqliteTaskService<'a> =
    TaskService<'a, SqliteTaskRepository<'a>, SqliteUserRepository<'a>>;
pub type SqliteUserService<'a> = UserService<'a, SqliteUserRepository<'a>>;

#[derive(Clone)]
pub struct AppState {
    conn: Arc<Mutex<Connection>>,
    clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(conn: Connection, clock: Arc<dyn Clock>) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            clock,
        }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Runs read-only service work against the connection.
    pub async fn read<T, F>(&self, work: F) -> Result<T, ApiErrorResponse>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &dyn Clock) -> ServiceResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let clock = Arc::clone(&self.clock);
        run_blocking(move || {
            let guard = lock_connection(&conn);
            work(&guard, clock.as_ref())
        })
        .await
    }

    /// Runs service work in one transaction; any error rolls everything back.
    pub async fn write<T, F>(&self, work: F) -> Result<T, ApiErrorResponse>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &dyn Clock) -> ServiceResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let clock = Arc::clone(&self.clock);
        run_blocking(move || {
            let mut guard = lock_connection(&conn);
            with_transaction(&mut guard, TransactionBehavior::Immediate, |tx| {
                work(tx, clock.as_ref())
            })
        })
        .await
    }
}

pub fn task_service<'a>(
    conn: &'a Connection,
    clock: &'a dyn Clock,
) -> ServiceResult<SqliteTaskService<'a>> {
    Ok(TaskService::new(
        SqliteTaskRepository::try_new(conn)?,
        SqliteUserRepository::try_new(conn)?,
        clock,
    ))
}

pub fn user_service<'a>(
    conn: &'a Connection,
    clock: &'a dyn Clock,
) -> ServiceResult<SqliteUserService<'a>> {
    Ok(UserService::new(SqliteUserRepository::try_new(conn)?, clock))
}

// A panicked request leaves no open transaction behind: dropping it rolls back.
fn lock_connection(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn run_blocking<T, F>(job: F) -> Result<T, ApiErrorResponse>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
{
    match tokio::task::spawn_blocking(job).await {
        Ok(result) => result.map_err(ApiErrorResponse::from),
        Err(join_err) => {
            error!("event=blocking_task module=http status=error error={join_err}");
            Err(ApiErrorResponse::internal_error())
        }
    }
}
