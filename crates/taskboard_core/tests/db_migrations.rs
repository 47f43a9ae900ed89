use rusqlite::{Connection, TransactionBehavior};
use taskboard_core::db::migrations::latest_version;
use taskboard_core::db::{open_db, open_db_in_memory, with_transaction, DbError};
use taskboard_core::{RepoError, SqliteTaskRepository, SqliteUserRepository, UserFields, UserRepository};
use chrono::NaiveDate;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "users");
    assert_table_exists(&conn, "tasks");
}

#[test]
fn open_db_enables_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("taskboard.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "tasks");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repositories_reject_unmigrated_connections() {
    let conn = Connection::open_in_memory().unwrap();

    let user_err = SqliteUserRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        user_err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
    assert!(SqliteTaskRepository::try_new(&conn).is_err());
}

#[test]
fn failed_unit_of_work_rolls_back() {
    let mut conn = open_db_in_memory().unwrap();
    let fields = UserFields {
        first_name: "Ana".to_string(),
        last_name: "Lima".to_string(),
        birth_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
    };

    let result: Result<(), RepoError> =
        with_transaction(&mut conn, TransactionBehavior::Immediate, |tx| {
            let repo = SqliteUserRepository::try_new(tx)?;
            repo.insert_user(&fields)?;
            Err(RepoError::InvalidData("abort".to_string()))
        });
    assert!(result.is_err());

    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    assert!(repo.list_users().unwrap().is_empty());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
