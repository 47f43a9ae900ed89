use chrono::{NaiveDate, TimeZone, Utc};
use rusqlite::Connection;
use taskboard_core::db::open_db_in_memory;
use taskboard_core::{
    Priority, RepoError, SqliteTaskRepository, SqliteUserRepository, TaskFields, TaskQuery,
    TaskRepository, TaskStatus, User, UserFields, UserRepository,
};
use uuid::Uuid;

fn insert_user(conn: &Connection) -> User {
    SqliteUserRepository::try_new(conn)
        .unwrap()
        .insert_user(&UserFields {
            first_name: "Ana".to_string(),
            last_name: "Lima".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        })
        .unwrap()
}

fn fields(user: &User) -> TaskFields {
    TaskFields {
        title: "Draft roadmap".to_string(),
        description: Some("details".to_string()),
        end_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        creator_id: user.id,
        assignee_id: user.id,
        tags: Some("docs".to_string()),
        priority: Priority::new(1).unwrap(),
        status: TaskStatus::Todo,
    }
}

#[test]
fn insert_assigns_id_and_roundtrips_all_columns() {
    let conn = open_db_in_memory().unwrap();
    let user = insert_user(&conn);
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let now = Utc.with_ymd_and_hms(2029, 12, 1, 8, 30, 0).unwrap();

    let task = repo.insert_task(&fields(&user), now).unwrap();
    assert!(!task.id.is_nil());

    let loaded = repo.get_task(task.id).unwrap().unwrap();
    assert_eq!(loaded, task);
    assert_eq!(loaded.creation_time, now);
}

#[test]
fn update_and_delete_unknown_task_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let user = insert_user(&conn);
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let mut task = repo.insert_task(&fields(&user), Utc::now()).unwrap();

    repo.delete_task(task.id).unwrap();
    assert!(matches!(repo.update_task(&task).unwrap_err(), RepoError::NotFound(id) if id == task.id));
    task.id = Uuid::new_v4();
    assert!(matches!(repo.delete_task(task.id).unwrap_err(), RepoError::NotFound(_)));
}

#[test]
fn insert_with_unknown_user_fails_in_storage() {
    let conn = open_db_in_memory().unwrap();
    let user = insert_user(&conn);
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let orphan = TaskFields {
        assignee_id: Uuid::new_v4(),
        ..fields(&user)
    };
    assert!(matches!(repo.insert_task(&orphan, Utc::now()).unwrap_err(), RepoError::Db(_)));
}

#[test]
fn query_predicates_combine_with_and() {
    let conn = open_db_in_memory().unwrap();
    let user = insert_user(&conn);
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    repo.insert_task(&fields(&user), Utc::now()).unwrap();
    let done = repo
        .insert_task(
            &TaskFields {
                status: TaskStatus::Done,
                ..fields(&user)
            },
            Utc::now(),
        )
        .unwrap();

    let query = TaskQuery {
        assignee_id: Some(user.id),
        tag_contains: Some("doc".to_string()),
        status: Some(TaskStatus::Done),
        ..TaskQuery::default()
    };
    let matched = repo.list_tasks(&query).unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].id, done.id);
    assert_eq!(repo.list_tasks(&TaskQuery::default()).unwrap().len(), 2);
}

#[test]
fn corrupted_status_is_reported_not_masked() {
    let conn = open_db_in_memory().unwrap();
    let user = insert_user(&conn);
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let task = repo.insert_task(&fields(&user), Utc::now()).unwrap();

    conn.execute(
        "UPDATE tasks SET status = 'WHATEVER' WHERE uuid = ?1;",
        [task.id.to_string()],
    )
    .unwrap();

    let err = repo.get_task(task.id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("WHATEVER")));
}
