use chrono::{NaiveDate, TimeZone, Utc};
use rusqlite::Connection;
use taskboard_core::db::open_db_in_memory;
use taskboard_core::{
    FixedClock, RepoError, ServiceError, SqliteUserRepository, UserDraft, UserFields,
    UserRepository, UserService, ValidationError,
};
use uuid::Uuid;

fn setup() -> (Connection, FixedClock) {
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2030, 6, 15, 12, 0, 0).unwrap());
    (open_db_in_memory().unwrap(), clock)
}

fn service<'a>(
    conn: &'a Connection,
    clock: &'a FixedClock,
) -> UserService<'a, SqliteUserRepository<'a>> {
    UserService::new(SqliteUserRepository::try_new(conn).unwrap(), clock)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn create_and_get_roundtrip() {
    let (conn, clock) = setup();
    let users = service(&conn, &clock);

    let created = users
        .create(&UserDraft::new("Ana", "Lima", date(2005, 6, 15)))
        .unwrap();
    assert!(!created.id.is_nil());

    let loaded = users.get_by_id(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.age(date(2030, 1, 1)), 25);
}

#[test]
fn get_unknown_user_is_absent_not_error() {
    let (conn, clock) = setup();
    assert!(service(&conn, &clock)
        .get_by_id(Uuid::new_v4())
        .unwrap()
        .is_none());
}

#[test]
fn create_rejects_invalid_candidate() {
    let (conn, clock) = setup();
    let err = service(&conn, &clock)
        .create(&UserDraft::new("Ana", "Lima", date(2020, 1, 1)))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::UserTooYoung)
    ));
}

#[test]
fn duplicate_person_is_rejected_case_insensitively() {
    let (conn, clock) = setup();
    let users = service(&conn, &clock);

    users
        .create(&UserDraft::new("Ana", "Lima", date(1990, 3, 1)))
        .unwrap();

    let err = users
        .create(&UserDraft::new("ANA", "lima", date(1990, 3, 1)))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::DuplicateUser)
    ));

    users
        .create(&UserDraft::new("Ana", "Lima", date(1990, 3, 2)))
        .unwrap();
    assert_eq!(users.list_all().unwrap().len(), 2);
}

#[test]
fn storage_unique_index_rejects_duplicates_without_lookup() {
    let (conn, _clock) = setup();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    let fields = UserFields {
        first_name: "Maria".to_string(),
        last_name: "Santos".to_string(),
        birth_date: date(1985, 5, 20),
    };

    repo.insert_user(&fields).unwrap();
    let err = repo
        .insert_user(&UserFields {
            first_name: "maria".to_string(),
            ..fields
        })
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateIdentity));
}

#[test]
fn update_replaces_all_fields_and_revalidates() {
    let (conn, clock) = setup();
    let users = service(&conn, &clock);
    let created = users
        .create(&UserDraft::new("Ana", "Lima", date(2000, 1, 1)))
        .unwrap();

    let updated = users
        .update(created.id, &UserDraft::new("Ana Maria", "Souza", date(1999, 2, 2)))
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.first_name, "Ana Maria");
    assert_eq!(updated.last_name, "Souza");
    assert_eq!(updated.birth_date, date(1999, 2, 2));

    let partial = UserDraft {
        first_name: Some("Ana".to_string()),
        ..UserDraft::default()
    };
    let err = users.update(created.id, &partial).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::LastNameInvalid)
    ));

    let stored = users.get_by_id(created.id).unwrap().unwrap();
    assert_eq!(stored, updated);
}

#[test]
fn update_into_another_users_identity_is_rejected_by_storage() {
    let (conn, clock) = setup();
    let users = service(&conn, &clock);
    users
        .create(&UserDraft::new("João", "Silva", date(1990, 1, 15)))
        .unwrap();
    let other = users
        .create(&UserDraft::new("Maria", "Santos", date(1985, 5, 20)))
        .unwrap();

    let err = users
        .update(other.id, &UserDraft::new("joão", "SILVA", date(1990, 1, 15)))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::DuplicateUser)
    ));
}

#[test]
fn update_and_delete_unknown_user_fail_with_not_found() {
    let (conn, clock) = setup();
    let users = service(&conn, &clock);
    let missing = Uuid::new_v4();

    let update_err = users
        .update(missing, &UserDraft::new("Ana", "Lima", date(2000, 1, 1)))
        .unwrap_err();
    assert!(matches!(update_err, ServiceError::UserNotFound(id) if id == missing));

    let delete_err = users.delete(missing).unwrap_err();
    assert!(matches!(delete_err, ServiceError::UserNotFound(id) if id == missing));
}

#[test]
fn delete_removes_user() {
    let (conn, clock) = setup();
    let users = service(&conn, &clock);
    let created = users
        .create(&UserDraft::new("Ana", "Lima", date(2000, 1, 1)))
        .unwrap();

    users.delete(created.id).unwrap();
    assert!(users.get_by_id(created.id).unwrap().is_none());
}
