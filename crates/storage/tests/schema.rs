use ng_storage::{DB_FILE_NAME, SqliteStore, StoreError};
use rusqlite::Connection;

#[test]
fn storage_open_is_fail_closed_on_foreign_schema() {
    let dir = tempfile::tempdir().expect("temp dir must be creatable");
    let conn = Connection::open(dir.path().join(DB_FILE_NAME)).expect("legacy db must open");
    conn.execute("CREATE TABLE knex_migrations(id INTEGER PRIMARY KEY)", [])
        .expect("legacy table should be created");
    drop(conn);

    let err = SqliteStore::open(dir.path()).expect_err("foreign storage must be rejected");
    assert_eq!(err.code(), "RESET_REQUIRED");
    assert!(matches!(
        err,
        StoreError::InvalidInput(message) if message.starts_with("RESET_REQUIRED")
    ));
}

#[test]
fn storage_open_rejects_schema_version_mismatch() {
    let dir = tempfile::tempdir().expect("temp dir must be creatable");
    drop(SqliteStore::open(dir.path()).expect("fresh storage should open"));

    let conn = Connection::open(dir.path().join(DB_FILE_NAME)).expect("db must open");
    conn.execute("UPDATE store_state SET schema_version=99 WHERE singleton=1", [])
        .expect("state row should update");
    drop(conn);

    let err = SqliteStore::open(dir.path()).expect_err("mismatched version must be rejected");
    assert_eq!(err.code(), "RESET_REQUIRED");
}

#[test]
fn storage_reopens_its_own_schema() {
    let dir = tempfile::tempdir().expect("temp dir must be creatable");
    let store = SqliteStore::open(dir.path()).expect("fresh storage should open");
    assert_eq!(store.storage_dir(), dir.path());
    drop(store);

    SqliteStore::open(dir.path()).expect("existing storage should reopen");
}
