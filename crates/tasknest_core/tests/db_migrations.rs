use rusqlite::Connection;
use tasknest_core::db::migrations::{apply_migrations, latest_version};
use tasknest_core::db::{open_db, open_db_in_memory, DbError};

fn user_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn open_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();
    assert!(latest_version() >= 1);
    assert_eq!(user_version(&conn), latest_version());

    // Schema must be usable right away.
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM tasks;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn apply_migrations_is_idempotent() {
    let mut conn = open_db_in_memory().unwrap();
    apply_migrations(&mut conn).unwrap();
    assert_eq!(user_version(&conn), latest_version());
}

#[test]
fn newer_schema_version_is_rejected() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version() + 1))
        .unwrap();

    let err = apply_migrations(&mut conn).unwrap_err();
    assert!(matches!(err, DbError::UnsupportedSchemaVersion { .. }));
}

#[test]
fn file_backed_database_reopens_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasknest.sqlite3");

    {
        let conn = open_db(&path).unwrap();
        conn.execute(
            "INSERT INTO tasks (id, title) VALUES ('11111111-2222-4333-8444-555555555555', 'persisted');",
            [],
        )
        .unwrap();
    }

    let conn = open_db(&path).unwrap();
    assert_eq!(user_version(&conn), latest_version());
    let title: String = conn
        .query_row("SELECT title FROM tasks;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(title, "persisted");
}
