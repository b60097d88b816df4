use libris_core::db::migrations::latest_version;
use libris_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

const TABLES: [&str; 13] = [
    "users",
    "user_capabilities",
    "authors",
    "books",
    "libraries",
    "library_books",
    "librarians",
    "posts",
    "post_tags",
    "comments",
    "likes",
    "follows",
    "notifications",
];

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in TABLES {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn connections_enforce_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);

    let err = conn.execute(
        "INSERT INTO books (id, title, publication_year, author_id) VALUES ('b', 't', 2000, 'missing');",
        [],
    );
    assert!(err.is_err());
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("libris.sqlite3");

    let first = open_db(&path).unwrap();
    assert_eq!(schema_version(&first), latest_version());
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second), latest_version());
    assert_table_exists(&second, "likes");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
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

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "missing table `{table_name}`");
}

#[test]
fn created_at_keeps_millisecond_precision() {
    let conn = open_db_in_memory().unwrap();
    for name in ["a", "b", "c", "d", "e"] {
        conn.execute(
            "INSERT INTO authors (id, name) VALUES (?1, ?2);",
            [uuid::Uuid::new_v4().to_string(), name.to_string()],
        )
        .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(3));
    }

    let stamps: Vec<i64> = conn
        .prepare("SELECT created_at FROM authors ORDER BY rowid;")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    let now_ms = chrono::Utc::now().timestamp_millis();
    assert!(stamps.iter().all(|stamp| (now_ms - stamp).abs() < 60_000));
    assert!(stamps.windows(2).all(|pair| pair[0] < pair[1]));
}
