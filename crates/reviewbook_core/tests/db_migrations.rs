use reviewbook_core::db::migrations::latest_version;
use reviewbook_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::{params, Connection};

const UPSERT: &str = "INSERT INTO documents (name, body, updated_at)
     VALUES (?1, ?2, ?3)
     ON CONFLICT(name) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at;";

#[derive(Debug, PartialEq, Eq)]
struct Column {
    name: String,
    decl_type: String,
    not_null: bool,
    primary_key: bool,
}

fn documents_columns(conn: &Connection) -> Vec<Column> {
    let mut stmt = conn
        .prepare("PRAGMA table_info(documents);")
        .expect("table_info");
    stmt.query_map([], |row| {
        Ok(Column {
            name: row.get(1)?,
            decl_type: row.get(2)?,
            not_null: row.get::<_, i64>(3)? != 0,
            primary_key: row.get::<_, i64>(5)? != 0,
        })
    })
    .expect("query columns")
    .collect::<Result<_, _>>()
    .expect("read columns")
}

fn column(name: &str, decl_type: &str, primary_key: bool) -> Column {
    Column {
        name: name.to_string(),
        decl_type: decl_type.to_string(),
        not_null: true,
        primary_key,
    }
}

fn user_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .expect("user_version")
}

fn stored_body(conn: &Connection, name: &str) -> Option<(Vec<u8>, i64)> {
    conn.query_row(
        "SELECT body, updated_at FROM documents WHERE name = ?1;",
        [name],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .ok()
}

#[test]
fn fresh_database_gets_documents_table_keyed_by_name() {
    let conn = open_db_in_memory().expect("open in-memory db");

    assert_eq!(user_version(&conn), latest_version());
    assert_eq!(
        documents_columns(&conn),
        vec![
            column("name", "TEXT", true),
            column("body", "BLOB", false),
            column("updated_at", "INTEGER", false),
        ]
    );
}

#[test]
fn duplicate_document_name_is_rejected_without_upsert() {
    let conn = open_db_in_memory().expect("open in-memory db");
    conn.execute(
        "INSERT INTO documents (name, body, updated_at) VALUES ('restaurants', x'00', 1);",
        [],
    )
    .expect("first insert");

    let duplicate = conn.execute(
        "INSERT INTO documents (name, body, updated_at) VALUES ('restaurants', x'01', 2);",
        [],
    );
    assert!(duplicate.is_err());
}

#[test]
fn upserted_document_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("reviewbook.db");

    let conn = open_db(&path).expect("first open");
    conn.execute(UPSERT, params!["restaurants", b"first".to_vec(), 10])
        .expect("insert");
    conn.execute(UPSERT, params!["restaurants", b"second".to_vec(), 20])
        .expect("replace");
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM documents;", [], |row| row.get(0))
        .expect("count");
    assert_eq!(rows, 1);
    drop(conn);

    let reopened = open_db(&path).expect("second open");
    assert_eq!(user_version(&reopened), latest_version());
    assert_eq!(
        stored_body(&reopened, "restaurants"),
        Some((b"second".to_vec(), 20))
    );
    assert_eq!(stored_body(&reopened, "missing"), None);
}

#[test]
fn schema_from_newer_build_is_left_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("future.db");
    let future_version = latest_version() + 1;

    let conn = Connection::open(&path).expect("raw open");
    conn.execute_batch(&format!("PRAGMA user_version = {future_version};"))
        .expect("set version");
    drop(conn);

    match open_db(&path) {
        Err(DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        }) => {
            assert_eq!(db_version, future_version);
            assert_eq!(latest_supported, latest_version());
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("newer schema must be rejected"),
    }

    let raw = Connection::open(&path).expect("raw reopen");
    assert_eq!(user_version(&raw), future_version);
    let documents_tables: i64 = raw
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'documents';",
            [],
            |row| row.get(0),
        )
        .expect("sqlite_master");
    assert_eq!(documents_tables, 0);
}
