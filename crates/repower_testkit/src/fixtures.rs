//! Test fixtures and database helpers.
//!
//! Provides sqlite connections holding a `redcap_data` table shaped like
//! REDCap's, optionally seeded with tuples.

use repower_core::EavTuple;
use repower_storage::SqliteConnection;
use std::path::PathBuf;
use tempfile::TempDir;

/// Schema of the `redcap_data` table as the tests use it.
pub const REDCAP_DATA_SCHEMA: &str = "CREATE TABLE redcap_data (
    project_id INTEGER NOT NULL,
    event_id INTEGER,
    record TEXT NOT NULL,
    field_name TEXT NOT NULL,
    value TEXT,
    instance INTEGER
);";

const INSERT_TUPLE: &str = "INSERT INTO redcap_data \
     (project_id, event_id, record, field_name, value) VALUES (?1, ?2, ?3, ?4, ?5)";

/// Opens an in-memory connection with an empty `redcap_data` table.
pub fn memory_connection() -> SqliteConnection {
    let conn = SqliteConnection::open_in_memory().expect("Failed to open in-memory database");
    conn.raw()
        .execute_batch(REDCAP_DATA_SCHEMA)
        .expect("Failed to create redcap_data");
    conn
}

/// Opens an in-memory connection seeded with `tuples`.
///
/// Event names are stored as the tuple's event id when they parse as an
/// integer, and dropped otherwise.
pub fn seeded_connection(tuples: &[EavTuple]) -> SqliteConnection {
    let conn = memory_connection();
    insert_tuples(&conn, tuples);
    conn
}

/// Inserts `tuples` into `redcap_data`.
pub fn insert_tuples(conn: &SqliteConnection, tuples: &[EavTuple]) {
    let mut stmt = conn
        .raw()
        .prepare(INSERT_TUPLE)
        .expect("Failed to prepare insert");
    for t in tuples {
        let event_id = t.event_name.as_deref().and_then(|e| e.parse::<i64>().ok());
        stmt.execute(rusqlite::params![
            t.project_id.as_i64(),
            event_id,
            t.record_id,
            t.field_name,
            t.value
        ])
        .expect("Failed to insert tuple");
    }
}

/// A file-backed test database with automatic cleanup.
pub struct TestDatabase {
    /// The connection.
    pub conn: SqliteConnection,
    path: PathBuf,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Creates a file-backed database with an empty `redcap_data` table.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("redcap.sqlite");
        let conn = SqliteConnection::open(&path).expect("Failed to open file database");
        conn.raw()
            .execute_batch(REDCAP_DATA_SCHEMA)
            .expect("Failed to create redcap_data");
        Self {
            conn,
            path,
            _temp_dir: temp_dir,
        }
    }

    /// Creates a file-backed database seeded with `tuples`.
    pub fn seeded(tuples: &[EavTuple]) -> Self {
        let db = Self::file();
        insert_tuples(&db.conn, tuples);
        db
    }

    /// Returns the database file path.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Opens a second connection to the same file.
    pub fn reopen(&self) -> SqliteConnection {
        SqliteConnection::open(&self.path).expect("Failed to reopen file database")
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = SqliteConnection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use repower_core::ProjectId;

    /// Project used by the scenarios.
    pub const PROJECT: ProjectId = ProjectId::new(7);

    /// Three records of project 7 plus one of project 8 sharing a dob.
    ///
    /// Records `1` and `3` have dob `1990-01-01`; record `2` has
    /// `1985-06-15`. Project 8 record `9` also has `1990-01-01`.
    pub fn clinic_tuples() -> Vec<EavTuple> {
        let other = ProjectId::new(8);
        vec![
            EavTuple::new(PROJECT, "1", "dob", "1990-01-01"),
            EavTuple::new(PROJECT, "1", "site", "2"),
            EavTuple::new(PROJECT, "2", "dob", "1985-06-15"),
            EavTuple::new(PROJECT, "2", "site", "1"),
            EavTuple::new(PROJECT, "3", "dob", "1990-01-01"),
            EavTuple::new(PROJECT, "3", "site", "1"),
            EavTuple::new(other, "9", "dob", "1990-01-01"),
        ]
    }

    /// In-memory connection seeded with [`clinic_tuples`].
    pub fn clinic() -> SqliteConnection {
        seeded_connection(&clinic_tuples())
    }
}
