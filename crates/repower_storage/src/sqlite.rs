//! SQLite connection backed by rusqlite.

use crate::connection::Connection;
use crate::error::{StorageError, StorageResult};
use crate::param::BindParam;
use crate::row::{Row, Value};
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use std::path::Path;
use tracing::debug;

/// A [`Connection`] over a SQLite database.
///
/// Suitable for:
/// - Unit and integration tests (`open_in_memory`)
/// - Local extracts of a REDCap project's `redcap_data` table
///
/// The schema is owned by whoever created the database; this type never
/// creates or migrates tables. Use [`SqliteConnection::raw`] for setup.
///
/// # Example
///
/// ```rust
/// use repower_storage::{Connection, SqliteConnection};
///
/// let conn = SqliteConnection::open_in_memory().unwrap();
/// conn.begin().unwrap();
/// conn.rollback().unwrap();
/// ```
#[derive(Debug)]
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    /// Opens (or creates) a database file.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let conn = rusqlite::Connection::open(path.as_ref())
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if SQLite cannot allocate it.
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = rusqlite::Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Wraps an existing rusqlite connection.
    #[must_use]
    pub fn from_connection(conn: rusqlite::Connection) -> Self {
        Self { conn }
    }

    /// Returns the underlying rusqlite connection.
    #[must_use]
    pub fn raw(&self) -> &rusqlite::Connection {
        &self.conn
    }

    /// Consumes the wrapper and returns the rusqlite connection.
    #[must_use]
    pub fn into_inner(self) -> rusqlite::Connection {
        self.conn
    }

    fn run_primitive(&self, operation: &'static str, sql: &str) -> StorageResult<()> {
        debug!(operation, "sqlite transaction primitive");
        self.conn
            .execute_batch(sql)
            .map_err(|e| StorageError::transaction(operation, e))
    }
}

impl Connection for SqliteConnection {
    fn execute(&self, query: &str, params: &[BindParam]) -> StorageResult<Vec<Row>> {
        debug!(
            query,
            types = %BindParam::type_tags(params),
            "executing sqlite query"
        );

        let mut stmt = self
            .conn
            .prepare(query)
            .map_err(|e| StorageError::prepare(query, e))?;

        let names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_owned)
            .collect();

        let mut rows = stmt
            .query(rusqlite::params_from_iter(params.iter()))
            .map_err(|e| StorageError::execute(query, e))?;

        let mut results = Vec::new();
        while let Some(raw) = rows.next().map_err(|e| StorageError::execute(query, e))? {
            let mut row = Row::new();
            for (index, name) in names.iter().enumerate() {
                let value = raw
                    .get_ref(index)
                    .map_err(|e| StorageError::execute(query, e))?;
                row.push(name.clone(), from_value_ref(value));
            }
            results.push(row);
        }

        Ok(results)
    }

    fn begin(&self) -> StorageResult<()> {
        self.run_primitive("begin", "BEGIN")
    }

    fn commit(&self) -> StorageResult<()> {
        self.run_primitive("commit", "COMMIT")
    }

    fn rollback(&self) -> StorageResult<()> {
        self.run_primitive("rollback", "ROLLBACK")
    }
}

impl ToSql for BindParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            BindParam::Int(v) => ToSqlOutput::from(*v),
            BindParam::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
            BindParam::Float(v) => ToSqlOutput::from(*v),
        })
    }
}

fn from_value_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
