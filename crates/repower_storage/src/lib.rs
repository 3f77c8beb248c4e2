//! # Repower Storage
//!
//! Parameterized query execution against the EAV store.
//!
//! This crate is the lowest layer of the data-access stack. A
//! [`Connection`] executes a query template with positional parameters and
//! returns named-column [`Row`]s. It knows nothing about records, field-name
//! maps or projects; those live in `repower_core`.
//!
//! ## Design Principles
//!
//! - Every bound parameter carries an explicit type tag ([`BindParam`]);
//!   nothing is inferred from the shape of a value
//! - A failed prepare is an error, never an empty result set
//! - No implicit commits: transaction boundaries belong to the caller
//!
//! ## Available Connections
//!
//! - [`SqliteConnection`] - rusqlite, used for tests and embedded copies
//! - `MySqlConnection` - the production REDCap database (feature `mysql`)
//!
//! ## Example
//!
//! ```rust
//! use repower_storage::{BindParam, Connection, SqliteConnection};
//!
//! let conn = SqliteConnection::open_in_memory().unwrap();
//! conn.raw()
//!     .execute_batch("CREATE TABLE t (name TEXT); INSERT INTO t VALUES ('a');")
//!     .unwrap();
//! let rows = conn
//!     .execute("SELECT name FROM t WHERE name = ?", &[BindParam::text("a")])
//!     .unwrap();
//! assert_eq!(rows[0].text("name").unwrap(), "a");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod error;
#[cfg(feature = "mysql")]
mod mysql;
mod param;
mod row;
mod sqlite;

pub use connection::Connection;
pub use error::{StorageError, StorageResult};
#[cfg(feature = "mysql")]
pub use crate::mysql::MySqlConnection;
pub use param::BindParam;
pub use row::{Row, Value};
pub use sqlite::SqliteConnection;
