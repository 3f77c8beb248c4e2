//! Connection trait definition.

use crate::error::StorageResult;
use crate::param::BindParam;
use crate::row::Row;

/// A connection to the store holding the `redcap_data` EAV table.
///
/// The host environment owns the connection and lends it to the data-access
/// layer for the duration of a request. Implementations execute
/// parameterized queries and expose the engine's transaction primitives
/// unchanged.
///
/// # Invariants
///
/// - `execute` binds `params` positionally, using each parameter's own type
///   tag
/// - A query that cannot be prepared returns [`crate::StorageError::Prepare`],
///   never an empty row set
/// - `execute` never commits; only `commit` does
/// - `begin`/`commit`/`rollback` map one-to-one onto the engine's
///   primitives; nesting is not tracked
///
/// # Implementors
///
/// - [`super::SqliteConnection`] - rusqlite
/// - `super::MySqlConnection` - production MySQL (feature `mysql`)
pub trait Connection {
    /// Executes a query and returns all result rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be prepared, a parameter cannot
    /// be bound, or execution fails part way through the result set.
    fn execute(&self, query: &str, params: &[BindParam]) -> StorageResult<Vec<Row>>;

    /// Starts a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine refuses to start a transaction, for
    /// example because one is already open.
    fn begin(&self) -> StorageResult<()>;

    /// Commits the open transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if no transaction is open or the commit fails.
    fn commit(&self) -> StorageResult<()>;

    /// Rolls back the open transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if no transaction is open or the rollback fails.
    fn rollback(&self) -> StorageResult<()>;
}

impl<C: Connection + ?Sized> Connection for &C {
    fn execute(&self, query: &str, params: &[BindParam]) -> StorageResult<Vec<Row>> {
        (**self).execute(query, params)
    }

    fn begin(&self) -> StorageResult<()> {
        (**self).begin()
    }

    fn commit(&self) -> StorageResult<()> {
        (**self).commit()
    }

    fn rollback(&self) -> StorageResult<()> {
        (**self).rollback()
    }
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn execute(&self, query: &str, params: &[BindParam]) -> StorageResult<Vec<Row>> {
        (**self).execute(query, params)
    }

    fn begin(&self) -> StorageResult<()> {
        (**self).begin()
    }

    fn commit(&self) -> StorageResult<()> {
        (**self).commit()
    }

    fn rollback(&self) -> StorageResult<()> {
        (**self).rollback()
    }
}
