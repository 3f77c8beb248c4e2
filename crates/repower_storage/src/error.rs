//! Error types for storage operations.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while talking to the EAV store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The driver could not open or reach the database.
    #[error("connection error: {0}")]
    Connection(String),

    /// The query template was rejected by the driver.
    #[error("failed to prepare query `{query}`: {message}")]
    Prepare {
        /// The query template.
        query: String,
        /// Driver message.
        message: String,
    },

    /// The statement was prepared but failed during execution or fetch.
    #[error("failed to execute query `{query}`: {message}")]
    Execute {
        /// The query template.
        query: String,
        /// Driver message.
        message: String,
    },

    /// A transaction primitive (begin, commit, rollback) failed.
    #[error("transaction {operation} failed: {message}")]
    Transaction {
        /// The primitive that failed.
        operation: &'static str,
        /// Driver message.
        message: String,
    },

    /// A row did not contain a column the caller asked for.
    #[error("column `{0}` missing from result row")]
    MissingColumn(String),

    /// A column the caller requires as text was NULL.
    #[error("column `{0}` is NULL")]
    UnexpectedNull(String),

    /// A column the caller requires as text holds a numeric value.
    #[error("column `{0}` is not text")]
    TypeMismatch(String),
}

impl StorageError {
    /// Creates a prepare error.
    pub fn prepare(query: impl Into<String>, message: impl ToString) -> Self {
        Self::Prepare {
            query: query.into(),
            message: message.to_string(),
        }
    }

    /// Creates an execute error.
    pub fn execute(query: impl Into<String>, message: impl ToString) -> Self {
        Self::Execute {
            query: query.into(),
            message: message.to_string(),
        }
    }

    /// Creates a transaction error.
    pub fn transaction(operation: &'static str, message: impl ToString) -> Self {
        Self::Transaction {
            operation,
            message: message.to_string(),
        }
    }
}
