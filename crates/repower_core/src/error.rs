//! Error types for Repower core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur on the read path.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage query failed.
    #[error("storage error: {0}")]
    Storage(#[from] repower_storage::StorageError),

    /// A secondary-key lookup matched no records.
    #[error("no record in project {project_id} has {field_name} = {value}")]
    NotFound {
        /// Project searched.
        project_id: i64,
        /// Application field name used for the lookup.
        field_name: String,
        /// Value looked up.
        value: String,
    },

    /// The data-access object was configured inconsistently.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },
}

impl CoreError {
    /// Creates a not found error.
    pub fn not_found(
        project_id: i64,
        field_name: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self::NotFound {
            project_id,
            field_name: field_name.into(),
            value: value.to_string(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns true for a lookup that matched nothing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true for a configuration problem.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}
