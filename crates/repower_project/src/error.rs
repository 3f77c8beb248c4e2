//! Error type for the project data service.

use repower_core::CoreError;
use repower_remote::RemoteError;
use repower_storage::StorageError;
use thiserror::Error;

/// Result type for service operations.
pub type ProjectResult<T> = Result<T, ProjectError>;

/// Errors returned by [`crate::ProjectDataService`].
#[derive(Debug, Error)]
pub enum ProjectError {
    /// Read path error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Write path error.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl From<StorageError> for ProjectError {
    fn from(err: StorageError) -> Self {
        Self::Core(CoreError::Storage(err))
    }
}

impl ProjectError {
    /// Returns true for a lookup that matched nothing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_not_found())
    }

    /// Returns true for a configuration problem on either path.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Core(e) => e.is_configuration(),
            Self::Remote(e) => e.is_configuration(),
        }
    }

    /// Returns true for a storage failure.
    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Core(CoreError::Storage(_)))
    }
}
