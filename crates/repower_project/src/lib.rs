//! # Repower Project
//!
//! The public facade over a REDCap project's data.
//!
//! [`ProjectDataService`] reads records from the `redcap_data` EAV table
//! through a borrowed storage connection and writes them through the REDCap
//! record import API. Reads are transactional if the caller opens a
//! transaction; writes are a separate best-effort remote call and are not
//! covered by it.
//!
//! ## Example
//!
//! ```rust,ignore
//! use repower_project::{FieldNameMap, ProjectDataService, ProjectId, Record};
//!
//! let service = ProjectDataService::new(ProjectId::new(7), &conn, FieldNameMap::identity());
//! let patient = service.get_record_by("mrn", "A-100")?;
//!
//! let mut service = service;
//! service.make_writeable("https://redcap.example.org/api/", token)?;
//! let result = service.save_record("1", &Record::new().with("consented", "1"), None)?;
//! if !result.ok() {
//!     tracing::warn!(error = %result.error_message(), "save failed");
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod service;

pub use error::{ProjectError, ProjectResult};
pub use service::ProjectDataService;

pub use repower_core::{
    CoreError, EavTuple, FieldNameMap, ProjectConfig, ProjectId, Record, SortOrder,
    RECORD_SENTINEL,
};
pub use repower_remote::{
    HttpClient, MockHttpClient, RemoteError, UreqClient, WriteCredentials, WriteResult,
};
pub use repower_storage::{BindParam, Connection, SqliteConnection, StorageError};
#[cfg(feature = "mysql")]
pub use repower_storage::MySqlConnection;
