//! # Repower Core
//!
//! Record-level access to a REDCap project's EAV data.
//!
//! This crate provides:
//! - [`FieldNameMap`] - bidirectional alias table between application and
//!   storage field names
//! - [`RecordAssembler`] - EAV tuples to flat [`Record`]s and back
//! - [`EntityStore`] - the read path: secondary-key lookups, record fetches
//!   and explicit transaction scope
//! - [`ProjectConfig`] - immutable per-project configuration
//!
//! Writes do not go through this crate's storage connection. They are
//! submitted to the REDCap API by `repower_remote`.
//!
//! ## Key Invariants
//!
//! - Every query is filtered by the bound project id
//! - Field names are mapped exactly once per direction
//! - A lookup with zero matches is [`CoreError::NotFound`], a storage
//!   failure is [`CoreError::Storage`]; the two are never conflated

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod assembler;
mod config;
mod error;
mod mapper;
mod store;
mod types;

pub use assembler::RecordAssembler;
pub use config::ProjectConfig;
pub use error::{CoreError, CoreResult};
pub use mapper::{Direction, FieldNameMap};
pub use store::{EntityStore, RECORD_SENTINEL};
pub use types::{EavTuple, ProjectId, Record, SortOrder};
