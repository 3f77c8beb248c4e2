//! # repower testkit
//!
//! Test utilities for repower.
//!
//! This crate provides:
//! - `redcap_data` fixtures on in-memory and file-backed sqlite
//! - A query-recording [`Connection`](repower_storage::Connection) wrapper
//! - Property-based test generators using proptest
//! - Test logging setup
//!
//! ## Usage
//!
//! ```rust
//! use repower_core::{EavTuple, EntityStore, FieldNameMap, ProjectId};
//! use repower_testkit::prelude::*;
//!
//! let pid = ProjectId::new(7);
//! let conn = seeded_connection(&[EavTuple::new(pid, "1", "dob", "1990-01-01")]);
//! let store = EntityStore::new(pid, &conn, FieldNameMap::identity());
//! assert_eq!(store.get_by("dob", "1990-01-01").unwrap().get("dob"), Some("1990-01-01"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod counting;
pub mod fixtures;
pub mod generators;
pub mod logging;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::counting::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::logging::*;
}

pub use counting::*;
pub use fixtures::*;
pub use generators::*;
pub use logging::*;
