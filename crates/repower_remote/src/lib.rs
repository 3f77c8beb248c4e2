//! # Repower Remote
//!
//! The write path: EAV tuples are submitted to the REDCap API's record
//! import endpoint instead of being written to storage directly.
//!
//! This crate provides:
//! - [`RemoteWriter`] - serializes tuples and classifies the response
//! - [`HttpClient`] - the seam between the writer and an HTTP library
//! - [`UreqClient`] - blocking production client
//! - [`MockHttpClient`] - scripted client for tests, with a call counter
//!
//! ## Key Invariants
//!
//! - One request per submission; no retries
//! - No request is sent without credentials
//! - An application-level rejection and a transport failure are reported
//!   as different [`WriteResult`] variants
//! - The API token never appears in logs or `Debug` output

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod http;
mod mock;
mod payload;
mod writer;

pub use error::{RemoteError, RemoteResult};
pub use http::{HttpClient, HttpResponse, UreqClient};
pub use mock::{MockHttpClient, RecordedRequest};
pub use payload::{encode_tuples, WireTuple};
pub use writer::{RemoteWriter, WriteCredentials, WriteResult, NO_ERROR_RETURNED};
