//! Scripted HTTP client for tests.

use crate::http::{HttpClient, HttpResponse};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A request captured by [`MockHttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Target URL.
    pub url: String,
    /// Form fields in send order.
    pub fields: Vec<(String, String)>,
}

impl RecordedRequest {
    /// Returns the value of a form field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// An [`HttpClient`] that returns a scripted outcome and counts calls.
#[derive(Debug, Default)]
pub struct MockHttpClient {
    outcome: Mutex<Option<Result<HttpResponse, String>>>,
    calls: AtomicUsize,
    last_request: Mutex<Option<RecordedRequest>>,
}

impl MockHttpClient {
    /// Creates a mock with no scripted outcome.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock that answers with `status` and `body`.
    #[must_use]
    pub fn responding(status: u16, body: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.set_response(status, body);
        mock
    }

    /// Creates a mock whose requests fail at the transport level.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.set_transport_failure(message);
        mock
    }

    /// Scripts a response.
    pub fn set_response(&self, status: u16, body: impl Into<String>) {
        *self.outcome.lock() = Some(Ok(HttpResponse::new(status, body)));
    }

    /// Scripts a transport failure.
    pub fn set_transport_failure(&self, message: impl Into<String>) {
        *self.outcome.lock() = Some(Err(message.into()));
    }

    /// Returns how many requests were attempted.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns the most recent request.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.last_request.lock().clone()
    }
}

impl HttpClient for MockHttpClient {
    fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<HttpResponse, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock() = Some(RecordedRequest {
            url: url.to_owned(),
            fields: fields
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        });
        self.outcome
            .lock()
            .clone()
            .unwrap_or_else(|| Err("No mock response set".into()))
    }
}
