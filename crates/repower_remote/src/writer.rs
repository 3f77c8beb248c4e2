//! Submission of EAV tuples to the record import API.

use crate::error::{RemoteError, RemoteResult};
use crate::http::HttpClient;
use crate::payload::encode_tuples;
use repower_core::EavTuple;
use tracing::{info, warn};

/// Message used when a rejection carries no structured error.
pub const NO_ERROR_RETURNED: &str = "No error returned.";

/// Endpoint URL and token for the record import API.
#[derive(Clone, PartialEq, Eq)]
pub struct WriteCredentials {
    api_url: String,
    api_token: String,
}

impl WriteCredentials {
    /// Creates credentials.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Configuration`] if either part is empty.
    pub fn new(api_url: impl Into<String>, api_token: impl Into<String>) -> RemoteResult<Self> {
        let api_url = api_url.into();
        let api_token = api_token.into();
        if api_url.trim().is_empty() {
            return Err(RemoteError::Configuration("API URL is empty".into()));
        }
        if api_token.trim().is_empty() {
            return Err(RemoteError::Configuration("API token is empty".into()));
        }
        Ok(Self { api_url, api_token })
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Returns the token.
    #[must_use]
    pub fn api_token(&self) -> &str {
        &self.api_token
    }
}

impl std::fmt::Debug for WriteCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteCredentials")
            .field("api_url", &self.api_url)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

/// Outcome of one submission.
///
/// Rejections and transport failures are ordinary values: the caller
/// decides whether to show an error page or try again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// The API answered HTTP 200.
    Accepted,
    /// The API answered with another status.
    Rejected {
        /// HTTP status code.
        status: u16,
        /// The body's `error` field, or [`NO_ERROR_RETURNED`].
        message: String,
    },
    /// The API could not be reached.
    TransportFailed {
        /// Transport error description.
        message: String,
    },
}

impl WriteResult {
    /// Returns true if the write was accepted.
    #[must_use]
    pub fn ok(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Returns the error message; empty when accepted.
    ///
    /// Transport failures are prefixed with `transport error:` so they read
    /// differently from an API rejection.
    #[must_use]
    pub fn error_message(&self) -> String {
        match self {
            Self::Accepted => String::new(),
            Self::Rejected { message, .. } => message.clone(),
            Self::TransportFailed { message } => format!("transport error: {message}"),
        }
    }

    /// Converts into a `Result` for callers that want `?`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Rejected`] or [`RemoteError::Transport`].
    pub fn into_result(self) -> RemoteResult<()> {
        match self {
            Self::Accepted => Ok(()),
            Self::Rejected { status, message } => Err(RemoteError::Rejected { status, message }),
            Self::TransportFailed { message } => Err(RemoteError::Transport(message)),
        }
    }

    fn from_response(status: u16, body: &str) -> Self {
        if status == 200 {
            return Self::Accepted;
        }
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
            .unwrap_or_else(|| NO_ERROR_RETURNED.to_owned());
        Self::Rejected { status, message }
    }
}

/// Submits tuples to the record import API.
///
/// One POST per call, no retries. Without credentials every submission
/// fails before the client is touched.
pub struct RemoteWriter<H: HttpClient> {
    client: H,
    credentials: Option<WriteCredentials>,
}

impl<H: HttpClient> RemoteWriter<H> {
    /// Creates a read-only writer around an HTTP client.
    pub fn new(client: H) -> Self {
        Self {
            client,
            credentials: None,
        }
    }

    /// Creates a writer with credentials already attached.
    pub fn with_credentials(client: H, credentials: WriteCredentials) -> Self {
        Self {
            client,
            credentials: Some(credentials),
        }
    }

    /// Attaches credentials, replacing any previous ones.
    pub fn set_credentials(&mut self, credentials: WriteCredentials) {
        self.credentials = Some(credentials);
    }

    /// Removes the credentials, making the writer read-only again.
    pub fn clear_credentials(&mut self) {
        self.credentials = None;
    }

    /// Returns true if credentials are attached.
    pub fn is_writeable(&self) -> bool {
        self.credentials.is_some()
    }

    /// Returns the attached credentials.
    pub fn credentials(&self) -> Option<&WriteCredentials> {
        self.credentials.as_ref()
    }

    /// Returns the HTTP client.
    pub fn client(&self) -> &H {
        &self.client
    }

    /// Sends `tuples` in a single request and classifies the response.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Configuration`] if no credentials are attached
    /// and [`RemoteError::Encode`] if the tuples cannot be serialized. API
    /// rejections and transport failures are `Ok` values.
    pub fn submit(&self, tuples: &[EavTuple]) -> RemoteResult<WriteResult> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            RemoteError::Configuration("write attempted without API credentials".into())
        })?;

        let data = encode_tuples(tuples)?;
        let fields = [
            ("content", "record"),
            ("type", "eav"),
            ("format", "json"),
            ("token", credentials.api_token()),
            ("data", data.as_str()),
        ];

        info!(
            url = credentials.api_url(),
            tuples = tuples.len(),
            "submitting records to import API"
        );

        let result = match self.client.post_form(credentials.api_url(), &fields) {
            Ok(response) => WriteResult::from_response(response.status, &response.body),
            Err(message) => WriteResult::TransportFailed { message },
        };

        match &result {
            WriteResult::Accepted => {}
            WriteResult::Rejected { status, message } => {
                warn!(status, message = %message, "import API rejected write");
            }
            WriteResult::TransportFailed { message } => {
                warn!(message = %message, "import API unreachable");
            }
        }
        Ok(result)
    }
}

impl<H: HttpClient> std::fmt::Debug for RemoteWriter<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteWriter")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
