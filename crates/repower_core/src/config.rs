//! Per-project configuration.

use crate::error::{CoreError, CoreResult};
use crate::mapper::FieldNameMap;
use crate::types::ProjectId;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Configuration for one project's data-access object.
///
/// Populated once (in code or from a JSON file) and then shared by
/// reference; nothing mutates it after load.
///
/// ```json
/// {
///   "project_id": 7,
///   "field_name_map": { "dob_alias": "dob" },
///   "api_url": "https://redcap.example.org/api/",
///   "api_token": "0123456789ABCDEF",
///   "http_timeout_secs": 30
/// }
/// ```
#[derive(Clone, Deserialize)]
pub struct ProjectConfig {
    /// Project all reads and writes are scoped to.
    pub project_id: ProjectId,
    /// Application name -> storage name aliases.
    #[serde(default)]
    pub field_name_map: BTreeMap<String, String>,
    /// REDCap API endpoint used by the write path.
    #[serde(default)]
    pub api_url: Option<String>,
    /// REDCap API token used by the write path.
    #[serde(default)]
    pub api_token: Option<String>,
    /// Timeout applied by the HTTP client, if any.
    #[serde(default, rename = "http_timeout_secs", deserialize_with = "de_timeout")]
    pub http_timeout: Option<Duration>,
}

impl ProjectConfig {
    /// Creates a read-only configuration with no aliases.
    #[must_use]
    pub fn new(project_id: ProjectId) -> Self {
        Self {
            project_id,
            field_name_map: BTreeMap::new(),
            api_url: None,
            api_token: None,
            http_timeout: None,
        }
    }

    /// Adds a field-name alias.
    #[must_use]
    pub fn with_alias(
        mut self,
        application: impl Into<String>,
        storage: impl Into<String>,
    ) -> Self {
        self.field_name_map.insert(application.into(), storage.into());
        self
    }

    /// Sets the write credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        api_url: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        self.api_url = Some(api_url.into());
        self.api_token = Some(api_token.into());
        self
    }

    /// Sets the HTTP timeout.
    #[must_use]
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] if the JSON is malformed.
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| CoreError::configuration(format!("invalid project config: {e}")))
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] if the file is unreadable or
    /// malformed.
    pub fn from_json_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            CoreError::configuration(format!("config file not readable at {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    /// Builds the field-name map.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] if the aliases are not injective.
    pub fn field_names(&self) -> CoreResult<FieldNameMap> {
        FieldNameMap::new(
            self.field_name_map
                .iter()
                .map(|(a, s)| (a.as_str(), s.as_str())),
        )
    }

    /// Returns `(api_url, api_token)` when both are set.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.api_url, &self.api_token) {
            (Some(url), Some(token)) => Some((url.as_str(), token.as_str())),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ProjectConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectConfig")
            .field("project_id", &self.project_id)
            .field("field_name_map", &self.field_name_map)
            .field("api_url", &self.api_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

fn de_timeout<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
}
