//! Agent API configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Agent API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// API root, e.g. `https://api.halpi.app/v1`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token for the agent API
    pub api_key: Option<Secret<String>>,

    /// Organization used when a call supplies none
    pub organization_id: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Header carrying the organization id
    #[serde(default = "default_organization_header")]
    pub organization_header: String,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    /// Validate agent API configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_api_key() {
            return Err(ValidationError::MissingRequired("HALPI__AI__API_KEY"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl);
        }

        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        let header = self.organization_header.as_str();
        if header.is_empty()
            || !header
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(ValidationError::InvalidOrganizationHeader);
        }

        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            organization_id: None,
            timeout_secs: default_timeout(),
            organization_header: default_organization_header(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.halpi.app/v1".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_organization_header() -> String {
    "X-Organization-Id".to_string()
}
