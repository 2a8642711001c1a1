//! Thread API Client - Implementation of ThreadTransport over HTTP.
//!
//! # Configuration
//!
//! ```ignore
//! let config = ThreadApiConfig::new(api_key)
//!     .with_base_url("https://api.halpi.app/v1")
//!     .with_timeout(Duration::from_secs(30));
//!
//! let client = ThreadApiClient::new(config)?;
//! ```
//!
//! # Wire format
//!
//! - `POST {base}/threads` with `{"agent_id": ...}`, answered by `{"id": ...}`
//! - `POST {base}/threads/{id}/messages` with `{"message": ...}`, answered by
//!   `{"completion": {"content": ...}}`
//!
//! Both requests carry `Authorization: Bearer <key>` and the organization
//! header.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::foundation::{AgentId, OrganizationId, ThreadHandle};
use crate::domain::interaction::ConfigurationError;
use crate::ports::{ThreadTransport, TransportError};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.halpi.app/v1";

/// Default header naming the organization.
pub const DEFAULT_ORGANIZATION_HEADER: &str = "X-Organization-Id";

/// Configuration for the thread API client.
#[derive(Debug, Clone)]
pub struct ThreadApiConfig {
    /// Bearer token.
    api_key: Secret<String>,
    /// API root without trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Header carrying the organization id.
    pub organization_header: String,
}

impl ThreadApiConfig {
    /// Creates a configuration with the given API key and defaults.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            organization_header: DEFAULT_ORGANIZATION_HEADER.to_string(),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the organization header name.
    pub fn with_organization_header(mut self, header: impl Into<String>) -> Self {
        self.organization_header = header.into();
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// HTTP adapter for the thread-oriented agent API.
pub struct ThreadApiClient {
    config: ThreadApiConfig,
    client: Client,
}

impl ThreadApiClient {
    /// Creates a client. Fails when no API key is configured.
    pub fn new(config: ThreadApiConfig) -> Result<Self, ConfigurationError> {
        if config.api_key().trim().is_empty() {
            return Err(ConfigurationError::MissingCredentials);
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(client_build_failed)?;

        Ok(Self { config, client })
    }

    fn threads_url(&self) -> String {
        format!("{}/threads", self.config.base_url)
    }

    fn messages_url(&self, thread: &ThreadHandle) -> String {
        format!("{}/threads/{}/messages", self.config.base_url, thread)
    }

    async fn post<B: Serialize + Sync>(
        &self,
        url: String,
        org: &OrganizationId,
        body: &B,
    ) -> Result<Response, TransportError> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header(self.config.organization_header.as_str(), org.as_str())
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        Self::handle_response_status(response).await
    }

    fn map_reqwest_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::timeout(self.config.timeout)
        } else if e.is_connect() {
            TransportError::network(format!("Connection failed: {}", e))
        } else {
            TransportError::network(e.to_string())
        }
    }

    /// Maps non-2xx responses to `TransportError::Status`.
    async fn handle_response_status(response: Response) -> Result<Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(TransportError::status(status.as_u16(), body))
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
    ) -> Result<T, TransportError> {
        let text = response
            .text()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;
        serde_json::from_str(&text).map_err(|e| TransportError::malformed(e.to_string()))
    }
}

#[async_trait]
impl ThreadTransport for ThreadApiClient {
    async fn create_thread(
        &self,
        org: &OrganizationId,
        agent: &AgentId,
    ) -> Result<ThreadHandle, TransportError> {
        let body = CreateThreadRequest {
            agent_id: agent.as_str(),
        };
        let response = self.post(self.threads_url(), org, &body).await?;
        let created: CreateThreadResponse = self.read_json(response).await?;

        let id = match created.id {
            serde_json::Value::String(s) if !s.trim().is_empty() => s,
            serde_json::Value::Number(n) => n.to_string(),
            other => return Err(TransportError::malformed(format!("invalid thread id: {}", other))),
        };
        tracing::debug!(thread_id = %id, agent_id = %agent, "thread created");
        Ok(ThreadHandle::new(id))
    }

    async fn send_message(
        &self,
        org: &OrganizationId,
        thread: &ThreadHandle,
        prompt: &str,
    ) -> Result<String, TransportError> {
        let body = SendMessageRequest { message: prompt };
        let response = self.post(self.messages_url(thread), org, &body).await?;
        let reply: SendMessageResponse = self.read_json(response).await?;

        tracing::debug!(
            thread_id = %thread,
            completion_len = reply.completion.content.len(),
            "message sent"
        );
        Ok(reply.completion.content)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// API Types
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct CreateThreadRequest<'a> {
    agent_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateThreadResponse {
    id: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    completion: Completion,
}

#[derive(Debug, Deserialize)]
struct Completion {
    content: String,
}

fn client_build_failed(e: reqwest::Error) -> ConfigurationError {
    ConfigurationError::HttpClient(e.to_string())
}
