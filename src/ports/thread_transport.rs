//! Thread Transport Port - Interface for the external conversational agent API.
//!
//! The agent API is thread-oriented: a call opens a fresh thread bound to one
//! agent, posts a single message and reads back the completion text. Threads
//! are never reused across calls.
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//! use halpi::ports::{ThreadTransport, TransportError};
//!
//! struct EchoTransport;
//!
//! #[async_trait]
//! impl ThreadTransport for EchoTransport {
//!     async fn create_thread(&self, org: &OrganizationId, agent: &AgentId)
//!         -> Result<ThreadHandle, TransportError> {
//!         Ok(ThreadHandle::new("thread-1"))
//!     }
//!     async fn send_message(&self, org: &OrganizationId, thread: &ThreadHandle, prompt: &str)
//!         -> Result<String, TransportError> {
//!         Ok(prompt.to_string())
//!     }
//! }
//! ```

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::foundation::{AgentId, OrganizationId, ThreadHandle};

/// Port for the thread-oriented agent API.
///
/// Implementations must be safe to share between concurrent calls; each call
/// owns the thread it creates.
#[async_trait]
pub trait ThreadTransport: Send + Sync {
    /// Opens a new conversation thread bound to `agent` within `org`.
    async fn create_thread(
        &self,
        org: &OrganizationId,
        agent: &AgentId,
    ) -> Result<ThreadHandle, TransportError>;

    /// Posts `prompt` to `thread` and returns the raw completion text.
    async fn send_message(
        &self,
        org: &OrganizationId,
        thread: &ThreadHandle,
        prompt: &str,
    ) -> Result<String, TransportError>;
}

/// Transport failures. Every variant means the agent was unreachable or
/// answered unusably; the facade recovers all of them with a fallback.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TransportError {
    /// Non-success HTTP status.
    #[error("agent API returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// Connection or protocol failure.
    #[error("network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Limit that was exceeded, in milliseconds.
        timeout_ms: u64,
    },

    /// Reply body did not have the documented shape.
    #[error("malformed reply: {0}")]
    MalformedReply(String),
}

impl TransportError {
    /// Creates a status error.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a timeout error for the limit that was exceeded.
    pub fn timeout(limit: Duration) -> Self {
        Self::Timeout {
            timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Creates a malformed reply error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedReply(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_displays_code_and_body() {
        let err = TransportError::status(503, "maintenance");
        assert_eq!(err.to_string(), "agent API returned 503: maintenance");
    }

    #[test]
    fn timeout_error_displays_milliseconds() {
        assert_eq!(
            TransportError::timeout(Duration::from_secs(30)).to_string(),
            "request timed out after 30000ms"
        );
        assert_eq!(
            TransportError::timeout(Duration::from_millis(25)).to_string(),
            "request timed out after 25ms"
        );
    }

    #[test]
    fn transport_is_object_safe() {
        fn assert_object_safe(_: Option<&dyn ThreadTransport>) {}
        assert_object_safe(None);
    }
}
