//! Agent API Adapters.
//!
//! Implementations of the ThreadTransport port.
//!
//! ## Available Adapters
//!
//! - `ThreadApiClient` - HTTP client for the thread-oriented agent API
//! - `MockThreadTransport` - Configurable mock for testing

mod mock_transport;
mod thread_api_client;

pub use mock_transport::{
    CreatedThread, MockReply, MockThreadTransport, SentMessage, DEFAULT_MOCK_COMPLETION,
};
pub use thread_api_client::{
    ThreadApiClient, ThreadApiConfig, DEFAULT_BASE_URL, DEFAULT_ORGANIZATION_HEADER,
};
