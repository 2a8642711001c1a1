//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Agent API transport (HTTP client, mock)

pub mod ai;

pub use ai::{MockThreadTransport, ThreadApiClient, ThreadApiConfig};
