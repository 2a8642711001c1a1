//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ThreadTransport` - Thread-oriented conversational agent API

mod thread_transport;

pub use thread_transport::{ThreadTransport, TransportError};
