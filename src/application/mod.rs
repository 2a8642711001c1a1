//! Application layer - Orchestrates domain operations across ports.
//!
//! `InteractionService` is the single entry point used by callers.

mod interaction_service;

pub use interaction_service::{
    InteractionContent, InteractionRequest, InteractionService, MAX_LOGGED_RESPONSE_CHARS,
};
