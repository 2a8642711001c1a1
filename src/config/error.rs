//! Configuration error types

use thiserror::Error;

use crate::domain::foundation::InteractionType;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid base URL: must start with http:// or https://")]
    InvalidBaseUrl,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid organization header name")]
    InvalidOrganizationHeader,

    #[error("Unknown interaction type in agent bindings: {0}")]
    UnknownInteractionType(String),

    #[error("No agent bound to interaction type {0}")]
    UnboundInteractionType(InteractionType),

    #[error("Local algorithm cannot evaluate interaction type {0}")]
    LocalAlgorithmUnsupported(InteractionType),
}
