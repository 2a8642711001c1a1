//! Error types for the interaction pipeline

use crate::domain::foundation::InteractionType;
use crate::ports::TransportError;

/// Deployment defects detected before any network call.
///
/// This is the only error that escapes `InteractionService::interact`.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("no organization id supplied and none configured")]
    MissingOrganization,

    #[error("thread API credentials are not configured")]
    MissingCredentials,

    #[error("HTTP client could not be built: {0}")]
    HttpClient(String),

    #[error("no agent bound to interaction type {0}")]
    MissingAgentBinding(InteractionType),
}

/// Extraction errors
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("response could not be repaired into JSON ({} bytes)", raw.len())]
    Unrepairable {
        /// The completion text exactly as received.
        raw: String,
    },
}

impl ExtractionError {
    pub fn unrepairable(raw: impl Into<String>) -> Self {
        Self::Unrepairable { raw: raw.into() }
    }
}

/// Parsed JSON does not satisfy the contract of its interaction type.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("{interaction_type} response has invalid shape: {}", problems.join(", "))]
pub struct ShapeMismatch {
    pub interaction_type: InteractionType,
    /// One entry per missing or mistyped field, e.g. `missing field feedback`.
    pub problems: Vec<String>,
}

/// Any recoverable failure between thread creation and validation.
///
/// The facade logs it and substitutes the fallback result.
#[derive(Debug, thiserror::Error)]
pub enum InteractionFailure {
    #[error("transport unavailable: {0}")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Shape(#[from] ShapeMismatch),
}

impl InteractionFailure {
    /// Short label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            InteractionFailure::Transport(_) => "transport_unavailable",
            InteractionFailure::Extraction(_) => "unrepairable_response",
            InteractionFailure::Shape(_) => "shape_mismatch",
        }
    }
}
