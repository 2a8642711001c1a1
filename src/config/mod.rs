//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `HALPI` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use halpi::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Agent API at {}", config.ai.base_url);
//! ```

mod ai;
mod error;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};

use serde::Deserialize;
use std::collections::HashMap;

use crate::domain::foundation::InteractionType;
use crate::domain::interaction::{AgentBinding, AgentBindings, LOCAL_ALGORITHM_MARKER};

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Agent API configuration
    #[serde(default)]
    pub ai: AiConfig,

    /// Interaction type tag -> agent id, or `local` for the in-process algorithm
    #[serde(default)]
    pub agents: HashMap<String, String>,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `HALPI` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `HALPI__AI__API_KEY=...` -> `ai.api_key = ...`
    /// - `HALPI__AGENTS__QUIZ_EVALUATION=agent-42` -> `agents.quiz_evaluation = agent-42`
    ///
    /// Concept identification defaults to the local algorithm.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let default_local = format!("agents.{}", InteractionType::ConceptIdentification);
        let config = config::Config::builder()
            .set_default(default_local, LOCAL_ALGORITHM_MARKER)?
            .add_source(
                config::Environment::default()
                    .prefix("HALPI")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Performs semantic validation of configuration:
    /// - API key present, base URL format, nonzero timeout
    /// - Every agent binding names a known interaction type
    /// - Every interaction type has a binding
    /// - Only concept identification is bound to the local algorithm
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        let bindings = self.agent_bindings()?;

        if let Some(unbound) = bindings.unbound_types().first() {
            return Err(ValidationError::UnboundInteractionType(*unbound));
        }

        for interaction_type in InteractionType::all() {
            if *interaction_type != InteractionType::ConceptIdentification
                && bindings.get(*interaction_type) == Some(&AgentBinding::LocalAlgorithm)
            {
                return Err(ValidationError::LocalAlgorithmUnsupported(*interaction_type));
            }
        }

        Ok(())
    }

    /// Builds the typed binding table injected into the interaction service.
    pub fn agent_bindings(&self) -> Result<AgentBindings, ValidationError> {
        AgentBindings::from_config(&self.agents)
            .map_err(|e| ValidationError::UnknownInteractionType(e.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const REMOTE_TYPES: [&str; 6] = [
        "CONCEPT_RESTITUTION",
        "QUIZ_EVALUATION",
        "NOTE_FEEDBACK",
        "MINDMAP_FEEDBACK",
        "STUDY_PLANNING",
        "PROGRESS_REPORT",
    ];

    /// Helper to set environment variables for testing
    /// Uses double underscores to separate nested config values
    fn set_minimal_env() {
        env::set_var("HALPI__AI__API_KEY", "hk-test");
        for tag in REMOTE_TYPES {
            env::set_var(format!("HALPI__AGENTS__{}", tag), format!("{}-bot", tag.to_lowercase()));
        }
    }

    /// Helper to clear environment variables after testing
    fn clear_env() {
        env::remove_var("HALPI__AI__API_KEY");
        env::remove_var("HALPI__AI__BASE_URL");
        env::remove_var("HALPI__AI__TIMEOUT_SECS");
        env::remove_var("HALPI__AI__ORGANIZATION_ID");
        env::remove_var("HALPI__AGENTS__CONCEPT_IDENTIFICATION");
        env::remove_var("HALPI__AGENTS__ESSAY_GRADING");
        for tag in REMOTE_TYPES {
            env::remove_var(format!("HALPI__AGENTS__{}", tag));
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("HALPI__AI__ORGANIZATION_ID", "org-7");
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert!(config.ai.has_api_key());
        assert_eq!(config.ai.organization_id.as_deref(), Some("org-7"));
        assert_eq!(config.agents["quiz_evaluation"], "quiz_evaluation-bot");
    }

    #[test]
    fn test_concept_identification_defaults_to_local() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        let bindings = config.agent_bindings().unwrap();
        assert_eq!(
            bindings.get(InteractionType::ConceptIdentification),
            Some(&AgentBinding::LocalAlgorithm)
        );
    }

    #[test]
    fn test_concept_identification_can_be_remote() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("HALPI__AGENTS__CONCEPT_IDENTIFICATION", "identify-bot");
        let result = AppConfig::load();
        clear_env();

        let bindings = result.unwrap().agent_bindings().unwrap();
        assert!(matches!(
            bindings.get(InteractionType::ConceptIdentification),
            Some(AgentBinding::Remote(_))
        ));
    }

    #[test]
    fn test_validate_full_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.validate().is_ok(), "{:?}", config.validate());
    }

    #[test]
    fn test_custom_timeout_and_url() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("HALPI__AI__TIMEOUT_SECS", "15");
        env::set_var("HALPI__AI__BASE_URL", "http://localhost:9000");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.ai.timeout_secs, 15);
        assert_eq!(config.ai.base_url, "http://localhost:9000");
    }

    #[test]
    fn test_validate_reports_unbound_type() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::remove_var("HALPI__AGENTS__PROGRESS_REPORT");
        let result = AppConfig::load();
        clear_env();

        assert_eq!(
            result.unwrap().validate(),
            Err(ValidationError::UnboundInteractionType(
                InteractionType::ProgressReport
            ))
        );
    }

    #[test]
    fn test_validate_reports_unknown_type() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("HALPI__AGENTS__ESSAY_GRADING", "essay-bot");
        let result = AppConfig::load();
        clear_env();

        assert_eq!(
            result.unwrap().validate(),
            Err(ValidationError::UnknownInteractionType(
                "essay_grading".to_string()
            ))
        );
    }

    #[test]
    fn test_validate_rejects_local_for_remote_only_type() {
        let config = AppConfig {
            ai: AiConfig {
                api_key: Some(secrecy::Secret::new("hk".to_string())),
                ..Default::default()
            },
            agents: InteractionType::all()
                .iter()
                .map(|t| (t.to_string(), LOCAL_ALGORITHM_MARKER.to_string()))
                .collect(),
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::LocalAlgorithmUnsupported(
                InteractionType::ConceptRestitution
            ))
        );
    }
}
