//! Agent selection per interaction type.

use std::collections::HashMap;
use std::str::FromStr;

use super::errors::ConfigurationError;
use crate::domain::foundation::{AgentId, InteractionType, UnknownInteractionType};

/// Configuration value that routes a type to the in-process comparison.
pub const LOCAL_ALGORITHM_MARKER: &str = "local";

/// Where an interaction type is evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentBinding {
    /// A remote agent reached through the thread transport.
    Remote(AgentId),
    /// Computed in-process; no network call.
    LocalAlgorithm,
}

impl AgentBinding {
    /// Parses a configuration value: the local marker or an agent id.
    pub fn parse(value: &str) -> Option<Self> {
        if value.trim().eq_ignore_ascii_case(LOCAL_ALGORITHM_MARKER) {
            return Some(AgentBinding::LocalAlgorithm);
        }
        AgentId::new(value).map(AgentBinding::Remote)
    }
}

/// Read-only table of agent bindings, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct AgentBindings {
    bindings: HashMap<InteractionType, AgentBinding>,
}

impl AgentBindings {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table from raw `type tag -> agent id | local` entries.
    ///
    /// Blank values leave the type unbound. Unknown tags are rejected.
    pub fn from_config(entries: &HashMap<String, String>) -> Result<Self, UnknownInteractionType> {
        let mut bindings = Self::new();
        for (tag, value) in entries {
            let interaction_type = InteractionType::from_str(tag)?;
            if let Some(binding) = AgentBinding::parse(value) {
                bindings = bindings.with_binding(interaction_type, binding);
            }
        }
        Ok(bindings)
    }

    /// Adds or replaces the binding for a type.
    pub fn with_binding(mut self, interaction_type: InteractionType, binding: AgentBinding) -> Self {
        self.bindings.insert(interaction_type, binding);
        self
    }

    /// Binds a type to a remote agent id. Blank ids are ignored.
    pub fn with_agent(self, interaction_type: InteractionType, agent_id: impl Into<String>) -> Self {
        match AgentId::new(agent_id) {
            Some(id) => self.with_binding(interaction_type, AgentBinding::Remote(id)),
            None => self,
        }
    }

    /// Routes a type to the local algorithm.
    pub fn with_local(self, interaction_type: InteractionType) -> Self {
        self.with_binding(interaction_type, AgentBinding::LocalAlgorithm)
    }

    /// Returns the configured binding, if any.
    pub fn get(&self, interaction_type: InteractionType) -> Option<&AgentBinding> {
        self.bindings.get(&interaction_type)
    }

    /// Types with no binding, in declaration order.
    pub fn unbound_types(&self) -> Vec<InteractionType> {
        InteractionType::all()
            .iter()
            .copied()
            .filter(|t| !self.bindings.contains_key(t))
            .collect()
    }

    /// Applies the selection policy for one call.
    ///
    /// An explicit agent always wins. Otherwise the table decides, and a type
    /// with no entry is a configuration error.
    pub fn resolve(
        &self,
        interaction_type: InteractionType,
        explicit_agent: Option<&AgentId>,
    ) -> Result<AgentBinding, ConfigurationError> {
        if let Some(agent) = explicit_agent {
            return Ok(AgentBinding::Remote(agent.clone()));
        }
        self.get(interaction_type)
            .cloned()
            .ok_or(ConfigurationError::MissingAgentBinding(interaction_type))
    }
}
