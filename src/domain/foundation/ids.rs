//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Organization the student belongs to; scopes every remote thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationId(String);

impl OrganizationId {
    /// Creates an OrganizationId, returning None for blank input.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a remote, pre-configured agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Creates an AgentId, returning None for blank input.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque handle of a conversation thread created by the transport.
///
/// Scoped to a single interaction; never stored or reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThreadHandle(String);

impl ThreadHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn organization_id_trims_input() {
        let org = OrganizationId::new("  org-42 ").unwrap();
        assert_eq!(org.as_str(), "org-42");
        assert_eq!(org.to_string(), "org-42");
    }

    #[test]
    fn blank_ids_are_rejected() {
        assert!(OrganizationId::new("").is_none());
        assert!(OrganizationId::new("   ").is_none());
        assert!(AgentId::new("\t").is_none());
    }

    #[test]
    fn agent_id_serializes_transparently() {
        let agent = AgentId::new("agent-7").unwrap();
        assert_eq!(serde_json::to_string(&agent).unwrap(), "\"agent-7\"");
    }

    #[test]
    fn thread_handle_displays_inner_id() {
        assert_eq!(ThreadHandle::new("thr_1").to_string(), "thr_1");
    }
}
