//! Type-safe agent identifier.
//!
//! Agents are created once, in order, and never destroyed, so an agent's
//! construction index is a stable identity for the whole run. Wrapping it
//! keeps indices for other collections from being mixed in by accident.

use serde::{Deserialize, Serialize};

/// Unique identifier for an agent: its construction index in the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub u32);

impl AgentId {
    /// Create an identifier from a construction index.
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Return the inner index value.
    pub const fn into_inner(self) -> u32 {
        self.0
    }

    /// Return the index as a `usize` suitable for slice lookups.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Return the identifier of the agent constructed just before this one,
    /// or `None` for the first agent.
    pub const fn predecessor(self) -> Option<Self> {
        match self.0.checked_sub(1) {
            Some(prev) => Some(Self(prev)),
            None => None,
        }
    }
}

impl core::fmt::Display for AgentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "agent-{}", self.0)
    }
}

impl From<u32> for AgentId {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl From<AgentId> for u32 {
    fn from(id: AgentId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predecessor_of_head_is_none() {
        assert_eq!(AgentId::new(0).predecessor(), None);
        assert_eq!(AgentId::new(7).predecessor(), Some(AgentId::new(6)));
    }

    #[test]
    fn display_includes_index() {
        assert_eq!(AgentId::new(12).to_string(), "agent-12");
    }

    #[test]
    fn serializes_as_bare_number() {
        let json = serde_json::to_string(&AgentId::new(3)).ok();
        assert_eq!(json.as_deref(), Some("3"));
    }
}
