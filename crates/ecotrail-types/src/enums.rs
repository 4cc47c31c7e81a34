//! Enumeration types shared across the workspace.

use serde::{Deserialize, Serialize};

/// The permanent motion mode of an agent.
///
/// Assigned at construction from whether the agent has a leader and never
/// changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Free-roaming head of the chain, driven by its own oscillator.
    Leader,
    /// Pursues a lagged point on its leader's trail.
    Follower,
}

impl Role {
    /// Derive the role from the presence of a leader reference.
    pub const fn from_has_leader(has_leader: bool) -> Self {
        if has_leader { Self::Follower } else { Self::Leader }
    }
}
