//! Error types for the ecotrail-agents crate.
//!
//! The motion model itself is total: every tick succeeds for well-formed
//! state. Errors only arise from malformed configuration (rejected before
//! any agent is built) or from a driver handing an agent the wrong leader.

use ecotrail_types::{AgentId, Role};

/// Errors that can occur during agent construction and updates.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A motion parameter is outside its valid range.
    #[error("invalid motion config: {field} {reason}")]
    InvalidConfig {
        /// Name of the offending configuration field.
        field: &'static str,
        /// Explanation of what is wrong with the value.
        reason: String,
    },

    /// An agent was constructed naming itself as its own leader.
    #[error("{0} cannot follow itself")]
    SelfLeader(AgentId),

    /// A follower was updated without the leader it was wired to.
    #[error("{agent} expected leader {expected} but was given {given:?}")]
    LeaderMismatch {
        /// The follower being updated.
        agent: AgentId,
        /// The leader assigned at construction.
        expected: AgentId,
        /// The leader the driver supplied, if any.
        given: Option<AgentId>,
    },

    /// A pursuit target was supplied to (or withheld from) an agent whose
    /// role does not match.
    #[error("{agent} is a {role:?} and cannot take this update")]
    RoleMismatch {
        /// The agent being updated.
        agent: AgentId,
        /// The agent's permanent role.
        role: Role,
    },
}
