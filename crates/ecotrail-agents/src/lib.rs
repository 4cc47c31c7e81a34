//! Agent state, trails, and the motion model for the Ecotrail simulation.
//!
//! This crate contains the logic layer for agents -- everything that operates
//! on a single agent's state without touching I/O or scheduling. It sits
//! between `ecotrail-types` (shared identifiers and snapshots) and
//! `ecotrail-core` (population wiring and the frame loop).
//!
//! # Modules
//!
//! - [`agent`] -- The [`Agent`] record and its per-tick update
//! - [`config`] -- Tunable motion parameters ([`MotionConfig`])
//! - [`error`] -- Error types for agent operations ([`AgentError`])
//! - [`motion`] -- Pure leader/follower velocity and wrap functions
//! - [`trail`] -- Bounded position history ([`Trail`])

pub mod agent;
pub mod config;
pub mod error;
pub mod motion;
pub mod trail;

// Re-export primary types at crate root for convenience.
pub use agent::{Agent, AgentSeed};
pub use config::MotionConfig;
pub use error::AgentError;
pub use trail::Trail;
