//! Shared type definitions for the Ecotrail simulation.
//!
//! This crate is the single source of truth for the identifiers and
//! serializable views used across the Ecotrail workspace. The motion core
//! lives in `ecotrail-agents`; everything a presentation layer consumes is
//! defined here so it can be shipped without the simulation logic.
//!
//! # Modules
//!
//! - [`ids`] -- Index-based agent identifier
//! - [`enums`] -- Agent role
//! - [`structs`] -- Display color and per-frame snapshots

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::Role;
pub use ids::AgentId;
pub use structs::{AgentSnapshot, Color, FrameSnapshot};
