//! Display color and the per-frame snapshot handed to a presentation layer.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::enums::Role;
use crate::ids::AgentId;

/// Largest value a packed 24-bit RGB color can hold.
pub const MAX_RGB24: u32 = 0x00ff_ffff;

/// A packed 24-bit RGB display color.
///
/// Opaque to the motion model; carried only so that a renderer can draw the
/// agent and its trail in a consistent color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(u32);

impl Color {
    /// Build a color from a packed `0xRRGGBB` value. Bits above 24 are dropped.
    pub const fn from_rgb24(value: u32) -> Self {
        Self(value & MAX_RGB24)
    }
}

/// Serializable view of one agent after a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    /// The agent's identifier.
    pub id: AgentId,
    /// Leader or follower.
    pub role: Role,
    /// The agent this one follows, if any.
    pub leader: Option<AgentId>,
    /// Display color.
    pub color: Color,
    /// Current position (`z` is always 0).
    pub position: DVec3,
    /// Current velocity.
    pub velocity: DVec3,
    /// Trail points, oldest first.
    pub trail: Vec<DVec3>,
}

/// Serializable view of the whole population after one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// The tick that produced this frame.
    pub tick: u64,
    /// Every agent, in construction order.
    pub agents: Vec<AgentSnapshot>,
}
