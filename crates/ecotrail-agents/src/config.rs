//! Tunable parameters for the motion model.
//!
//! [`MotionConfig`] bundles every constant the per-tick update reads so that
//! callers (the population builder, tests, the YAML loader in
//! `ecotrail-core`) can override the defaults. Call [`MotionConfig::validate`]
//! before building agents; the update path assumes a validated config.

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Configuration for agent motion applied each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Maximum number of points kept in each trail (default: 50).
    pub trail_capacity: usize,

    /// Half-width of the square wrap domain (default: 30).
    pub bounds: f64,

    /// Per-tick smoothing weight toward a follower's desired velocity
    /// (default: 0.1).
    pub follower_blend: f64,

    /// Per-tick smoothing weight toward the leader's desired velocity
    /// (default: 0.05).
    pub leader_blend: f64,

    /// Follower speed floor (default: 0.05).
    pub min_speed: f64,

    /// Follower speed ceiling (default: 0.2).
    pub max_speed: f64,

    /// How many trail entries back from the end a follower aims at
    /// (default: 10).
    pub lag_samples: usize,

    /// Follower speed per unit of distance to its target, before clamping
    /// (default: 0.1).
    pub speed_gain: f64,

    /// Radians added to a leader's phase every tick (default: 0.02).
    pub phase_step: f64,

    /// Angular frequency of the leader's x oscillator, per tick
    /// (default: 0.001).
    pub leader_frequency_x: f64,

    /// Angular frequency of the leader's y oscillator, per tick
    /// (default: 0.0015).
    pub leader_frequency_y: f64,

    /// Magnitude of the leader's desired velocity on each axis (default: 0.5).
    pub leader_amplitude: f64,

    /// Angular frequency of a follower's lateral wobble, per tick
    /// (default: 0.002).
    pub wobble_frequency: f64,

    /// Strength of a follower's lateral wobble relative to its heading
    /// (default: 0.5).
    pub wobble_amplitude: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            trail_capacity: 50,
            bounds: 30.0,
            follower_blend: 0.1,
            leader_blend: 0.05,
            min_speed: 0.05,
            max_speed: 0.2,
            lag_samples: 10,
            speed_gain: 0.1,
            phase_step: 0.02,
            leader_frequency_x: 0.001,
            leader_frequency_y: 0.0015,
            leader_amplitude: 0.5,
            wobble_frequency: 0.002,
            wobble_amplitude: 0.5,
        }
    }
}

impl MotionConfig {
    /// Check every parameter against its valid range.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidConfig`] naming the first field that is
    /// out of range.
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.trail_capacity == 0 {
            return Err(invalid("trail_capacity", "must be at least 1"));
        }
        require_positive("bounds", self.bounds)?;
        require_unit_blend("follower_blend", self.follower_blend)?;
        require_unit_blend("leader_blend", self.leader_blend)?;
        require_non_negative("min_speed", self.min_speed)?;
        require_non_negative("max_speed", self.max_speed)?;
        if self.min_speed > self.max_speed {
            return Err(invalid(
                "min_speed",
                format!(
                    "({}) must not exceed max_speed ({})",
                    self.min_speed, self.max_speed
                ),
            ));
        }
        require_non_negative("speed_gain", self.speed_gain)?;
        for (field, value) in [
            ("phase_step", self.phase_step),
            ("leader_frequency_x", self.leader_frequency_x),
            ("leader_frequency_y", self.leader_frequency_y),
            ("leader_amplitude", self.leader_amplitude),
            ("wobble_frequency", self.wobble_frequency),
            ("wobble_amplitude", self.wobble_amplitude),
        ] {
            require_finite(field, value)?;
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> AgentError {
    AgentError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}

fn require_finite(field: &'static str, value: f64) -> Result<(), AgentError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("must be finite, got {value}")))
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), AgentError> {
    require_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be positive, got {value}")))
    }
}

fn require_non_negative(field: &'static str, value: f64) -> Result<(), AgentError> {
    require_finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must not be negative, got {value}")))
    }
}

fn require_unit_blend(field: &'static str, value: f64) -> Result<(), AgentError> {
    require_finite(field, value)?;
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be in (0, 1], got {value}")))
    }
}
