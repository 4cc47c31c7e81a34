//! The per-tick motion model.
//!
//! Pure functions that turn an agent's current kinematic state into the next
//! one. [`Agent`](crate::Agent) strings them together; keeping them free of
//! agent state makes each step testable on its own.
//!
//! - **Leader**: a two-frequency oscillator drives a desired velocity that the
//!   agent eases toward ([`leader_velocity`]).
//! - **Follower**: heads for a lagged point on its leader's trail, weaves
//!   sideways with a per-agent phase, and eases toward a distance-scaled
//!   speed ([`follower_velocity`]).
//! - **Both**: integrate, then hard-wrap at the domain edge ([`wrap_position`]).

use glam::DVec3;

use crate::config::MotionConfig;

/// Convert a tick counter to the real-valued time the oscillators read.
#[allow(clippy::cast_precision_loss)]
pub fn tick_time(time: u64) -> f64 {
    // Exact below 2^53 ticks, far past any realistic run.
    time as f64
}

/// Desired velocity of a free-roaming leader at `time` with phase `phase`.
///
/// Each axis oscillates at its own frequency so the path traces a slowly
/// drifting Lissajous-like figure.
pub fn leader_direction(time: u64, phase: f64, config: &MotionConfig) -> DVec3 {
    let t = tick_time(time);
    DVec3::new(
        (t * config.leader_frequency_x + phase).sin() * config.leader_amplitude,
        (t * config.leader_frequency_y + phase).cos() * config.leader_amplitude,
        0.0,
    )
}

/// New leader velocity: `current` eased toward [`leader_direction`] by the
/// leader blend factor.
pub fn leader_velocity(current: DVec3, time: u64, phase: f64, config: &MotionConfig) -> DVec3 {
    current.lerp(leader_direction(time, phase, config), config.leader_blend)
}

/// Desired velocity of a follower at `position` chasing `target`.
///
/// The heading is the unit vector to the target plus a perpendicular wobble
/// of `sin(time * wobble_frequency + phase) * wobble_amplitude`; its
/// magnitude scales with distance and is clamped to
/// `[min_speed, max_speed]`. A follower sitting exactly on its target has no
/// heading and gets the zero vector.
pub fn follower_direction(
    position: DVec3,
    target: DVec3,
    time: u64,
    phase: f64,
    config: &MotionConfig,
) -> DVec3 {
    let offset = target - position;
    let distance = offset.length();

    let heading = if distance > 0.0 {
        let unit = offset / distance;
        let perpendicular = DVec3::new(-unit.y, unit.x, 0.0);
        let oscillation = (tick_time(time) * config.wobble_frequency + phase).sin()
            * config.wobble_amplitude;
        unit + perpendicular * oscillation
    } else {
        DVec3::ZERO
    };

    let speed = (distance * config.speed_gain).clamp(config.min_speed, config.max_speed);
    heading * speed
}

/// New follower velocity: `current` eased toward [`follower_direction`] by
/// the follower blend factor.
pub fn follower_velocity(
    current: DVec3,
    position: DVec3,
    target: DVec3,
    time: u64,
    phase: f64,
    config: &MotionConfig,
) -> DVec3 {
    current.lerp(
        follower_direction(position, target, time, phase, config),
        config.follower_blend,
    )
}

/// Teleport a coordinate that has left `[-bounds, bounds]` to the opposite
/// edge. Coordinates inside the range are returned unchanged.
pub fn wrap_axis(value: f64, bounds: f64) -> f64 {
    if value > bounds {
        -bounds
    } else if value < -bounds {
        bounds
    } else {
        value
    }
}

/// Wrap `x` and `y` independently and pin `z` to the plane.
///
/// Returns the corrected position and whether any axis was teleported.
pub fn wrap_position(position: DVec3, bounds: f64) -> (DVec3, bool) {
    let x = wrap_axis(position.x, bounds);
    let y = wrap_axis(position.y, bounds);
    let wrapped = x.to_bits() != position.x.to_bits() || y.to_bits() != position.y.to_bits();
    (DVec3::new(x, y, 0.0), wrapped)
}
