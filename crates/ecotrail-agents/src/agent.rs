//! Agent state and the per-tick update.
//!
//! An [`Agent`] owns its kinematic state: position, velocity, phase and a
//! bounded [`Trail`]. Its role is fixed at construction by whether it was
//! given a leader. The leader is referenced by [`AgentId`] only; the
//! population that owns every agent resolves the id and lends the leader to
//! [`Agent::update`] read-only.

use ecotrail_types::{AgentId, AgentSnapshot, Color, Role};
use glam::DVec3;
use tracing::trace;

use crate::config::MotionConfig;
use crate::error::AgentError;
use crate::motion;
use crate::trail::Trail;

/// Randomized starting values for one agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSeed {
    /// Starting position (`z` is discarded).
    pub position: DVec3,
    /// Starting velocity (`z` is discarded).
    pub velocity: DVec3,
    /// Display color.
    pub color: Color,
    /// Oscillator phase offset in radians.
    pub phase: f64,
}

/// One simulated point agent.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    /// Construction index.
    id: AgentId,

    /// Current position; `z` is always 0.
    position: DVec3,

    /// Current velocity; `z` is always 0.
    velocity: DVec3,

    /// Recent positions, oldest first, seeded with the starting position.
    trail: Trail,

    /// Display color, not read by the motion model.
    color: Color,

    /// The agent this one follows. `None` makes it a leader for life.
    leader: Option<AgentId>,

    /// Oscillator phase. Advances every tick for leaders, constant for
    /// followers.
    phase: f64,
}

impl Agent {
    /// Create an agent from its seed values.
    ///
    /// The trail starts with the seed position and holds at most
    /// `trail_capacity` points.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::SelfLeader`] if `leader` is `id` itself.
    pub fn new(
        id: AgentId,
        seed: AgentSeed,
        leader: Option<AgentId>,
        trail_capacity: usize,
    ) -> Result<Self, AgentError> {
        if leader == Some(id) {
            return Err(AgentError::SelfLeader(id));
        }
        let position = flatten(seed.position);
        Ok(Self {
            id,
            position,
            velocity: flatten(seed.velocity),
            trail: Trail::new(position, trail_capacity),
            color: seed.color,
            leader,
            phase: seed.phase,
        })
    }

    /// Return the agent's identifier.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Return the current position.
    pub const fn position(&self) -> DVec3 {
        self.position
    }

    /// Return the current velocity.
    pub const fn velocity(&self) -> DVec3 {
        self.velocity
    }

    /// Return the trail, oldest point first.
    pub const fn trail(&self) -> &Trail {
        &self.trail
    }

    /// Return the display color.
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Return the leader this agent follows, if any.
    pub const fn leader(&self) -> Option<AgentId> {
        self.leader
    }

    /// Return the oscillator phase in radians.
    pub const fn phase(&self) -> f64 {
        self.phase
    }

    /// Return the permanent role.
    pub const fn role(&self) -> Role {
        Role::from_has_leader(self.leader.is_some())
    }

    /// Overwrite the velocity. Intended for scenario setup (e.g. pinning a
    /// leader in place); the update loop never calls it.
    pub const fn set_velocity(&mut self, velocity: DVec3) {
        self.velocity = DVec3::new(velocity.x, velocity.y, 0.0);
    }

    /// The point a follower of this agent should chase: the trail entry
    /// `lag` places back from the end, or the live position if the trail is
    /// too short to have one.
    pub fn pursuit_target(&self, lag: usize) -> DVec3 {
        self.trail.lagged(lag).unwrap_or(self.position)
    }

    /// Advance this agent by one tick.
    ///
    /// Leaders ignore `leader` entirely. Followers must be handed the agent
    /// they were wired to at construction, in whatever state the driver
    /// chooses (the population passes it already updated for this tick).
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::LeaderMismatch`] if a follower is given no
    /// leader or the wrong one. State is left untouched in that case.
    pub fn update(
        &mut self,
        time: u64,
        leader: Option<&Self>,
        config: &MotionConfig,
    ) -> Result<(), AgentError> {
        let target = match (self.leader, leader) {
            (None, _) => None,
            (Some(expected), Some(given)) if given.id == expected => {
                Some(given.pursuit_target(config.lag_samples))
            }
            (Some(expected), given) => {
                return Err(AgentError::LeaderMismatch {
                    agent: self.id,
                    expected,
                    given: given.map(Self::id),
                });
            }
        };
        self.advance(time, target, config)
    }

    /// Advance this agent by one tick toward an already-resolved pursuit
    /// target.
    ///
    /// Used when the driver snapshots leader targets up front instead of
    /// lending the leader itself. Followers require `Some(target)`; leaders
    /// require `None`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::RoleMismatch`] if the presence of `target` does
    /// not match the agent's role. State is left untouched in that case.
    pub fn advance(
        &mut self,
        time: u64,
        target: Option<DVec3>,
        config: &MotionConfig,
    ) -> Result<(), AgentError> {
        match (self.leader, target) {
            (Some(_), Some(target)) => {
                self.velocity = motion::follower_velocity(
                    self.velocity,
                    self.position,
                    target,
                    time,
                    self.phase,
                    config,
                );
            }
            (None, None) => {
                self.phase += config.phase_step;
                self.velocity = motion::leader_velocity(self.velocity, time, self.phase, config);
            }
            _ => {
                return Err(AgentError::RoleMismatch {
                    agent: self.id,
                    role: self.role(),
                });
            }
        }

        let (position, wrapped) = motion::wrap_position(self.position + self.velocity, config.bounds);
        if wrapped {
            trace!(agent = %self.id, x = position.x, y = position.y, "wrapped at domain edge");
        }
        self.position = position;
        self.trail.push(position);
        Ok(())
    }

    /// Build a serializable view of the agent's current state.
    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            role: self.role(),
            leader: self.leader,
            color: self.color,
            position: self.position,
            velocity: self.velocity,
            trail: self.trail.to_vec(),
        }
    }
}

/// Project a vector onto the `z = 0` plane.
const fn flatten(v: DVec3) -> DVec3 {
    DVec3::new(v.x, v.y, 0.0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn seed_at(x: f64, y: f64) -> AgentSeed {
        AgentSeed {
            position: DVec3::new(x, y, 0.0),
            velocity: DVec3::ZERO,
            color: Color::from_rgb24(0x00ff_8800),
            phase: 0.0,
        }
    }

    fn leader_at(x: f64, y: f64) -> Agent {
        Agent::new(AgentId::new(0), seed_at(x, y), None, 50).unwrap()
    }

    fn follower_at(x: f64, y: f64) -> Agent {
        Agent::new(AgentId::new(1), seed_at(x, y), Some(AgentId::new(0)), 50).unwrap()
    }

    #[test]
    fn new_agent_seeds_trail_and_flattens() {
        let seed = AgentSeed {
            position: DVec3::new(1.0, 2.0, 9.0),
            velocity: DVec3::new(0.1, -0.1, 5.0),
            ..seed_at(0.0, 0.0)
        };
        let agent = Agent::new(AgentId::new(3), seed, None, 50).unwrap();
        assert_eq!(agent.position(), DVec3::new(1.0, 2.0, 0.0));
        assert_eq!(agent.velocity(), DVec3::new(0.1, -0.1, 0.0));
        assert_eq!(agent.trail().len(), 1);
        assert_eq!(agent.trail().newest(), Some(agent.position()));
        assert_eq!(agent.role(), Role::Leader);
    }

    #[test]
    fn self_leader_rejected() {
        let result = Agent::new(AgentId::new(2), seed_at(0.0, 0.0), Some(AgentId::new(2)), 50);
        assert!(matches!(result, Err(AgentError::SelfLeader(_))));
    }

    #[test]
    fn leader_first_update_from_rest() {
        let cfg = MotionConfig::default();
        let mut leader = leader_at(0.0, 0.0);
        leader.update(1, None, &cfg).unwrap();

        assert!((leader.phase() - 0.02).abs() < 1e-12);
        let v = leader.velocity();
        assert!((v.x - 0.000_525).abs() < 1e-6, "{v:?}");
        assert!((v.y - 0.024_99).abs() < 1e-4, "{v:?}");
        assert_eq!(v.z, 0.0);
        assert_eq!(leader.position(), v);
        assert_eq!(leader.trail().to_vec(), vec![DVec3::ZERO, v]);
    }

    #[test]
    fn leader_ignores_supplied_agent() {
        let cfg = MotionConfig::default();
        let mut alone = leader_at(5.0, 5.0);
        let mut with_other = alone.clone();
        let stranger = follower_at(-20.0, 20.0);

        for time in 1..=100 {
            alone.update(time, None, &cfg).unwrap();
            with_other.update(time, Some(&stranger), &cfg).unwrap();
        }
        assert_eq!(alone, with_other);
    }

    #[test]
    fn follower_without_leader_is_rejected() {
        let cfg = MotionConfig::default();
        let mut follower = follower_at(1.0, 1.0);
        let before = follower.clone();
        let result = follower.update(1, None, &cfg);
        assert!(matches!(result, Err(AgentError::LeaderMismatch { given: None, .. })));
        assert_eq!(follower, before);
    }

    #[test]
    fn follower_with_wrong_leader_is_rejected() {
        let cfg = MotionConfig::default();
        let mut follower = follower_at(1.0, 1.0);
        let wrong = Agent::new(AgentId::new(9), seed_at(0.0, 0.0), None, 50).unwrap();
        let result = follower.update(1, Some(&wrong), &cfg);
        assert!(matches!(
            result,
            Err(AgentError::LeaderMismatch {
                given: Some(AgentId(9)),
                ..
            })
        ));
    }

    #[test]
    fn advance_checks_role() {
        let cfg = MotionConfig::default();
        let mut leader = leader_at(0.0, 0.0);
        assert!(matches!(
            leader.advance(1, Some(DVec3::ONE), &cfg),
            Err(AgentError::RoleMismatch { role: Role::Leader, .. })
        ));
        let mut follower = follower_at(0.0, 0.0);
        assert!(matches!(
            follower.advance(1, None, &cfg),
            Err(AgentError::RoleMismatch { role: Role::Follower, .. })
        ));
    }

    #[test]
    fn follower_short_leader_trail_targets_live_position() {
        let cfg = MotionConfig::default();
        let mut leader = leader_at(10.0, 0.0);
        for time in 1..=4 {
            leader.update(time, None, &cfg).unwrap();
        }
        assert_eq!(leader.trail().len(), 5);
        assert_eq!(leader.pursuit_target(cfg.lag_samples), leader.position());

        // Chasing the live position straight along +x at max speed.
        let mut follower = follower_at(0.0, 0.0);
        let expected = motion::follower_velocity(
            DVec3::ZERO,
            DVec3::ZERO,
            leader.position(),
            5,
            0.0,
            &cfg,
        );
        follower.update(5, Some(&leader), &cfg).unwrap();
        assert_eq!(follower.velocity(), expected);
    }

    #[test]
    fn follower_long_leader_trail_targets_lagged_entry() {
        let cfg = MotionConfig::default();
        let mut leader = leader_at(0.0, 0.0);
        for time in 1..=30 {
            leader.update(time, None, &cfg).unwrap();
        }
        let len = leader.trail().len();
        assert_eq!(len, 31);
        assert_eq!(
            leader.pursuit_target(cfg.lag_samples),
            leader.trail().get(len - 10).unwrap()
        );
    }

    #[test]
    fn follower_phase_is_constant() {
        let cfg = MotionConfig::default();
        let leader = leader_at(10.0, 10.0);
        let mut follower = follower_at(-10.0, -10.0);
        for time in 1..=20 {
            follower.update(time, Some(&leader), &cfg).unwrap();
        }
        assert_eq!(follower.phase(), 0.0);
    }

    #[test]
    fn follower_approaches_stationary_leader() {
        let cfg = MotionConfig::default();
        let leader = leader_at(20.0, 0.0);
        let mut follower = follower_at(-20.0, 0.0);
        let start = follower.position().distance(leader.position());
        for time in 1..=400 {
            follower.update(time, Some(&leader), &cfg).unwrap();
        }
        let end = follower.position().distance(leader.position());
        assert!(end < start / 4.0, "start {start}, end {end}");
    }

    #[test]
    fn trail_newest_matches_wrapped_position() {
        let cfg = MotionConfig::default();
        let seed = AgentSeed {
            velocity: DVec3::new(0.5, 0.0, 0.0),
            ..seed_at(29.9, 0.0)
        };
        let mut leader = Agent::new(AgentId::new(0), seed, None, 50).unwrap();
        leader.update(1, None, &cfg).unwrap();
        assert_eq!(leader.position().x, -30.0);
        assert_eq!(leader.trail().newest(), Some(leader.position()));
        // The jump is recorded as-is: previous point on the far edge.
        assert_eq!(leader.trail().get(0).map(|p| p.x), Some(29.9));
    }

    #[test]
    fn snapshot_reflects_state() {
        let cfg = MotionConfig::default();
        let mut leader = leader_at(1.0, 1.0);
        leader.update(1, None, &cfg).unwrap();
        let snap = leader.snapshot();
        assert_eq!(snap.id, AgentId::new(0));
        assert_eq!(snap.role, Role::Leader);
        assert_eq!(snap.leader, None);
        assert_eq!(snap.position, leader.position());
        assert_eq!(snap.trail.len(), 2);
    }
}
