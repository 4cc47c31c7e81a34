//! One frame of the Ecotrail simulation.
//!
//! Each call to [`run_tick`] advances the [`TickClock`] first and then steps
//! the whole [`Population`] with the new tick value, so the first frame
//! updates agents with `time = 1`. The frame is deterministic given the
//! population state and the clock.

use ecotrail_types::AgentId;
use glam::DVec3;
use tracing::debug;

use crate::clock::{ClockError, TickClock};
use crate::population::{Population, PopulationError};

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The population update failed.
    #[error("population error: {source}")]
    Population {
        /// The underlying population error.
        #[from]
        source: PopulationError,
    },
}

/// The mutable simulation state passed through the frame loop.
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// The frame clock.
    pub clock: TickClock,
    /// Every agent and the chain linking them.
    pub population: Population,
}

impl SimulationState {
    /// Wrap a freshly built population with a clock at tick 0.
    pub const fn new(population: Population) -> Self {
        Self {
            clock: TickClock::new(),
            population,
        }
    }
}

/// Summary of a single frame's execution.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Number of agents updated.
    pub agents: usize,
    /// Head of the chain, if the population has one.
    pub leader: Option<AgentId>,
    /// The head's position after the update.
    pub leader_position: Option<DVec3>,
    /// Mean distance from each follower to its pursuit target after the
    /// update. `None` for a population with no followers.
    pub mean_pursuit_distance: Option<f64>,
}

/// Execute one frame: advance the clock, then update every agent.
///
/// # Errors
///
/// Returns [`TickError::Clock`] if the tick counter would overflow and
/// [`TickError::Population`] if an agent update fails. The population is
/// not stepped when the clock fails.
pub fn run_tick(state: &mut SimulationState) -> Result<TickSummary, TickError> {
    let tick = state.clock.advance()?;
    state.population.step(tick)?;

    let leader = state.population.topology().heads().first().copied();
    let leader_position = leader
        .and_then(|id| state.population.get(id))
        .map(ecotrail_agents::Agent::position);
    let mean_pursuit_distance = state.population.mean_pursuit_distance();

    debug!(
        tick,
        agents = state.population.len(),
        mean_pursuit_distance,
        "Tick completed"
    );

    Ok(TickSummary {
        tick,
        agents: state.population.len(),
        leader,
        leader_position,
        mean_pursuit_distance,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use ecotrail_agents::MotionConfig;

    use super::*;
    use crate::config::PopulationConfig;
    use crate::population::CouplingMode;

    fn make_state(size: u32, seed: u64) -> SimulationState {
        let cfg = PopulationConfig {
            size,
            ..PopulationConfig::default()
        };
        let population =
            Population::seeded(&cfg, MotionConfig::default(), CouplingMode::SameTick, seed)
                .unwrap();
        SimulationState::new(population)
    }

    #[test]
    fn first_tick_is_one() {
        let mut state = make_state(3, 1);
        let summary = run_tick(&mut state).unwrap();
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.agents, 3);
        assert_eq!(summary.leader, Some(AgentId::new(0)));
        assert_eq!(state.clock.tick(), 1);
    }

    #[test]
    fn leader_position_reported() {
        let mut state = make_state(3, 1);
        let summary = run_tick(&mut state).unwrap();
        let head = state.population.get(AgentId::new(0)).unwrap();
        assert_eq!(summary.leader_position, Some(head.position()));
        assert!(summary.mean_pursuit_distance.is_some());
    }

    #[test]
    fn each_tick_extends_trails() {
        let mut state = make_state(4, 2);
        for _ in 0..5 {
            let _ = run_tick(&mut state).unwrap();
        }
        assert_eq!(state.clock.tick(), 5);
        for agent in state.population.agents() {
            assert_eq!(agent.trail().len(), 6);
        }
    }

    #[test]
    fn clock_overflow_leaves_population_untouched() {
        let mut state = make_state(2, 3);
        state.clock = TickClock::from_tick(u64::MAX);
        let before = state.population.clone();
        let result = run_tick(&mut state);
        assert!(matches!(result, Err(TickError::Clock { .. })));
        assert_eq!(state.population, before);
    }

    #[test]
    fn single_agent_has_no_pursuit_distance() {
        let mut state = make_state(1, 4);
        let summary = run_tick(&mut state).unwrap();
        assert_eq!(summary.mean_pursuit_distance, None);
        assert_eq!(summary.leader, Some(AgentId::new(0)));
    }
}
