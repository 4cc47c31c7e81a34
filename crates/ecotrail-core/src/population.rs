//! Population construction, chain topology, and the per-tick pass.
//!
//! A [`Population`] owns every [`Agent`] in construction order and a
//! [`Topology`] describing who follows whom. Agent `i` follows agent `i - 1`;
//! agent 0 is the unled head of the chain. Leaders are referenced by
//! [`AgentId`] and resolved against the ordered storage, so no agent owns or
//! outlives another.
//!
//! # Update order
//!
//! [`Population::step`] visits agents in ascending index order. Under
//! [`CouplingMode::SameTick`] each follower reads a leader that has already
//! been updated in the current tick. [`CouplingMode::PreviousTick`] instead
//! snapshots every pursuit target before the pass, so followers see their
//! leader as it stood at the end of the previous tick. The two modes produce
//! different trajectories.

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use ecotrail_agents::{Agent, AgentError, AgentSeed, MotionConfig};
use ecotrail_types::structs::MAX_RGB24;
use ecotrail_types::{AgentId, Color, FrameSnapshot};
use glam::DVec3;
use rand::rngs::StdRng;
use rand::distr::{Distribution, Uniform};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::PopulationConfig;

/// Errors that can occur while building or stepping a population.
#[derive(Debug, thiserror::Error)]
pub enum PopulationError {
    /// The population would contain no agents.
    #[error("population size must be at least 1")]
    Empty,

    /// The population size does not fit the agent id space.
    #[error("population size {0} exceeds the agent id range")]
    TooLarge(usize),

    /// A spawn distribution parameter is out of range.
    #[error("invalid spawn parameter: {field} {reason}")]
    InvalidSpawn {
        /// Name of the offending field.
        field: &'static str,
        /// Explanation of what is wrong with the value.
        reason: String,
    },

    /// An agent rejected its configuration or update.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },
}

/// Which leader state a follower reads during a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouplingMode {
    /// Followers read their leader after it has been updated this tick.
    #[default]
    SameTick,
    /// Followers read their leader as of the end of the previous tick.
    PreviousTick,
}

/// Leader links and the follower lists derived from them.
///
/// Built once at construction and never mutated. The follower lists are
/// bookkeeping only; the update pass reads leader links exclusively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    /// `leaders[i]` is the leader of agent `i`.
    leaders: Vec<Option<AgentId>>,

    /// Agents naming each key as their leader.
    followers: BTreeMap<AgentId, Vec<AgentId>>,
}

impl Topology {
    /// Build a linear chain of `count` agents: `i` follows `i - 1`.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::Empty`] for a zero count and
    /// [`PopulationError::TooLarge`] if `count` does not fit in an
    /// [`AgentId`].
    pub fn chain(count: usize) -> Result<Self, PopulationError> {
        if count == 0 {
            return Err(PopulationError::Empty);
        }
        let count_u32 = u32::try_from(count).map_err(|_err| PopulationError::TooLarge(count))?;

        let leaders: Vec<Option<AgentId>> = (0..count_u32)
            .map(|index| AgentId::new(index).predecessor())
            .collect();
        Ok(Self::from_leaders(leaders))
    }

    fn from_leaders(leaders: Vec<Option<AgentId>>) -> Self {
        let mut followers: BTreeMap<AgentId, Vec<AgentId>> = BTreeMap::new();
        for (follower, leader) in (0_u32..).zip(&leaders) {
            if let Some(leader) = leader {
                followers
                    .entry(*leader)
                    .or_default()
                    .push(AgentId::new(follower));
            }
        }
        Self { leaders, followers }
    }

    /// Number of agents in the topology.
    pub fn len(&self) -> usize {
        self.leaders.len()
    }

    /// Whether the topology is empty (never true for a built chain).
    pub fn is_empty(&self) -> bool {
        self.leaders.is_empty()
    }

    /// The leader of `id`, or `None` for the head or an unknown id.
    pub fn leader_of(&self, id: AgentId) -> Option<AgentId> {
        self.leaders.get(id.index()).copied().flatten()
    }

    /// The agents following `id`, in ascending order.
    pub fn followers_of(&self, id: AgentId) -> &[AgentId] {
        self.followers.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// The agents with no leader.
    pub fn heads(&self) -> Vec<AgentId> {
        (0_u32..)
            .zip(&self.leaders)
            .filter(|(_, leader)| leader.is_none())
            .map(|(index, _)| AgentId::new(index))
            .collect()
    }
}

/// The ordered set of agents plus the parameters that drive them.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    /// Agents in construction order; `agents[i].id() == AgentId(i)`.
    agents: Vec<Agent>,

    /// Leader links fixed at construction.
    topology: Topology,

    /// Validated motion parameters shared by every agent.
    motion: MotionConfig,

    /// Which leader state followers read.
    coupling: CouplingMode,
}

impl Population {
    /// Build a population from a seed, drawing every agent's initial state
    /// from a [`StdRng`] seeded with `seed`.
    ///
    /// The same seed and configuration always produce the same population.
    ///
    /// # Errors
    ///
    /// See [`Population::spawn`].
    pub fn seeded(
        config: &PopulationConfig,
        motion: MotionConfig,
        coupling: CouplingMode,
        seed: u64,
    ) -> Result<Self, PopulationError> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::spawn(config, motion, coupling, &mut rng)
    }

    /// Build a population with random initial state drawn from `rng`.
    ///
    /// Positions are uniform in `[-spawn_extent, spawn_extent]` and
    /// velocities uniform in `[-initial_speed, initial_speed]` on x and y;
    /// colors are uniform 24-bit RGB and phases uniform in `[0, 2π)`.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::Empty`] for a zero size,
    /// [`PopulationError::InvalidSpawn`] for a spawn parameter that is
    /// negative, non-finite or too large to draw from, and [`PopulationError::Agent`] for an invalid motion
    /// config.
    pub fn spawn<R: Rng + ?Sized>(
        config: &PopulationConfig,
        motion: MotionConfig,
        coupling: CouplingMode,
        rng: &mut R,
    ) -> Result<Self, PopulationError> {
        if config.size == 0 {
            return Err(PopulationError::Empty);
        }
        let position_range = spawn_range("spawn_extent", config.spawn_extent)?;
        let velocity_range = spawn_range("initial_speed", config.initial_speed)?;

        let seeds: Vec<AgentSeed> = (0..config.size)
            .map(|_| random_seed(&position_range, &velocity_range, rng))
            .collect();
        Self::from_seeds(seeds, motion, coupling)
    }

    /// Build a population from explicit seeds, wiring `seeds[i]` to follow
    /// `seeds[i - 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::Empty`] for no seeds and
    /// [`PopulationError::Agent`] if `motion` fails validation.
    pub fn from_seeds(
        seeds: Vec<AgentSeed>,
        motion: MotionConfig,
        coupling: CouplingMode,
    ) -> Result<Self, PopulationError> {
        motion.validate()?;
        let topology = Topology::chain(seeds.len())?;

        let agents = (0_u32..)
            .zip(seeds)
            .map(|(index, seed)| {
                let id = AgentId::new(index);
                Agent::new(id, seed, topology.leader_of(id), motion.trail_capacity)
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            agents = agents.len(),
            trail_capacity = motion.trail_capacity,
            bounds = motion.bounds,
            lag_samples = motion.lag_samples,
            coupling = ?coupling,
            "Population built"
        );

        Ok(Self {
            agents,
            topology,
            motion,
            coupling,
        })
    }

    /// Advance every agent by one tick, in ascending index order.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::Agent`] if an agent's leader cannot be
    /// resolved, which cannot happen for a population built by this module.
    pub fn step(&mut self, time: u64) -> Result<(), PopulationError> {
        match self.coupling {
            CouplingMode::SameTick => self.step_same_tick(time),
            CouplingMode::PreviousTick => self.step_previous_tick(time),
        }
    }

    fn step_same_tick(&mut self, time: u64) -> Result<(), PopulationError> {
        for index in 0..self.agents.len() {
            let (before, rest) = self.agents.split_at_mut(index);
            let Some((agent, _)) = rest.split_first_mut() else {
                break;
            };
            // Leaders always precede their followers, so the leader has
            // already moved this tick.
            let leader = agent.leader().and_then(|id| before.get(id.index()));
            agent.update(time, leader, &self.motion)?;
        }
        debug!(tick = time, agents = self.agents.len(), "Population stepped");
        Ok(())
    }

    fn step_previous_tick(&mut self, time: u64) -> Result<(), PopulationError> {
        let targets: Vec<Option<DVec3>> = self
            .agents
            .iter()
            .map(|agent| {
                agent
                    .leader()
                    .and_then(|id| self.agents.get(id.index()))
                    .map(|leader| leader.pursuit_target(self.motion.lag_samples))
            })
            .collect();

        for (agent, target) in self.agents.iter_mut().zip(targets) {
            agent.advance(time, target, &self.motion)?;
        }
        debug!(
            tick = time,
            agents = self.agents.len(),
            "Population stepped from previous-tick targets"
        );
        Ok(())
    }

    /// All agents in construction order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Look up an agent by id.
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.index())
    }

    /// Look up an agent by id for scenario setup.
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id.index())
    }

    /// Number of agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the population is empty (never true once built).
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// The chain topology.
    pub const fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Distance from each follower to the point it is chasing, averaged
    /// over all followers. `None` when there are no followers.
    pub fn mean_pursuit_distance(&self) -> Option<f64> {
        let lag = self.motion.lag_samples;
        let distances: Vec<f64> = self
            .agents
            .iter()
            .filter_map(|agent| {
                let leader = self.get(agent.leader()?)?;
                Some(agent.position().distance(leader.pursuit_target(lag)))
            })
            .collect();
        let count = u32::try_from(distances.len()).ok().filter(|n| *n > 0)?;
        Some(distances.iter().sum::<f64>() / f64::from(count))
    }

    /// Build a serializable view of every agent at `tick`.
    pub fn snapshot(&self, tick: u64) -> FrameSnapshot {
        FrameSnapshot {
            tick,
            agents: self.agents.iter().map(Agent::snapshot).collect(),
        }
    }
}

/// Build the symmetric draw range `[-value, value]`. Rejects negative and
/// non-finite values, and values whose range width overflows.
fn spawn_range(field: &'static str, value: f64) -> Result<Uniform<f64>, PopulationError> {
    Uniform::new_inclusive(-value, value).map_err(|e| PopulationError::InvalidSpawn {
        field,
        reason: format!("{value} does not give a usable range: {e}"),
    })
}

fn random_seed<R: Rng + ?Sized>(
    position_range: &Uniform<f64>,
    velocity_range: &Uniform<f64>,
    rng: &mut R,
) -> AgentSeed {
    let position = DVec3::new(position_range.sample(rng), position_range.sample(rng), 0.0);
    let color = Color::from_rgb24(rng.random_range(0..=MAX_RGB24));
    let velocity = DVec3::new(velocity_range.sample(rng), velocity_range.sample(rng), 0.0);
    let phase = rng.random_range(0.0..TAU);
    AgentSeed {
        position,
        velocity,
        color,
        phase,
    }
}
