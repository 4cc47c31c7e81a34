//! Cross-module properties of a running population.
//!
//! These drive whole populations through many frames with seeded randomness
//! and check the invariants every frame must hold.

#![allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]

use ecotrail_agents::{AgentSeed, MotionConfig};
use ecotrail_core::config::PopulationConfig;
use ecotrail_core::population::{CouplingMode, Population};
use ecotrail_core::tick::{SimulationState, run_tick};
use ecotrail_types::{AgentId, Color};
use glam::DVec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn population(size: u32, seed: u64, motion: MotionConfig, coupling: CouplingMode) -> Population {
    let cfg = PopulationConfig {
        size,
        ..PopulationConfig::default()
    };
    Population::seeded(&cfg, motion, coupling, seed).unwrap()
}

fn run(pop: Population, ticks: u64) -> SimulationState {
    let mut state = SimulationState::new(pop);
    for _ in 0..ticks {
        let _ = run_tick(&mut state).unwrap();
    }
    state
}

#[test]
fn positions_stay_inside_the_domain() {
    // A small domain forces frequent wraps.
    let motion = MotionConfig {
        bounds: 2.0,
        ..MotionConfig::default()
    };
    let pop = population(25, 11, motion.clone(), CouplingMode::SameTick);
    let mut state = SimulationState::new(pop);

    let mut wrapped_somewhere = false;
    for _ in 0..2_000 {
        let before: Vec<DVec3> = state
            .population
            .agents()
            .iter()
            .map(|a| a.position())
            .collect();
        let _ = run_tick(&mut state).unwrap();
        for (agent, prev) in state.population.agents().iter().zip(&before) {
            let p = agent.position();
            assert!(p.x.abs() <= motion.bounds, "x out of range: {p}");
            assert!(p.y.abs() <= motion.bounds, "y out of range: {p}");
            assert_eq!(p.z, 0.0);
            assert_eq!(agent.velocity().z, 0.0);
            if (p - *prev).length() > motion.bounds {
                wrapped_somewhere = true;
            }
        }
    }
    assert!(wrapped_somewhere, "expected at least one wrap in 2000 frames");
}

#[test]
fn trails_are_bounded_and_fill_to_capacity() {
    let motion = MotionConfig {
        trail_capacity: 8,
        ..MotionConfig::default()
    };
    let pop = population(5, 3, motion, CouplingMode::SameTick);
    let mut state = SimulationState::new(pop);

    for tick in 1..=20_usize {
        let _ = run_tick(&mut state).unwrap();
        for agent in state.population.agents() {
            let trail = agent.trail();
            assert!(!trail.is_empty());
            assert_eq!(trail.len(), (tick + 1).min(8));
            assert_eq!(trail.newest(), Some(agent.position()));
        }
    }
}

#[test]
fn trail_evicts_oldest_first() {
    let motion = MotionConfig {
        trail_capacity: 4,
        ..MotionConfig::default()
    };
    let pop = population(2, 5, motion, CouplingMode::SameTick);
    let mut state = SimulationState::new(pop);

    let mut history: Vec<Vec<DVec3>> = vec![Vec::new(); 2];
    for (agent, positions) in state.population.agents().iter().zip(history.iter_mut()) {
        positions.push(agent.position());
    }
    for _ in 0..10 {
        let _ = run_tick(&mut state).unwrap();
        for (agent, positions) in state.population.agents().iter().zip(history.iter_mut()) {
            positions.push(agent.position());
        }
    }

    for (agent, positions) in state.population.agents().iter().zip(&history) {
        let expected = &positions[positions.len() - 4..];
        assert_eq!(agent.trail().to_vec(), expected);
    }
}

#[test]
fn leader_ignores_its_followers() {
    // The first agent drawn from a seed is the same regardless of how many
    // follow it, so a lone leader must trace the same path as a chain head.
    let chain = run(population(25, 77, MotionConfig::default(), CouplingMode::SameTick), 500);
    let alone = run(population(1, 77, MotionConfig::default(), CouplingMode::SameTick), 500);

    let head = chain.population.get(AgentId::new(0)).unwrap();
    let lone = alone.population.get(AgentId::new(0)).unwrap();
    assert_eq!(head, lone);
}

#[test]
fn leader_ignores_coupling_mode() {
    let same = run(population(10, 8, MotionConfig::default(), CouplingMode::SameTick), 300);
    let previous = run(
        population(10, 8, MotionConfig::default(), CouplingMode::PreviousTick),
        300,
    );
    assert_eq!(
        same.population.get(AgentId::new(0)),
        previous.population.get(AgentId::new(0))
    );
}

#[test]
fn coupling_modes_diverge_for_followers() {
    let same = run(population(10, 8, MotionConfig::default(), CouplingMode::SameTick), 300);
    let previous = run(
        population(10, 8, MotionConfig::default(), CouplingMode::PreviousTick),
        300,
    );
    assert_ne!(
        same.population.get(AgentId::new(9)),
        previous.population.get(AgentId::new(9))
    );
}

#[test]
fn same_seed_replays_bit_identically() {
    let a = run(population(25, 1234, MotionConfig::default(), CouplingMode::SameTick), 1_000);
    let b = run(population(25, 1234, MotionConfig::default(), CouplingMode::SameTick), 1_000);

    for (x, y) in a.population.agents().iter().zip(b.population.agents()) {
        assert_eq!(x.position().x.to_bits(), y.position().x.to_bits());
        assert_eq!(x.position().y.to_bits(), y.position().y.to_bits());
        assert_eq!(x.velocity().x.to_bits(), y.velocity().x.to_bits());
        assert_eq!(x.velocity().y.to_bits(), y.velocity().y.to_bits());
        assert_eq!(x.phase().to_bits(), y.phase().to_bits());
    }
    assert_eq!(a.population.snapshot(1_000), b.population.snapshot(1_000));
}

#[test]
fn spawn_from_any_rng_is_reproducible() {
    let cfg = PopulationConfig::default();
    let mut rng_a = SmallRng::seed_from_u64(5);
    let mut rng_b = SmallRng::seed_from_u64(5);
    let a = Population::spawn(&cfg, MotionConfig::default(), CouplingMode::SameTick, &mut rng_a)
        .unwrap();
    let b = Population::spawn(&cfg, MotionConfig::default(), CouplingMode::SameTick, &mut rng_b)
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn follower_closes_in_on_a_pinned_leader() {
    let seeds = vec![
        AgentSeed {
            position: DVec3::ZERO,
            velocity: DVec3::new(0.3, -0.2, 0.0),
            color: Color::from_rgb24(0x00ff_0000),
            phase: 0.0,
        },
        AgentSeed {
            position: DVec3::new(-15.0, 10.0, 0.0),
            velocity: DVec3::ZERO,
            color: Color::from_rgb24(0x0000_ff00),
            phase: 1.0,
        },
    ];
    // No oscillator pull; the seeded leader velocity is cleared every tick.
    let motion = MotionConfig {
        leader_amplitude: 0.0,
        ..MotionConfig::default()
    };
    let mut state = SimulationState::new(
        Population::from_seeds(seeds, motion, CouplingMode::SameTick).unwrap(),
    );

    let mut samples = vec![state.population.mean_pursuit_distance().unwrap()];
    for tick in 1..=600 {
        state
            .population
            .get_mut(AgentId::new(0))
            .unwrap()
            .set_velocity(DVec3::ZERO);
        let _ = run_tick(&mut state).unwrap();
        assert_eq!(state.population.agents()[0].position(), DVec3::ZERO);
        if tick % 25 == 0 {
            samples.push(state.population.mean_pursuit_distance().unwrap());
        }
    }

    // While far out the follower runs at max speed, so every 25-tick
    // window ends closer than it started.
    let approach: Vec<f64> = samples.iter().copied().take_while(|d| *d > 3.0).collect();
    assert!(approach.len() >= 3, "samples {samples:?}");
    for pair in approach.windows(2) {
        assert!(pair[1] < pair[0], "samples {samples:?}");
    }
    // Once captured it stays near the target.
    let captured = &samples[approach.len()..];
    assert!(!captured.is_empty(), "samples {samples:?}");
    assert!(captured.iter().all(|d| *d <= 3.0), "samples {samples:?}");

    let start = samples[0];
    let end = *samples.last().unwrap();
    assert!(end < start / 4.0, "start {start}, end {end}");
}

#[test]
fn spread_seeds_keep_every_follower_on_its_predecessor() {
    let mut rng = SmallRng::seed_from_u64(99);
    let seeds: Vec<AgentSeed> = (0..12)
        .map(|_| AgentSeed {
            position: DVec3::new(rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0), 0.0),
            velocity: DVec3::ZERO,
            color: Color::from_rgb24(rng.random_range(0..=0x00ff_ffff)),
            phase: rng.random_range(0.0..1.0),
        })
        .collect();
    let pop = Population::from_seeds(seeds, MotionConfig::default(), CouplingMode::SameTick)
        .unwrap();

    for (index, agent) in (0_u32..).zip(pop.agents()) {
        assert_eq!(agent.id(), AgentId::new(index));
        assert_eq!(agent.leader(), AgentId::new(index).predecessor());
    }
    let frame = pop.snapshot(0);
    assert_eq!(frame.agents.len(), 12);
}
