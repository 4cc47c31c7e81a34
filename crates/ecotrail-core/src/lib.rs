//! Tick clock, population wiring, and the frame loop for the Ecotrail
//! simulation.
//!
//! This crate turns individual agents from `ecotrail-agents` into a running
//! chain: agent `i` follows agent `i - 1`, every agent is updated once per
//! frame in ascending index order, and an async loop paces the frames under
//! operator control.
//!
//! # Modules
//!
//! - [`clock`] -- Monotonic frame counter.
//! - [`config`] -- Configuration loading from `ecotrail-config.yaml` into
//!   strongly-typed structs.
//! - [`operator`] -- Stop hook and run bounds shared with the frame loop.
//! - [`population`] -- Agent construction, chain [`Topology`], and the
//!   per-tick pass.
//! - [`runner`] -- The async frame loop and its [`TickCallback`] hook.
//! - [`tick`] -- A single frame: advance the clock, step the population.
//!
//! [`Topology`]: population::Topology
//! [`TickCallback`]: runner::TickCallback

pub mod clock;
pub mod config;
pub mod operator;
pub mod population;
pub mod runner;
pub mod tick;
