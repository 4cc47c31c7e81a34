//! Frame loop runner.
//!
//! [`run_simulation`] drives [`run_tick`] once per frame, sleeping the
//! configured frame interval in between. The loop ends after `max_ticks`
//! or `max_real_time_seconds`, or before the next frame once a stop has
//! been requested.
//!
//! With both bounds at 0 the loop runs until a stop is requested.
//!
//! [`run_tick`]: crate::tick::run_tick

use std::sync::Arc;

use tracing::{info, warn};

use crate::operator::{OperatorState, SimulationEndReason};
use crate::tick::{self, SimulationState, TickError, TickSummary};

/// Errors that can occur during the run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A frame failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Result of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    /// The reason the loop ended.
    pub end_reason: SimulationEndReason,
    /// The last frame summary, if any frame completed.
    pub final_summary: Option<TickSummary>,
    /// Number of frames executed by this run.
    pub total_ticks: u64,
}

/// Callback invoked after each frame completes.
///
/// The engine uses this to log summaries and write frame snapshots for a
/// presentation layer. The callback sees the post-update state, so every
/// agent's `position` and full trail are current.
pub trait TickCallback: Send {
    /// Called after a frame completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState);
}

/// A callback that does nothing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {}
}

/// Run the frame loop until a termination condition is met.
///
/// # Errors
///
/// Returns [`RunnerError`] if a frame fails.
pub async fn run_simulation(
    state: &mut SimulationState,
    operator: &Arc<OperatorState>,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        agents = state.population.len(),
        start_tick = state.clock.tick(),
        max_ticks = operator.max_ticks(),
        max_real_time_seconds = operator.max_real_time_seconds(),
        frame_interval_ms = operator.frame_interval_ms(),
        "Simulation starting"
    );

    loop {
        if operator.is_stop_requested() {
            info!(tick = state.clock.tick(), "Stop requested");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::OperatorStop,
                final_summary: last_summary,
                total_ticks,
            });
        }

        if operator.time_limit_reached() {
            info!(
                max_seconds = operator.max_real_time_seconds(),
                elapsed = operator.elapsed_seconds(),
                "Real-time limit reached"
            );
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::MaxRealTimeReached,
                final_summary: last_summary,
                total_ticks,
            });
        }

        let summary = tick::run_tick(state)?;
        total_ticks = total_ticks.saturating_add(1);

        callback.on_tick(&summary, state);

        // summary.tick is the tick that just ran, so max_ticks = 5 stops
        // after tick 5 has been drawn.
        if operator.tick_limit_reached(summary.tick) {
            info!(
                tick = summary.tick,
                max_ticks = operator.max_ticks(),
                "Tick limit reached"
            );
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::MaxTicksReached,
                final_summary: Some(summary),
                total_ticks,
            });
        }

        last_summary = Some(summary);

        let interval_ms = operator.frame_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        } else {
            // Keep a zero-interval loop from starving the stop handler.
            tokio::task::yield_now().await;
        }
    }
}

/// Log the end of a run.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            agents = summary.agents,
            leader_position = ?summary.leader_position,
            mean_pursuit_distance = summary.mean_pursuit_distance,
            "Final frame summary"
        );
    } else {
        warn!("Simulation ended with no frames executed");
    }
}
