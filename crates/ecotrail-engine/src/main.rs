//! Frame loop binary for the Ecotrail simulation.
//!
//! Loads configuration, builds the leader/follower chain, and runs the frame
//! loop until a bound is reached or Ctrl-C requests a stop.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `ecotrail-config.yaml` (or the path given as
//!    the first argument), then apply environment overrides
//! 2. Initialize structured logging (tracing)
//! 3. Resolve the RNG seed and build the population
//! 4. Open the frame sink
//! 5. Create operator state and install the Ctrl-C stop hook
//! 6. Run the frame loop
//! 7. Close frame output and log the result

mod error;
mod frame_sink;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ecotrail_core::config::SimulationConfig;
use ecotrail_core::operator::OperatorState;
use ecotrail_core::population::Population;
use ecotrail_core::runner;
use ecotrail_core::tick::SimulationState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::frame_sink::FrameSink;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "ecotrail-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the frame loop fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration. Logging is not up yet, so remember whether a
    //    file was found and report it afterwards.
    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, loaded_from_file) = load_config(&config_path)?;

    // 2. Initialize structured logging. RUST_LOG wins over the config level.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .map_err(|e| EngineError::Logging {
            message: format!("invalid log level {:?}: {e}", config.logging.level),
        })?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!("ecotrail-engine starting");
    if loaded_from_file {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }

    // 3. Build the population.
    let seed = resolve_seed(config.world.seed);
    info!(
        seed,
        from_config = config.world.seed.is_some(),
        "RNG seed resolved (set world.seed to replay this run)"
    );

    let population = Population::seeded(
        &config.population,
        config.motion.clone(),
        config.simulation.coupling,
        seed,
    )?;
    let mut sim_state = SimulationState::new(population);

    // 4. Open frame output.
    let mut sink = FrameSink::from_config(&config.logging, &config.output)?;

    // 5. Operator state and stop hook.
    let operator = Arc::new(OperatorState::new(
        config.world.frame_interval_ms,
        &config.simulation,
    ));
    info!(
        max_ticks = operator.max_ticks(),
        max_real_time_seconds = operator.max_real_time_seconds(),
        frame_interval_ms = operator.frame_interval_ms(),
        "Operator state initialized"
    );
    spawn_stop_on_ctrl_c(Arc::clone(&operator));

    // 6. Run.
    let result = runner::run_simulation(&mut sim_state, &operator, &mut sink).await?;

    // 7. Close output and report.
    sink.finish()?;
    runner::log_simulation_end(&result);

    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        seed,
        "ecotrail-engine shutdown complete"
    );

    Ok(())
}

/// Load configuration from `path`, falling back to defaults (plus
/// environment overrides) if the file does not exist.
fn load_config(path: &Path) -> Result<(SimulationConfig, bool), EngineError> {
    if path.exists() {
        Ok((SimulationConfig::from_file(path)?, true))
    } else {
        let mut config = SimulationConfig::default();
        config.apply_env_overrides()?;
        Ok((config, false))
    }
}

/// Use the configured seed, or draw a fresh one from OS entropy.
fn resolve_seed(configured: Option<u64>) -> u64 {
    configured.unwrap_or_else(rand::random)
}

/// Request a clean stop when the process receives Ctrl-C.
fn spawn_stop_on_ctrl_c(operator: Arc<OperatorState>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, stopping after the current frame");
                operator.request_stop();
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for Ctrl-C, stop hook disabled");
            }
        }
    });
}
