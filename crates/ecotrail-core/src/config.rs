//! Configuration loading and typed config structures for the Ecotrail
//! simulation.
//!
//! The canonical configuration lives in `ecotrail-config.yaml` next to the
//! engine binary. Every key is optional; a missing file or section yields the
//! default values (25 agents, 50-point trails, a 30-unit wrap domain).
//!
//! Range checks are not done here: the population builder validates
//! everything it consumes and fails fast before the first frame.

use std::path::{Path, PathBuf};

use ecotrail_agents::MotionConfig;
use serde::Deserialize;

use crate::population::CouplingMode;

/// Environment variable that overrides `world.seed`.
pub const SEED_ENV: &str = "ECOTRAIL_SEED";

/// Environment variable that overrides `output.snapshot_path`.
pub const SNAPSHOT_PATH_ENV: &str = "ECOTRAIL_SNAPSHOT_PATH";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override held a value that could not be parsed.
    #[error("invalid value {value:?} in environment variable {var}")]
    EnvOverride {
        /// The variable name.
        var: &'static str,
        /// The raw value found.
        value: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `ecotrail-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Seed and frame pacing.
    #[serde(default)]
    pub world: WorldConfig,

    /// Population size and spawn distribution.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Motion model parameters.
    #[serde(default)]
    pub motion: MotionConfig,

    /// Run boundaries and coupling mode.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Frame snapshot output for an external presentation layer.
    #[serde(default)]
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `ECOTRAIL_SEED` overrides `world.seed`
    /// - `ECOTRAIL_SNAPSHOT_PATH` overrides `output.snapshot_path`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::EnvOverride`] if an override cannot be parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides are
    /// applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EnvOverride`] if `ECOTRAIL_SEED` is set but is
    /// not an unsigned integer.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|var| std::env::var(var).ok())
    }

    /// Apply overrides using `lookup` to read variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EnvOverride`] if the seed override is not an
    /// unsigned integer.
    pub fn apply_overrides_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(raw) = lookup(SEED_ENV) {
            let seed = raw.trim().parse::<u64>().map_err(|_err| ConfigError::EnvOverride {
                var: SEED_ENV,
                value: raw.clone(),
            })?;
            self.world.seed = Some(seed);
        }
        if let Some(path) = lookup(SNAPSHOT_PATH_ENV) {
            self.output.snapshot_path = Some(PathBuf::from(path));
        }
        Ok(())
    }
}

/// Seed and frame pacing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Seed for the initial-state RNG. `None` draws one from OS entropy; the
    /// engine logs the seed it used so the run can be replayed.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Real-time milliseconds between frames (0 = as fast as possible).
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: None,
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

/// Population size and spawn distribution.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PopulationConfig {
    /// Number of agents in the chain (must be at least 1).
    #[serde(default = "default_population_size")]
    pub size: u32,

    /// Initial positions are uniform in `[-spawn_extent, spawn_extent]` on
    /// each axis.
    #[serde(default = "default_spawn_extent")]
    pub spawn_extent: f64,

    /// Initial velocities are uniform in `[-initial_speed, initial_speed]`
    /// on each axis.
    #[serde(default = "default_initial_speed")]
    pub initial_speed: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: default_population_size(),
            spawn_extent: default_spawn_extent(),
            initial_speed: default_initial_speed(),
        }
    }
}

/// Run boundaries and coupling mode.
///
/// A value of 0 for either limit means unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Maximum number of ticks before the run ends (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Maximum wall-clock seconds before the run ends (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,

    /// Whether followers read their leader's state from this tick
    /// (`same_tick`, the default) or from the end of the
    /// previous tick (`previous_tick`). The two produce different
    /// trajectories.
    #[serde(default)]
    pub coupling: CouplingMode,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit an info-level population summary every N ticks (0 = never).
    #[serde(default = "default_summary_interval_ticks")]
    pub summary_interval_ticks: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            summary_interval_ticks: default_summary_interval_ticks(),
        }
    }
}

/// Frame snapshot output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// File to write one JSON frame snapshot per line to, truncated at
    /// startup. `None` disables snapshot output.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    /// Write a snapshot every N ticks (0 = never).
    #[serde(default = "default_snapshot_interval_ticks")]
    pub snapshot_interval_ticks: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            snapshot_interval_ticks: default_snapshot_interval_ticks(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_frame_interval_ms() -> u64 {
    16
}

const fn default_population_size() -> u32 {
    25
}

const fn default_spawn_extent() -> f64 {
    20.0
}

const fn default_initial_speed() -> f64 {
    0.1
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_summary_interval_ticks() -> u64 {
    600
}

const fn default_snapshot_interval_ticks() -> u64 {
    1
}
