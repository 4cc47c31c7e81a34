//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps every failure mode
//! during startup, the frame loop, and frame output.

use std::path::PathBuf;

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ecotrail_core::config::ConfigError,
    },

    /// Population construction failed.
    #[error("population error: {source}")]
    Population {
        /// The underlying population error.
        #[from]
        source: ecotrail_core::population::PopulationError,
    },

    /// The frame loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: ecotrail_core::runner::RunnerError,
    },

    /// The snapshot file could not be opened.
    #[error("failed to open snapshot file {}: {source}", path.display())]
    SnapshotOpen {
        /// Path that was being opened.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Writing frame snapshots failed.
    #[error("snapshot write error: {source}")]
    SnapshotWrite {
        /// The underlying serialization or I/O error.
        #[from]
        source: serde_json::Error,
    },

    /// Flushing the snapshot file failed.
    #[error("snapshot flush error: {source}")]
    SnapshotFlush {
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Logging could not be initialized.
    #[error("logging setup error: {message}")]
    Logging {
        /// Description of the logging failure.
        message: String,
    },
}
