//! Tick callback that reports progress and writes frame snapshots.
//!
//! Every `summary_interval_ticks` frames the sink logs a one-line summary.
//! If a snapshot path is configured it also appends one JSON-encoded
//! `FrameSnapshot` per `snapshot_interval_ticks` frames, one per line, for
//! a presentation layer to replay. A write failure is logged once and
//! disables further output; the frame loop keeps running.

use std::fs::File;
use std::io::{BufWriter, Write};

use ecotrail_core::config::{LoggingConfig, OutputConfig};
use ecotrail_core::runner::TickCallback;
use ecotrail_core::tick::{SimulationState, TickSummary};
use tracing::{debug, info, warn};

use crate::error::EngineError;

/// Callback that bridges the frame loop to logs and snapshot output.
pub struct FrameSink<W: Write + Send = BufWriter<File>> {
    /// Frames between summary log lines (0 = never).
    summary_interval: u64,

    /// Frames between snapshots (0 = never).
    snapshot_interval: u64,

    /// Snapshot destination, dropped after the first write failure.
    writer: Option<W>,

    /// First write failure, reported when the sink is finished.
    failure: Option<serde_json::Error>,

    /// Snapshots written so far.
    frames_written: u64,
}

impl FrameSink {
    /// Build a sink from configuration, opening the snapshot file if one is
    /// configured. An existing file is truncated.
    pub fn from_config(
        logging: &LoggingConfig,
        output: &OutputConfig,
    ) -> Result<Self, EngineError> {
        let writer = match output.snapshot_path {
            Some(ref path) => {
                let file = File::create(path).map_err(|source| EngineError::SnapshotOpen {
                    path: path.clone(),
                    source,
                })?;
                info!(
                    path = %path.display(),
                    interval_ticks = output.snapshot_interval_ticks,
                    "Writing frame snapshots"
                );
                Some(BufWriter::new(file))
            }
            None => None,
        };
        Ok(Self::new(
            logging.summary_interval_ticks,
            output.snapshot_interval_ticks,
            writer,
        ))
    }
}

impl<W: Write + Send> FrameSink<W> {
    /// Create a sink writing snapshots to `writer`, if given.
    pub const fn new(summary_interval: u64, snapshot_interval: u64, writer: Option<W>) -> Self {
        Self {
            summary_interval,
            snapshot_interval,
            writer,
            failure: None,
            frames_written: 0,
        }
    }

    /// Number of snapshots written so far.
    pub const fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Flush and release the writer.
    ///
    /// Returns the writer (if output is still enabled) so callers can
    /// inspect what was written.
    pub fn finish(mut self) -> Result<Option<W>, EngineError> {
        if let Some(source) = self.failure.take() {
            return Err(EngineError::SnapshotWrite { source });
        }
        if let Some(ref mut writer) = self.writer {
            writer
                .flush()
                .map_err(|source| EngineError::SnapshotFlush { source })?;
        }
        info!(frames_written = self.frames_written, "Frame output closed");
        Ok(self.writer)
    }

    fn write_frame(&mut self, state: &SimulationState, tick: u64) {
        let Some(ref mut writer) = self.writer else {
            return;
        };
        let frame = state.population.snapshot(tick);
        let result = serde_json::to_writer(&mut *writer, &frame)
            .and_then(|()| writer.write_all(b"\n").map_err(serde_json::Error::io));
        match result {
            Ok(()) => {
                self.frames_written = self.frames_written.saturating_add(1);
                debug!(tick, "Frame snapshot written");
            }
            Err(e) => {
                warn!(tick, error = %e, "Frame snapshot write failed, disabling output");
                self.writer = None;
                self.failure = Some(e);
            }
        }
    }
}

impl<W: Write + Send> TickCallback for FrameSink<W> {
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState) {
        if is_due(summary.tick, self.summary_interval) {
            info!(
                tick = summary.tick,
                agents = summary.agents,
                leader_position = ?summary.leader_position,
                mean_pursuit_distance = summary.mean_pursuit_distance,
                "Frame summary"
            );
        }
        if is_due(summary.tick, self.snapshot_interval) {
            self.write_frame(state, summary.tick);
        }
    }
}

fn is_due(tick: u64, interval: u64) -> bool {
    tick.checked_rem(interval) == Some(0)
}
