//! Frame clock for the Ecotrail simulation.
//!
//! The clock is the single source of truth for the tick counter handed to
//! every agent update. It starts at 0 and is advanced *before* each frame's
//! updates, so the first frame runs with tick 1.
//!
//! All arithmetic is checked: the counter never wraps silently.

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,
}

/// Monotonic frame counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickClock {
    /// Ticks completed so far (0 before the first frame).
    tick: u64,
}

impl TickClock {
    /// Create a clock that has not run any frame yet.
    pub const fn new() -> Self {
        Self { tick: 0 }
    }

    /// Create a clock positioned at an explicit tick (useful for tests and
    /// replaying a recorded run from the middle).
    pub const fn from_tick(tick: u64) -> Self {
        Self { tick }
    }

    /// Advance the clock by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Whether at least one frame has run.
    pub const fn has_started(&self) -> bool {
        self.tick > 0
    }
}
