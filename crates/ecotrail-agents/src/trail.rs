//! Bounded position history.
//!
//! A [`Trail`] is a FIFO of positions, oldest first, that never holds more
//! than its capacity and never becomes empty: it is seeded with the agent's
//! starting position and only ever evicts when a push overflows it.

use std::collections::VecDeque;

use glam::DVec3;

/// Number of `f32` slots one point occupies in an interleaved xyz buffer.
pub const FLOATS_PER_POINT: usize = 3;

/// Capacity-bounded, never-empty history of positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Trail {
    /// Points, oldest at the front.
    points: VecDeque<DVec3>,

    /// Maximum number of points retained (at least 1).
    capacity: usize,
}

impl Trail {
    /// Create a trail holding only `origin`.
    ///
    /// A zero `capacity` is treated as 1 so the trail can never be empty.
    pub fn new(origin: DVec3, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut points = VecDeque::with_capacity(capacity.saturating_add(1));
        points.push_back(origin);
        Self { points, capacity }
    }

    /// Append `point` as the newest entry, evicting the oldest entry if the
    /// trail is over capacity. Returns the evicted point, if any.
    pub fn push(&mut self, point: DVec3) -> Option<DVec3> {
        self.points.push_back(point);
        if self.points.len() > self.capacity {
            self.points.pop_front()
        } else {
            None
        }
    }

    /// Number of points currently held, in `1..=capacity`.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; present for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Maximum number of points retained.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// The most recently pushed point.
    pub fn newest(&self) -> Option<DVec3> {
        self.points.back().copied()
    }

    /// The point at `index`, counting from the oldest.
    pub fn get(&self, index: usize) -> Option<DVec3> {
        self.points.get(index).copied()
    }

    /// The entry `lag` places back from the end of the trail, i.e. at index
    /// `len - lag`.
    ///
    /// Returns `None` when the trail holds fewer than `lag` points, and for
    /// `lag == 0` (which would index one past the newest point). Callers fall
    /// back to the owner's live position in both cases.
    pub fn lagged(&self, lag: usize) -> Option<DVec3> {
        self.points
            .len()
            .checked_sub(lag)
            .and_then(|index| self.get(index))
    }

    /// Copy the points into a new vector, oldest first.
    pub fn to_vec(&self) -> Vec<DVec3> {
        self.points.iter().copied().collect()
    }

    /// Write the trail into an interleaved `[x, y, z, x, y, z, ...]` render
    /// buffer, oldest first, and return the number of points written.
    ///
    /// Renderers typically keep one fixed buffer of `capacity * 3` floats per
    /// trail; only the first `returned * 3` slots are meaningful afterwards,
    /// so the return value doubles as the draw range. Points that do not fit
    /// in `buffer` are skipped.
    #[allow(clippy::cast_possible_truncation)]
    pub fn write_to_buffer(&self, buffer: &mut [f32]) -> usize {
        let mut written = 0_usize;
        for (slot, point) in buffer
            .chunks_exact_mut(FLOATS_PER_POINT)
            .zip(self.points.iter())
        {
            // Render buffers are single precision.
            slot.copy_from_slice(&[point.x as f32, point.y as f32, point.z as f32]);
            written = written.saturating_add(1);
        }
        written
    }
}
