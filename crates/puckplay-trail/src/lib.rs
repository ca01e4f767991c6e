//! Puckplay Trail - Bounded history of recent puck positions
//!
//! This crate provides the ring buffer behind the puck's motion trail:
//!
//! - **Bounded memory**: Fixed-size ring, never more than `capacity` points
//! - **O(1) insertion**: Pushing a point never shifts the storage
//! - **Oldest-first snapshots**: Renderers draw from the tail to the head
//! - **Automatic eviction**: The oldest point goes when the ring is full
//!
//! # Example
//!
//! ```rust
//! use puckplay_core::RinkPoint;
//! use puckplay_trail::{TrailBuffer, TrailPoint};
//!
//! // Keep the three most recent puck positions
//! let mut trail = TrailBuffer::new(3);
//!
//! for frame in 0..5 {
//!     trail.push(TrailPoint::new(RinkPoint::new(frame as f64, 42.5), frame));
//! }
//!
//! let frames: Vec<_> = trail.snapshot().iter().map(|p| p.frame_index).collect();
//! assert_eq!(frames, vec![2, 3, 4]);
//!
//! // The newest point is the puck itself; the fading trail skips it
//! assert_eq!(trail.fading().count(), 2);
//! ```

use puckplay_core::RinkPoint;
use serde::{Deserialize, Serialize};

/// A normalized puck position tagged with the frame it came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub x: f64,
    pub y: f64,
    pub frame_index: usize,
}

impl TrailPoint {
    /// Create a trail point
    pub fn new(position: RinkPoint, frame_index: usize) -> Self {
        Self {
            x: position.x,
            y: position.y,
            frame_index,
        }
    }

    /// The point's rink position
    pub fn position(&self) -> RinkPoint {
        RinkPoint::new(self.x, self.y)
    }
}

/// A ring buffer of the most recent puck positions
///
/// Invariant: `len() <= capacity()` at all times; pushes past capacity evict
/// the oldest point.
#[derive(Debug, Clone)]
pub struct TrailBuffer {
    /// Ring storage, `None` means the slot is empty
    points: Vec<Option<TrailPoint>>,
    /// Next write position in the ring
    head: usize,
    /// Number of points currently stored
    count: usize,
    /// Capacity (max points)
    capacity: usize,
}

impl TrailBuffer {
    /// Create a trail holding at most `capacity` points
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: vec![None; capacity],
            head: 0,
            count: 0,
            capacity,
        }
    }

    /// Append a point, evicting the oldest if the ring is full
    pub fn push(&mut self, point: TrailPoint) {
        self.points[self.head] = Some(point);
        self.head = (self.head + 1) % self.capacity;
        if self.count < self.capacity {
            self.count += 1;
        }
    }

    /// Remove every point
    pub fn clear(&mut self) {
        for slot in &mut self.points {
            *slot = None;
        }
        self.count = 0;
        self.head = 0;
    }

    /// Iterate over stored points, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &TrailPoint> {
        let start = (self.head + self.capacity - self.count) % self.capacity;
        (0..self.count).filter_map(move |i| self.points[(start + i) % self.capacity].as_ref())
    }

    /// Copy of the stored points, oldest first
    pub fn snapshot(&self) -> Vec<TrailPoint> {
        self.iter().copied().collect()
    }

    /// Most recently pushed point
    pub fn latest(&self) -> Option<&TrailPoint> {
        if self.count == 0 {
            return None;
        }
        let index = (self.head + self.capacity - 1) % self.capacity;
        self.points[index].as_ref()
    }

    /// Trail points to draw behind the puck, with recency styling
    ///
    /// The newest point is the puck's current position and is excluded; the
    /// oldest remaining point is the faintest and smallest.
    pub fn fading(&self) -> impl Iterator<Item = (TrailPoint, TrailStyle)> + '_ {
        let drawn = self.count.saturating_sub(1);
        self.iter()
            .take(drawn)
            .enumerate()
            .map(move |(i, p)| (*p, TrailStyle::for_rank(i, drawn)))
    }

    /// Maximum number of points
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of points currently stored
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if the trail is empty
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Get statistics about the trail
    pub fn stats(&self) -> TrailStats {
        let oldest = self.iter().next().map(|p| p.frame_index);
        let newest = self.latest().map(|p| p.frame_index);
        TrailStats {
            capacity: self.capacity,
            count: self.count,
            oldest_frame: oldest,
            newest_frame: newest,
        }
    }
}

impl Default for TrailBuffer {
    fn default() -> Self {
        Self::new(10)
    }
}

/// Recency styling for one drawn trail point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailStyle {
    /// 0.0 (invisible) to 1.0 (opaque)
    pub opacity: f64,
    /// Radius as a fraction of the puck radius
    pub radius_scale: f64,
}

impl TrailStyle {
    const MIN_OPACITY: f64 = 0.1;
    const MAX_OPACITY: f64 = 0.7;
    const MIN_RADIUS: f64 = 0.3;
    const MAX_RADIUS: f64 = 0.9;

    /// Style for the `rank`-th oldest of `total` drawn points
    pub fn for_rank(rank: usize, total: usize) -> Self {
        let t = if total <= 1 {
            1.0
        } else {
            rank as f64 / (total - 1) as f64
        };
        Self {
            opacity: Self::MIN_OPACITY + (Self::MAX_OPACITY - Self::MIN_OPACITY) * t,
            radius_scale: Self::MIN_RADIUS + (Self::MAX_RADIUS - Self::MIN_RADIUS) * t,
        }
    }
}

/// Statistics about the trail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailStats {
    /// Maximum capacity
    pub capacity: usize,
    /// Current number of points
    pub count: usize,
    /// Frame of the oldest point
    pub oldest_frame: Option<usize>,
    /// Frame of the newest point
    pub newest_frame: Option<usize>,
}

impl TrailStats {
    /// Number of frames the trail spans
    pub fn frame_span(&self) -> usize {
        match (self.oldest_frame, self.newest_frame) {
            (Some(oldest), Some(newest)) => newest.saturating_sub(oldest),
            _ => 0,
        }
    }

    /// Get the fill percentage (0.0 to 1.0)
    pub fn fill_ratio(&self) -> f32 {
        self.count as f32 / self.capacity as f32
    }
}
