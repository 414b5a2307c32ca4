//! Interval arithmetic for ray parameter ranges and bounding box slabs.
//!
//! Provides closed intervals [min, max] used for ray t-values, per-axis
//! extents of bounding boxes, and bounds checking.

use std::ops::Add;

/// Closed interval [min, max] for range checking.
///
/// An interval with `min > max` is empty. Intervals are plain values: every
/// operation returns a new interval instead of mutating in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Minimum value of the interval
    pub min: f32,
    /// Maximum value of the interval
    pub max: f32,
}

impl Interval {
    /// Empty interval, contains nothing.
    pub const EMPTY: Interval = Interval {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    /// Universe interval, contains every real number.
    pub const UNIVERSE: Interval = Interval {
        min: f32::NEG_INFINITY,
        max: f32::INFINITY,
    };

    /// Create a new interval with given min and max values
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Smallest interval enclosing both `a` and `b`.
    pub fn enclosing(a: Interval, b: Interval) -> Self {
        Self {
            min: a.min.min(b.min),
            max: a.max.max(b.max),
        }
    }

    /// Calculate the size (width) of the interval
    pub fn size(&self) -> f32 {
        self.max - self.min
    }

    /// True when the interval contains no value.
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Check if the interval contains the given value (inclusive bounds)
    pub fn contains(&self, x: f32) -> bool {
        self.min <= x && x <= self.max
    }

    /// Check if the interval surrounds the given value (exclusive bounds)
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }

    /// Clamp the given value to be within this interval's bounds
    pub fn clamp(&self, x: f32) -> f32 {
        // f32::clamp panics on min > max, empty intervals must stay total
        if x < self.min {
            self.min
        } else if x > self.max {
            self.max
        } else {
            x
        }
    }

    /// Widen the interval by `delta`, half on each side.
    pub fn expand(&self, delta: f32) -> Self {
        let padding = delta / 2.0;
        Self::new(self.min - padding, self.max + padding)
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Add<f32> for Interval {
    type Output = Interval;

    fn add(self, displacement: f32) -> Interval {
        Interval::new(self.min + displacement, self.max + displacement)
    }
}

impl Add<Interval> for f32 {
    type Output = Interval;

    fn add(self, interval: Interval) -> Interval {
        interval + self
    }
}
