//! Axis-aligned bounding boxes.
//!
//! A box is three [`Interval`] slabs, one per axis. Boxes built from explicit
//! extents are padded so no axis is thinner than [`MIN_AXIS_EXTENT`]; this
//! keeps the slab test well defined for flat, axis-aligned geometry.

use std::ops::Add;

use glam::Vec3A;

use crate::interval::Interval;
use crate::ray::Ray;

/// Minimum thickness of every axis of a constructed box.
///
/// Tuned for `f32` ray parameters at scene scales around 1..1000 units.
pub const MIN_AXIS_EXTENT: f32 = 1e-4;

/// Axis-aligned bounding box made of three per-axis intervals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Extent along the x axis
    pub x: Interval,
    /// Extent along the y axis
    pub y: Interval,
    /// Extent along the z axis
    pub z: Interval,
}

impl Aabb {
    /// Box enclosing nothing; identity for [`Aabb::enclosing`].
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    /// Create a box from three axis intervals, padding degenerate axes.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        Self { x, y, z }.padded(MIN_AXIS_EXTENT)
    }

    /// Create a box from two opposite corners given in any order.
    pub fn from_points(a: Vec3A, b: Vec3A) -> Self {
        let (lo, hi) = (a.min(b), a.max(b));
        Self::new(
            Interval::new(lo.x, hi.x),
            Interval::new(lo.y, hi.y),
            Interval::new(lo.z, hi.z),
        )
    }

    /// Smallest box enclosing both boxes.
    ///
    /// Inputs are already padded, so the result is not padded again.
    pub fn enclosing(a: &Aabb, b: &Aabb) -> Self {
        Self {
            x: Interval::enclosing(a.x, b.x),
            y: Interval::enclosing(a.y, b.y),
            z: Interval::enclosing(a.z, b.z),
        }
    }

    /// Widen every axis thinner than `delta` to at least `delta`, symmetrically.
    ///
    /// Empty axes stay empty.
    pub fn padded(self, delta: f32) -> Self {
        Self {
            x: pad_axis(self.x, delta),
            y: pad_axis(self.y, delta),
            z: pad_axis(self.z, delta),
        }
    }

    /// Interval for axis `n` (0 = x, 1 = y, 2 = z).
    ///
    /// Any index past 2 selects z.
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Slab test: does `r` pass through the box for some t inside `ray_t`?
    ///
    /// The running range is narrowed axis by axis and the test exits as soon
    /// as it becomes empty. A zero direction component produces infinite slab
    /// parameters through plain IEEE division. An origin lying exactly on a
    /// slab plane of such an axis produces NaN: the ray then runs inside the
    /// closed slab for every t, so that axis does not narrow the range.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        let inv_dir = r.direction.recip();

        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let origin = r.origin[axis];
            let adinv = inv_dir[axis];

            let t0 = (slab.min - origin) * adinv;
            let t1 = (slab.max - origin) * adinv;
            if t0.is_nan() || t1.is_nan() {
                continue;
            }
            let (near, far) = if t0 < t1 { (t0, t1) } else { (t1, t0) };

            if near > ray_t.min {
                ray_t.min = near;
            }
            if far < ray_t.max {
                ray_t.max = far;
            }

            if ray_t.max <= ray_t.min {
                return false;
            }
        }

        true
    }

    /// Index of the axis with the greatest extent.
    ///
    /// An earlier axis only wins when strictly longer; ties go to the later
    /// axis.
    pub fn longest_axis(&self) -> usize {
        if self.x.size() > self.y.size() {
            if self.x.size() > self.z.size() {
                0
            } else {
                2
            }
        } else if self.y.size() > self.z.size() {
            1
        } else {
            2
        }
    }

    /// Closed containment test on all three axes.
    pub fn contains_point(&self, p: Vec3A) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
    }

    /// Lower corner.
    pub fn min(&self) -> Vec3A {
        Vec3A::new(self.x.min, self.y.min, self.z.min)
    }

    /// Upper corner.
    pub fn max(&self) -> Vec3A {
        Vec3A::new(self.x.max, self.y.max, self.z.max)
    }

    /// Center of the box.
    pub fn centroid(&self) -> Vec3A {
        0.5 * (self.min() + self.max())
    }
}

/// Expand `slab` around its center until it is at least `delta` thick.
///
/// Far from the origin a single `expand(delta)` can round back below `delta`
/// in `f32`, so the padding doubles until the rounded size clears it.
fn pad_axis(slab: Interval, delta: f32) -> Interval {
    if slab.is_empty() || slab.size() >= delta {
        return slab;
    }
    let mut widen = delta;
    let mut padded = slab.expand(widen);
    while padded.size() < delta {
        widen *= 2.0;
        padded = slab.expand(widen);
    }
    padded
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Add<Vec3A> for Aabb {
    type Output = Aabb;

    fn add(self, offset: Vec3A) -> Aabb {
        Aabb {
            x: self.x + offset.x,
            y: self.y + offset.y,
            z: self.z + offset.z,
        }
    }
}

impl Add<Aabb> for Vec3A {
    type Output = Aabb;

    fn add(self, bbox: Aabb) -> Aabb {
        bbox + self
    }
}
