//! Ray representation for 3D ray tracing.
//!
//! A ray is defined as r(t) = origin + t * direction, representing a semi-infinite
//! line in 3D space used for intersection testing.

use glam::Vec3A;

use crate::error::RayError;

/// Ray in 3D space defined by origin, direction and emission time.
///
/// Mathematical representation: r(t) = origin + t * direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Starting point of the ray in world coordinates.
    ///
    /// This represents the ray's origin, typically the camera position for
    /// primary rays or a surface point for secondary rays.
    pub origin: Vec3A,

    /// Direction vector of the ray.
    ///
    /// While not required to be normalized, a unit vector simplifies distance
    /// calculations. Zero components are allowed; bounding box tests rely on
    /// IEEE division to turn them into infinities.
    pub direction: Vec3A,

    /// Moment the ray was emitted, in [0, 1] for moving geometry.
    pub time: f32,
}

impl Ray {
    /// Create a new ray with origin and direction, emitted at time 0.
    pub fn new(origin: Vec3A, direction: Vec3A) -> Self {
        Self::with_time(origin, direction, 0.0)
    }

    /// Create a new ray emitted at the given time.
    pub fn with_time(origin: Vec3A, direction: Vec3A, time: f32) -> Self {
        Self {
            origin,
            direction,
            time,
        }
    }

    /// Create a ray, rejecting inputs no intersection query can answer.
    pub fn try_new(origin: Vec3A, direction: Vec3A, time: f32) -> Result<Self, RayError> {
        if !origin.is_finite() || !direction.is_finite() || !time.is_finite() {
            return Err(RayError::NonFinite);
        }
        if direction == Vec3A::ZERO {
            return Err(RayError::DegenerateDirection);
        }
        Ok(Self::with_time(origin, direction, time))
    }

    /// True when the direction can drive a query: finite and not zero.
    pub fn is_valid(&self) -> bool {
        self.direction.is_finite() && self.direction != Vec3A::ZERO
    }

    /// Compute a point at parameter t along the ray.
    ///
    /// Returns r(t) = origin + t * direction.
    pub fn at(&self, t: f32) -> Vec3A {
        self.origin + t * self.direction
    }
}
