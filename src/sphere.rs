//! Sphere primitive for ray tracing.
//!
//! Implements efficient ray-sphere intersection using an optimized quadratic formula.
//! Spheres may move linearly between two centers over the ray time range [0, 1].

use std::f32::consts::PI;

use glam::Vec3A;

use crate::aabb::Aabb;
use crate::hittable::{HitRecord, Hittable};
use crate::interval::Interval;
use crate::material::MaterialType;
use crate::ray::Ray;

/// Sphere primitive defined by center, radius, and material.
#[derive(Debug, Clone)]
pub struct Sphere {
    /// Center path: position at time 0 plus displacement reached at time 1.
    center: Ray,

    /// Radius of the sphere (always non-negative).
    ///
    /// Negative radius values are clamped to 0.0 in the constructor.
    pub radius: f32,

    /// Material properties determining light interaction.
    pub material: MaterialType,

    bbox: Aabb,
}

impl Sphere {
    /// Create a new stationary sphere.
    ///
    /// Negative radius values are clamped to 0.0.
    pub fn new(center: Vec3A, radius: f32, material: MaterialType) -> Self {
        Self::moving(center, center, radius, material)
    }

    /// Create a sphere moving from `center0` at time 0 to `center1` at time 1.
    ///
    /// The bounding box covers both end positions.
    pub fn moving(center0: Vec3A, center1: Vec3A, radius: f32, material: MaterialType) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3A::splat(radius);
        let box0 = Aabb::from_points(center0 - rvec, center0 + rvec);
        let box1 = Aabb::from_points(center1 - rvec, center1 + rvec);

        Self {
            center: Ray::new(center0, center1 - center0),
            radius,
            material,
            bbox: Aabb::enclosing(&box0, &box1),
        }
    }

    /// Center of the sphere at the given time.
    pub fn center_at(&self, time: f32) -> Vec3A {
        self.center.at(time)
    }

    /// Spherical (u, v) of a point `p` on the unit sphere centered at the origin.
    ///
    /// u: angle around the Y axis from X = -1, v: angle from Y = -1 to Y = +1,
    /// both normalized to [0, 1].
    fn sphere_uv(p: Vec3A) -> (f32, f32) {
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;
        (phi / (2.0 * PI), theta / PI)
    }
}

impl Hittable for Sphere {
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let current_center = self.center.at(r.time);

        // Vector from ray origin to sphere center
        let oc = current_center - r.origin;

        // Optimized quadratic equation coefficients
        let a = r.direction.length_squared();
        let h = r.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root that lies in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let outward_normal = (r.at(root) - current_center) / self.radius;
        let (u, v) = Self::sphere_uv(outward_normal);
        Some(HitRecord::new(r, root, outward_normal, self.material).with_uv(u, v))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
