//! Planar parallelogram primitive.
//!
//! A quad spans `Q + a * u + b * v` for `a, b` in [0, 1]. Quads lying in an
//! axis plane have zero thickness along that axis, so their bounding boxes
//! depend on the padding applied by [`Aabb::from_points`].

use glam::Vec3A;

use crate::aabb::Aabb;
use crate::hittable::{HitRecord, Hittable};
use crate::interval::Interval;
use crate::material::MaterialType;
use crate::ray::Ray;

/// Rays closer than this to parallel with the plane are treated as misses.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Parallelogram defined by a corner and two edge vectors.
#[derive(Debug, Clone)]
pub struct Quad {
    q: Vec3A,
    u: Vec3A,
    v: Vec3A,
    /// Projects plane offsets onto (u, v) coordinates: n / (n . n)
    w: Vec3A,
    normal: Vec3A,
    /// Plane constant, normal . p = d for points on the plane
    d: f32,
    material: MaterialType,
    bbox: Aabb,
}

impl Quad {
    /// Create a quad with corner `q` and edges `u`, `v`.
    ///
    /// Collinear edges produce a quad that no ray can hit.
    pub fn new(q: Vec3A, u: Vec3A, v: Vec3A, material: MaterialType) -> Self {
        let n = u.cross(v);
        let normal = n.normalize_or_zero();
        let d = normal.dot(q);
        let w = n / n.dot(n);

        let diagonal0 = Aabb::from_points(q, q + u + v);
        let diagonal1 = Aabb::from_points(q + u, q + v);

        Self {
            q,
            u,
            v,
            w,
            normal,
            d,
            material,
            bbox: Aabb::enclosing(&diagonal0, &diagonal1),
        }
    }
}

impl Hittable for Quad {
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let denom = self.normal.dot(r.direction);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = (self.d - self.normal.dot(r.origin)) / denom;
        if !ray_t.surrounds(t) {
            return None;
        }

        // Planar coordinates of the hit point relative to the corner.
        let planar = r.at(t) - self.q;
        let alpha = self.w.dot(planar.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar));

        let unit = Interval::new(0.0, 1.0);
        if !unit.contains(alpha) || !unit.contains(beta) {
            return None;
        }

        Some(HitRecord::new(r, t, self.normal, self.material).with_uv(alpha, beta))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
