//! Ray-object intersection system.
//!
//! Defines the Hittable trait shared by geometric primitives, collections and
//! BVH trees, and the HitRecord returned by a successful query.

use std::sync::Arc;

use glam::Vec3A;

use crate::aabb::Aabb;
use crate::bvh::Bvh;
use crate::error::BvhError;
use crate::interval::Interval;
use crate::material::MaterialType;
use crate::ray::Ray;

/// Ray-object intersection information.
///
/// Contains intersection point, surface normal, distance, and material data
/// needed for shading calculations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    /// Point where the ray intersects the object
    pub p: Vec3A,
    /// Surface normal at the intersection point, facing against the ray
    pub normal: Vec3A,
    /// Distance along the ray to the intersection point
    pub t: f32,
    /// True if ray hits the front face, false if hits the back face
    pub front_face: bool,
    /// Material of the object at the hit point
    pub material: MaterialType,
    /// Surface parameter u, 0 when the primitive has no parameterization
    pub u: f32,
    /// Surface parameter v, 0 when the primitive has no parameterization
    pub v: f32,
}

impl HitRecord {
    /// Build a record at parameter `t` on `r`, orienting `outward_normal`
    /// against the ray.
    pub fn new(r: &Ray, t: f32, outward_normal: Vec3A, material: MaterialType) -> Self {
        let mut rec = Self {
            p: r.at(t),
            normal: outward_normal,
            t,
            front_face: true,
            material,
            u: 0.0,
            v: 0.0,
        };
        rec.set_face_normal(r, outward_normal);
        rec
    }

    /// Attach surface coordinates.
    pub fn with_uv(mut self, u: f32, v: f32) -> Self {
        self.u = u;
        self.v = v;
        self
    }

    /// Set surface normal and determine front/back face.
    ///
    /// Ensures normal always points against the incident ray.
    /// `outward_normal` is assumed to have unit length.
    pub fn set_face_normal(&mut self, r: &Ray, outward_normal: Vec3A) {
        self.front_face = r.direction.dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Trait for objects that can be intersected by rays.
///
/// Implemented by primitives, by [`HittableList`] and by [`Bvh`], so a whole
/// tree can stand in for a single primitive. Must be thread-safe (Sync + Send)
/// so one scene can be queried from many threads at once.
pub trait Hittable: Sync + Send {
    /// Nearest intersection strictly inside `ray_t`, if any.
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord>;

    /// Box enclosing the object over its whole time range.
    fn bounding_box(&self) -> Aabb;
}

impl<T: Hittable + ?Sized> Hittable for Box<T> {
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        (**self).hit(r, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        (**self).bounding_box()
    }
}

impl<T: Hittable + ?Sized> Hittable for Arc<T> {
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        (**self).hit(r, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        (**self).bounding_box()
    }
}

impl<T: Hittable + ?Sized> Hittable for &T {
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        (**self).hit(r, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        (**self).bounding_box()
    }
}

/// Collection of objects forming a scene.
///
/// Uses linear search for intersection testing, which makes it the reference
/// answer a [`Bvh`] built from the same objects must reproduce.
#[derive(Default)]
pub struct HittableList {
    /// Vector of boxed hittable objects
    pub objects: Vec<Box<dyn Hittable>>,
    bbox: Aabb,
}

impl HittableList {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    /// Clear all objects from the list
    pub fn clear(&mut self) {
        self.objects.clear();
        self.bbox = Aabb::EMPTY;
    }

    /// Add an object to the scene.
    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.bbox = Aabb::enclosing(&self.bbox, &object.bounding_box());
        self.objects.push(object);
    }

    /// Number of objects in the scene.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when the scene holds no object.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Consume the list and build a BVH over all of its objects.
    pub fn into_bvh(self) -> Result<Bvh<Box<dyn Hittable>>, BvhError> {
        Bvh::new(self.objects)
    }
}

impl Hittable for HittableList {
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let mut closest = None;
        let mut closest_so_far = ray_t.max;

        for object in &self.objects {
            if let Some(rec) = object.hit(r, Interval::new(ray_t.min, closest_so_far)) {
                closest_so_far = rec.t;
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

/// Instance of another hittable shifted by a fixed offset.
pub struct Translate<H> {
    object: H,
    offset: Vec3A,
    bbox: Aabb,
}

impl<H: Hittable> Translate<H> {
    /// Place `object` at `offset` from its own origin.
    pub fn new(object: H, offset: Vec3A) -> Self {
        let bbox = object.bounding_box() + offset;
        Self {
            object,
            offset,
            bbox,
        }
    }
}

impl<H: Hittable> Hittable for Translate<H> {
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        // Move the ray into object space, then the hit point back out.
        let local = Ray::with_time(r.origin - self.offset, r.direction, r.time);
        let mut rec = self.object.hit(&local, ray_t)?;
        rec.p += self.offset;
        Some(rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sphere::Sphere;
    use approx::assert_relative_eq;

    fn unit_sphere_at(center: Vec3A) -> Box<dyn Hittable> {
        Box::new(Sphere::new(center, 0.5, MaterialType::default()))
    }

    #[test]
    fn face_normal_points_against_ray() {
        let r = Ray::new(Vec3A::ZERO, Vec3A::new(0.0, 0.0, -1.0));
        let front = HitRecord::new(&r, 1.0, Vec3A::Z, MaterialType::default());
        assert!(front.front_face);
        assert_eq!(front.normal, Vec3A::Z);

        let back = HitRecord::new(&r, 1.0, -Vec3A::Z, MaterialType::default());
        assert!(!back.front_face);
        assert_eq!(back.normal, Vec3A::Z);
        assert_eq!(back.p, Vec3A::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn list_reports_closest_hit_regardless_of_order() {
        let mut world = HittableList::new();
        world.add(unit_sphere_at(Vec3A::new(0.0, 0.0, -5.0)));
        world.add(unit_sphere_at(Vec3A::new(0.0, 0.0, -2.0)));
        world.add(unit_sphere_at(Vec3A::new(0.0, 0.0, -8.0)));

        let r = Ray::new(Vec3A::ZERO, Vec3A::new(0.0, 0.0, -1.0));
        let rec = world.hit(&r, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert_relative_eq!(rec.t, 1.5);
        assert!(world.hit(&r, Interval::new(0.001, 1.0)).is_none());
    }

    #[test]
    fn list_box_grows_with_each_object() {
        let mut world = HittableList::new();
        assert!(world.is_empty());
        world.add(unit_sphere_at(Vec3A::ZERO));
        world.add(unit_sphere_at(Vec3A::new(3.0, 0.0, 0.0)));
        assert_eq!(world.len(), 2);
        assert_eq!(world.bounding_box().x, Interval::new(-0.5, 3.5));

        world.clear();
        assert_eq!(world.bounding_box(), Aabb::EMPTY);
    }

    #[test]
    fn translate_moves_hits_and_box() {
        let moved = Translate::new(
            Sphere::new(Vec3A::ZERO, 0.5, MaterialType::default()),
            Vec3A::new(0.0, 0.0, -3.0),
        );
        let r = Ray::new(Vec3A::ZERO, Vec3A::new(0.0, 0.0, -1.0));
        let rec = moved.hit(&r, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert_relative_eq!(rec.t, 2.5);
        assert_relative_eq!(rec.p.z, -2.5);
        assert_eq!(rec.normal, Vec3A::Z);
        assert!(moved.bounding_box().contains_point(Vec3A::new(0.0, 0.0, -3.0)));
    }

    #[test]
    fn smart_pointers_forward_the_contract() {
        let shared: Arc<dyn Hittable> = Arc::new(Sphere::new(Vec3A::ZERO, 1.0, MaterialType::default()));
        let r = Ray::new(Vec3A::new(0.0, 0.0, 5.0), Vec3A::new(0.0, 0.0, -1.0));
        assert!(shared.hit(&r, Interval::new(0.0, 10.0)).is_some());

        fn box_of(object: impl Hittable) -> Aabb {
            object.bounding_box()
        }
        assert_eq!(box_of(&shared), shared.bounding_box());
        assert_eq!(box_of(Box::new(shared.clone())), shared.bounding_box());
    }
}
