//! Scene builders.
//!
//! Scenes are returned as shared handles so the same primitives can back both
//! a [`Bvh`](crate::bvh::Bvh) and the brute-force [`HittableList`] it is
//! checked against.

use std::sync::Arc;

use glam::Vec3A;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::hittable::{Hittable, HittableList};
use crate::material::MaterialType;
use crate::quad::Quad;
use crate::random;
use crate::sphere::Sphere;

/// Shared handle to a scene primitive.
pub type SharedHittable = Arc<dyn Hittable>;

/// Built-in scenes selectable from the command line or config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SceneKind {
    /// Ground sphere, a jittered 22x22 grid of small spheres and three large ones
    BouncingSpheres,
    /// Five colored quads forming an open box
    Quads,
    /// Random spheres, moving spheres and quads
    RandomMix,
}

/// Build the requested scene.
///
/// `objects` only applies to [`SceneKind::RandomMix`].
pub fn build<R: Rng + ?Sized>(kind: SceneKind, rng: &mut R, objects: usize) -> Vec<SharedHittable> {
    match kind {
        SceneKind::BouncingSpheres => bouncing_spheres(rng),
        SceneKind::Quads => quads(),
        SceneKind::RandomMix => random_mix(rng, objects),
    }
}

/// Linear list over shared primitives, for brute-force reference queries.
pub fn to_list(objects: &[SharedHittable]) -> HittableList {
    let mut list = HittableList::new();
    for object in objects {
        list.add(Box::new(Arc::clone(object)));
    }
    list
}

/// Create the book cover scene with random spheres
///
/// Diffuse spheres move upward over the ray time range.
pub fn bouncing_spheres<R: Rng + ?Sized>(rng: &mut R) -> Vec<SharedHittable> {
    let mut world: Vec<SharedHittable> = Vec::new();

    let ground_material = MaterialType::Lambertian {
        albedo: Vec3A::new(0.5, 0.5, 0.5),
    };
    world.push(Arc::new(Sphere::new(Vec3A::new(0.0, -1000.0, 0.0), 1000.0, ground_material)));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = rng.random::<f32>();
            let center = Vec3A::new(
                a as f32 + 0.9 * rng.random::<f32>(),
                0.2,
                b as f32 + 0.9 * rng.random::<f32>(),
            );

            // Keep clear of the large metal sphere.
            if (center - Vec3A::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            if choose_mat < 0.8 {
                let albedo = random::random_color(rng) * random::random_color(rng);
                let center1 = center + Vec3A::new(0.0, random::random_f32_range(rng, 0.0, 0.5), 0.0);
                world.push(Arc::new(Sphere::moving(
                    center,
                    center1,
                    0.2,
                    MaterialType::Lambertian { albedo },
                )));
            } else if choose_mat < 0.95 {
                let albedo = random::random_color_range(rng, 0.5, 1.0);
                let fuzz = random::random_f32_range(rng, 0.0, 0.5);
                world.push(Arc::new(Sphere::new(center, 0.2, MaterialType::metal(albedo, fuzz))));
            } else {
                let glass = MaterialType::Dielectric {
                    refraction_index: 1.5,
                };
                world.push(Arc::new(Sphere::new(center, 0.2, glass)));
            }
        }
    }

    let material1 = MaterialType::Dielectric {
        refraction_index: 1.5,
    };
    world.push(Arc::new(Sphere::new(Vec3A::new(0.0, 1.0, 0.0), 1.0, material1)));

    let material2 = MaterialType::Lambertian {
        albedo: Vec3A::new(0.4, 0.2, 0.1),
    };
    world.push(Arc::new(Sphere::new(Vec3A::new(-4.0, 1.0, 0.0), 1.0, material2)));

    let material3 = MaterialType::metal(Vec3A::new(0.7, 0.6, 0.5), 0.0);
    world.push(Arc::new(Sphere::new(Vec3A::new(4.0, 1.0, 0.0), 1.0, material3)));

    world
}

/// Five axis-aligned quads around the origin.
pub fn quads() -> Vec<SharedHittable> {
    let lambertian = |r, g, b| MaterialType::Lambertian {
        albedo: Vec3A::new(r, g, b),
    };

    vec![
        Arc::new(Quad::new(
            Vec3A::new(-3.0, -2.0, 5.0),
            Vec3A::new(0.0, 0.0, -4.0),
            Vec3A::new(0.0, 4.0, 0.0),
            lambertian(1.0, 0.2, 0.2),
        )),
        Arc::new(Quad::new(
            Vec3A::new(-2.0, -2.0, 0.0),
            Vec3A::new(4.0, 0.0, 0.0),
            Vec3A::new(0.0, 4.0, 0.0),
            lambertian(0.2, 1.0, 0.2),
        )),
        Arc::new(Quad::new(
            Vec3A::new(3.0, -2.0, 1.0),
            Vec3A::new(0.0, 0.0, 4.0),
            Vec3A::new(0.0, 4.0, 0.0),
            lambertian(0.2, 0.2, 1.0),
        )),
        Arc::new(Quad::new(
            Vec3A::new(-2.0, 3.0, 1.0),
            Vec3A::new(4.0, 0.0, 0.0),
            Vec3A::new(0.0, 0.0, 4.0),
            lambertian(1.0, 0.5, 0.0),
        )),
        Arc::new(Quad::new(
            Vec3A::new(-2.0, -3.0, 5.0),
            Vec3A::new(4.0, 0.0, 0.0),
            Vec3A::new(0.0, 0.0, -4.0),
            lambertian(0.2, 0.8, 0.8),
        )),
    ]
}

/// `count` random primitives inside a 40 unit cube centered at the origin.
///
/// Roughly half are static spheres, a sixth moving spheres and a third
/// quads, of which some lie in an axis plane.
pub fn random_mix<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<SharedHittable> {
    let mut world: Vec<SharedHittable> = Vec::with_capacity(count);

    for _ in 0..count {
        let material = MaterialType::Lambertian {
            albedo: random::random_color(rng),
        };
        let center = random::random_vec3a_range(rng, -20.0, 20.0);

        match rng.random_range(0..6) {
            0..=2 => {
                let radius = random::random_f32_range(rng, 0.1, 1.5);
                world.push(Arc::new(Sphere::new(center, radius, material)));
            }
            3 => {
                let radius = random::random_f32_range(rng, 0.1, 1.0);
                let center1 = center + random::random_vec3a_range(rng, -2.0, 2.0);
                world.push(Arc::new(Sphere::moving(center, center1, radius, material)));
            }
            4 => {
                let u = random::random_vec3a_range(rng, -3.0, 3.0);
                let v = random::random_vec3a_range(rng, -3.0, 3.0);
                world.push(Arc::new(Quad::new(center, u, v, material)));
            }
            _ => {
                // Axis-aligned quad: zero thickness along one axis.
                let axis = rng.random_range(0..3usize);
                let mut u = Vec3A::ZERO;
                let mut v = Vec3A::ZERO;
                u[(axis + 1) % 3] = random::random_f32_range(rng, 0.5, 3.0);
                v[(axis + 2) % 3] = random::random_f32_range(rng, 0.5, 3.0);
                world.push(Arc::new(Quad::new(center, u, v, material)));
            }
        }
    }

    world
}
