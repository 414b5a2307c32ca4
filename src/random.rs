//! Random number generation for scene and ray generation.
//!
//! Every helper draws from a caller-supplied generator so scenes and ray
//! batches are reproducible from a seed. [`seeded`] gives the ChaCha20 PRNG
//! used throughout the crate.

use glam::Vec3A;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::aabb::Aabb;
use crate::ray::Ray;

/// Deterministic ChaCha20 PRNG for the given seed.
pub fn seeded(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}

/// Generate a random f32 in [min, max)
pub fn random_f32_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    min + (max - min) * rng.random::<f32>()
}

/// Generate random Vec3A with components in [min, max) using SIMD operations.
pub fn random_vec3a_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> Vec3A {
    let random_vec: Vec3A = rng.random();
    Vec3A::splat(min) + (Vec3A::splat(max - min) * random_vec)
}

/// Generate random unit vector uniformly distributed on unit sphere.
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3A {
    // Generate uniform θ in [0, 2π)
    let theta = 2.0 * std::f32::consts::PI * rng.random::<f32>();

    // Generate uniform cos(φ) in [-1, 1] for proper sphere distribution
    let cos_phi = 2.0 * rng.random::<f32>() - 1.0;
    let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();

    Vec3A::new(sin_phi * theta.cos(), sin_phi * theta.sin(), cos_phi)
}

/// Generate random RGB color with components in [0.0, 1.0).
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Vec3A {
    rng.random()
}

/// Generate random RGB color with components in [min, max).
pub fn random_color_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> Vec3A {
    random_vec3a_range(rng, min, max)
}

/// Ray starting at a uniform point of `region`, heading in a uniform
/// direction, emitted at a uniform time in [0, 1).
pub fn random_ray<R: Rng + ?Sized>(rng: &mut R, region: &Aabb) -> Ray {
    let offset: Vec3A = rng.random();
    let origin = region.min() + offset * (region.max() - region.min());
    let direction = random_unit_vector(rng);
    Ray::with_time(origin, direction, rng.random())
}
