//! Material references carried by hit records.
//!
//! The intersection core never evaluates materials; it only hands the
//! material of the closest surface back to the shading layer.

use glam::Vec3A;

/// RGB color type using Vec3A for SIMD optimization.
pub type Color = Vec3A;

/// Material types for ray tracing.
///
/// Plain data: scattering is implemented by the shading layer that reads
/// [`crate::hittable::HitRecord::material`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialType {
    /// Lambertian diffuse material for matte surfaces.
    Lambertian {
        /// Surface color/reflectance.
        albedo: Color,
    },

    /// Metallic material with specular reflection.
    Metal {
        /// Metal color.
        albedo: Color,
        /// Surface roughness (0.0 = mirror, 1.0 = rough).
        fuzz: f32,
    },

    /// Dielectric (transparent) material with refraction.
    Dielectric {
        /// Index of refraction (1.0 = air, 1.5 = glass, etc.).
        refraction_index: f32,
    },

    /// Emissive surface.
    DiffuseLight {
        /// Emitted radiance.
        emit: Color,
    },
}

impl MaterialType {
    /// Metal with roughness clamped to [0, 1].
    pub fn metal(albedo: Color, fuzz: f32) -> Self {
        MaterialType::Metal {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }
}

impl Default for MaterialType {
    fn default() -> Self {
        MaterialType::Lambertian {
            albedo: Color::splat(0.5),
        }
    }
}
