//! slabtrace ray intersection core
//!
//! Bounding volume hierarchy, axis-aligned boxes and the `Hittable` contract
//! shared by primitives and trees, plus the sphere and quad primitives and
//! scene builders used to exercise them.

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod aabb;
pub mod bvh;
pub mod config;
pub mod error;
pub mod hittable;
pub mod interval;
pub mod material;
pub mod quad;
pub mod random;
pub mod ray;
pub mod scene;
pub mod sphere;
