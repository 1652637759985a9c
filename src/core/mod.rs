//! Core spatial primitives.
//!
//! Position math, region geometry, and seeded randomness used by the
//! arena configuration and flag mechanics.

pub mod vec3;
pub mod aabb;
pub mod rng;

// Re-export core types
pub use vec3::{Vec3, Transform};
pub use aabb::Aabb;
pub use rng::SpawnRng;
