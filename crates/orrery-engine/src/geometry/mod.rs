//! Geometry generation: sampled orbit paths and the meshes lofted around them.
//!
//! Everything here is deterministic and independent of any GPU backend.

pub mod mesh;
pub mod path;
pub mod primitives;
pub mod rng;
pub mod tube;
