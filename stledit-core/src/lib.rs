//! Core data structures for stledit
//!
//! This crate provides the shared-vertex triangle mesh the editor works on:
//! point and color types, vertices and faces with derived geometry, and the
//! loader that turns parsed triangle soup into deduplicated mesh data.

pub mod point;
pub mod color;
pub mod mesh;
pub mod loader;
pub mod traits;
pub mod error;

pub use point::*;
pub use color::*;
pub use mesh::*;
pub use loader::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};
