//! Shared types for the glowgrid workspace.

mod color;
mod types;

pub use color::{CubeMaterial, DEFAULT_CUBE_COLOR, EMISSIVE_INTENSITY, PALETTE, Rgb};
pub use types::{CubeTransform, EntityId, MeshHandle};
