//! wgpu render backend for the cube grid.
//!
//! Draws instanced cubes into an HDR target and composites a bloom glow
//! onto the surface.
//!
//! # Invariants
//! - Renderer never mutates controller state; it only mirrors handles,
//!   materials and transforms pushed to it.
//! - Viewport changes are applied lazily at the start of the next frame.

mod bloom;
mod gpu;
mod shaders;

pub use bloom::{BloomPass, HDR_FORMAT};
pub use gpu::WgpuRenderer;
