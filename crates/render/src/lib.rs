//! Rendering adapter: renderer-agnostic backend interface.
//!
//! # Invariants
//! - Backends never mutate scene state; they receive transforms and materials.
//! - Every acquired cube handle is released exactly once.
//!
//! Ships a headless backend that keeps a resource ledger and renders frames
//! as text, for the CLI and for tests. The wgpu backend lives in
//! `glowgrid-render-wgpu`.

mod bloom;
mod renderer;
mod view;

pub use bloom::BloomSettings;
pub use renderer::{HeadlessBackend, RenderBackend, submit_frame};
pub use view::RenderView;
