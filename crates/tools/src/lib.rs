//! Developer tooling: read-only inspection of a running scene.
//!
//! # Invariants
//! - Tools never mutate the controller.

mod inspector;

pub use inspector::{CubeInfo, SceneInspector, SceneSummary};
