//! Scene kernel: cube entity store, interaction state machine, per-frame animation.
//!
//! # Invariants
//! - Rest positions never change after a cube is created.
//! - Targets change only through commands; transforms only through `tick`.
//! - After every rebuild the backend's live cube count equals the store length.
//! - No input value can put NaN into a transform.

pub mod animate;
pub mod config;
pub mod controller;
pub mod state;
pub mod store;

#[cfg(test)]
mod testing;

pub use config::{MAX_CUBES, MotionConfig, SceneConfig};
pub use controller::Controller;
pub use state::{InteractionState, Phase};
pub use store::{CubeEntity, EntityStore, GraphicsResources, RebuildReport, ResourceError};
