//! Input: pointer, touch and UI-form input mapped to interaction commands.
//!
//! # Invariants
//! - Mouse and touch produce the same command set.
//! - Pointer coordinates are normalized device coordinates, never clamped.
//! - Non-numeric form input never produces a value.

pub mod command;
pub mod form;
pub mod tracker;

pub use command::{Command, ReconfigureRequest};
pub use form::ControlForm;
pub use tracker::{EventTarget, HostEvent, InputOutcome, InputTracker, normalize};
