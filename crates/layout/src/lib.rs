//! Grid layout: positions for N cubes on a centered, square-ish grid.
//!
//! # Invariants
//! - Output length equals the requested count.
//! - Side length is `ceil(sqrt(count))`; the square is centered on the origin.
//! - Pure and deterministic.

mod grid;

pub use grid::{GridConfig, layout, side_for};
