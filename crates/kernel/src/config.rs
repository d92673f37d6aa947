use glowgrid_input::ReconfigureRequest;
use glowgrid_layout::GridConfig;
use serde::{Deserialize, Serialize};

/// Practical upper bound on the number of cubes. Matches the instance
/// capacity of the GPU backend.
pub const MAX_CUBES: usize = 10_000;

/// Per-tick motion parameters.
///
/// The two easing rates are fractions of the remaining distance covered per
/// tick, so convergence speed depends on the display refresh rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Rotation added to both axes each tick while idle (radians).
    pub base_rotation: f32,
    /// Rotation speed multiplier while pressed.
    pub press_multiplier: f32,
    /// Rest positions are scaled by this while pressed.
    pub expansion_factor: f32,
    /// Fraction of the distance to the target covered per tick.
    pub target_ease: f32,
    /// Fraction of the distance to the pointer offset covered per tick.
    pub follow_ease: f32,
    /// World units the grid shifts per unit of normalized pointer travel.
    pub follow_scale: f32,
    /// Z coordinate of the grid plane.
    pub depth: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            base_rotation: 0.01,
            press_multiplier: 5.0,
            expansion_factor: 5.0,
            target_ease: 0.1,
            follow_ease: 0.05,
            follow_scale: 10.0,
            depth: -10.0,
        }
    }
}

/// Grid plus motion configuration for the whole scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub grid: GridConfig,
    pub motion: MotionConfig,
}

impl SceneConfig {
    /// Replace out-of-range values with defaults (count is clamped instead).
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let grid = GridConfig {
            count: clamp_count(i64::try_from(self.grid.count).unwrap_or(i64::MAX)),
            spacing: positive_or("grid.spacing", self.grid.spacing, defaults.grid.spacing),
        };
        let m = self.motion;
        let d = defaults.motion;
        let motion = MotionConfig {
            base_rotation: finite_or("motion.base_rotation", m.base_rotation, d.base_rotation),
            press_multiplier: finite_or(
                "motion.press_multiplier",
                m.press_multiplier,
                d.press_multiplier,
            ),
            expansion_factor: finite_or(
                "motion.expansion_factor",
                m.expansion_factor,
                d.expansion_factor,
            ),
            target_ease: rate_or("motion.target_ease", m.target_ease, d.target_ease),
            follow_ease: rate_or("motion.follow_ease", m.follow_ease, d.follow_ease),
            follow_scale: finite_or("motion.follow_scale", m.follow_scale, d.follow_scale),
            depth: finite_or("motion.depth", m.depth, d.depth),
        };
        Self { grid, motion }
    }

    /// Apply a reconfiguration request. Unusable values keep the current
    /// setting.
    pub fn merged(&self, request: &ReconfigureRequest) -> Self {
        let mut next = *self;
        if let Some(count) = request.count {
            next.grid.count = clamp_count(count);
        }
        if let Some(spacing) = request.spacing {
            next.grid.spacing = positive_or("spacing", spacing, self.grid.spacing);
        }
        if let Some(rotation) = request.base_rotation {
            next.motion.base_rotation = finite_or("rotation speed", rotation, self.motion.base_rotation);
        }
        if let Some(factor) = request.expansion_factor {
            next.motion.expansion_factor =
                finite_or("expansion factor", factor, self.motion.expansion_factor);
        }
        next
    }
}

/// Clamp a requested cube count into `1..=MAX_CUBES`.
pub fn clamp_count(requested: i64) -> usize {
    if requested < 1 {
        tracing::warn!(requested, "cube count below 1, using 1");
        1
    } else if requested as u64 > MAX_CUBES as u64 {
        tracing::warn!(requested, max = MAX_CUBES, "cube count above limit, clamping");
        MAX_CUBES
    } else {
        requested as usize
    }
}

fn finite_or(field: &str, value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        tracing::warn!(field, value, "ignoring non-finite value");
        fallback
    }
}

fn positive_or(field: &str, value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        tracing::warn!(field, value, "ignoring non-positive value");
        fallback
    }
}

fn rate_or(field: &str, value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        value
    } else {
        tracing::warn!(field, value, "easing rate must be in (0, 1]");
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_scene() {
        let c = SceneConfig::default();
        assert_eq!(c.grid.count, 9);
        assert_eq!(c.grid.spacing, 3.0);
        assert_eq!(c.motion.base_rotation, 0.01);
        assert_eq!(c.motion.expansion_factor, 5.0);
        assert_eq!(c.motion.depth, -10.0);
    }

    #[test]
    fn count_is_clamped() {
        assert_eq!(clamp_count(0), 1);
        assert_eq!(clamp_count(-7), 1);
        assert_eq!(clamp_count(25), 25);
        assert_eq!(clamp_count(1_000_000), MAX_CUBES);
    }

    #[test]
    fn sanitized_replaces_bad_values() {
        let mut c = SceneConfig::default();
        c.grid.count = 0;
        c.grid.spacing = -1.0;
        c.motion.target_ease = 1.5;
        c.motion.base_rotation = f32::NAN;
        let s = c.sanitized();
        assert_eq!(s.grid.count, 1);
        assert_eq!(s.grid.spacing, 3.0);
        assert_eq!(s.motion.target_ease, 0.1);
        assert_eq!(s.motion.base_rotation, 0.01);
    }

    #[test]
    fn merged_keeps_previous_on_bad_input() {
        let c = SceneConfig::default();
        let req = ReconfigureRequest {
            count: Some(16),
            spacing: Some(0.0),
            base_rotation: Some(f32::INFINITY),
            expansion_factor: Some(2.0),
        };
        let m = c.merged(&req);
        assert_eq!(m.grid.count, 16);
        assert_eq!(m.grid.spacing, 3.0);
        assert_eq!(m.motion.base_rotation, 0.01);
        assert_eq!(m.motion.expansion_factor, 2.0);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c: SceneConfig = serde_json::from_str(r#"{ "grid": { "count": 25 } }"#).unwrap();
        assert_eq!(c.grid.count, 25);
        assert_eq!(c.grid.spacing, 3.0);
        assert_eq!(c.motion, MotionConfig::default());
    }
}
