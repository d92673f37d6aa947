use serde::{Deserialize, Serialize};

/// Bloom (light bleed) filter settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomSettings {
    pub enabled: bool,
    /// Luminance above which pixels contribute to the glow (valid range: 0.0-1.0).
    pub threshold: f32,
    /// Glow brightness multiplier (valid range: 0.0-3.0).
    pub strength: f32,
    /// Blur spread (valid range: 0.0-1.0).
    pub radius: f32,
    /// Number of blur passes (valid range: 1-5). More passes = smoother bloom.
    pub passes: u32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 0.0,
            strength: 1.5,
            radius: 0.6,
            passes: 2,
        }
    }
}

impl BloomSettings {
    /// Clamp every field into its valid range. Non-finite values fall back to
    /// the defaults.
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        let clamp = |field: &str, v: f32, lo: f32, hi: f32, fallback: f32| {
            if !v.is_finite() {
                tracing::warn!(field, "non-finite bloom setting, using default");
                fallback
            } else {
                v.clamp(lo, hi)
            }
        };
        Self {
            enabled: self.enabled,
            threshold: clamp("threshold", self.threshold, 0.0, 1.0, d.threshold),
            strength: clamp("strength", self.strength, 0.0, 3.0, d.strength),
            radius: clamp("radius", self.radius, 0.0, 1.0, d.radius),
            passes: self.passes.clamp(1, 5),
        }
    }

    /// Strength actually applied at composite time.
    pub fn effective_strength(&self) -> f32 {
        if self.enabled { self.strength } else { 0.0 }
    }
}
