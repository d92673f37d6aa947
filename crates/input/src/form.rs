use crate::command::ReconfigureRequest;

/// Text contents of the reconfiguration controls.
///
/// Fields hold whatever the user typed. Parsing happens only when the form is
/// submitted, and a field that does not parse is left out of the request so
/// the previous value stays in effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlForm {
    pub cube_count: String,
    pub rotation_speed: String,
    pub expansion_factor: String,
}

impl ControlForm {
    /// Form pre-filled with the current values.
    pub fn new(count: usize, rotation_speed: f32, expansion_factor: f32) -> Self {
        Self {
            cube_count: count.to_string(),
            rotation_speed: rotation_speed.to_string(),
            expansion_factor: expansion_factor.to_string(),
        }
    }

    pub fn to_request(&self) -> ReconfigureRequest {
        ReconfigureRequest {
            count: parse_count(&self.cube_count),
            spacing: None,
            base_rotation: parse_real(&self.rotation_speed),
            expansion_factor: parse_real(&self.expansion_factor),
        }
    }
}

/// Parse an integer field. Accepts a whole-valued real ("12.0") as well.
pub fn parse_count(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(n) = text.parse::<i64>() {
        return Some(n);
    }
    match parse_real(text) {
        Some(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f32 => Some(v as i64),
        _ => {
            tracing::debug!(text, "ignoring non-numeric count");
            None
        }
    }
}

/// Parse a finite real field. NaN and infinities count as non-numeric.
pub fn parse_real(text: &str) -> Option<f32> {
    match text.trim().parse::<f32>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            tracing::debug!(text, "ignoring non-numeric value");
            None
        }
    }
}
