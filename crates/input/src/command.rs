use glam::Vec2;

/// A discrete interaction command.
///
/// The controller consumes commands, never raw host events. Mouse and touch
/// produce the same commands, so both share one state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Pointer moved to a normalized device coordinate.
    PointerMove(Vec2),
    /// Press-and-hold started on the render surface.
    Press,
    /// Press-and-hold ended.
    Release,
    /// Click on the render surface.
    Click,
    /// Apply new parameters and rebuild the grid.
    Reconfigure(ReconfigureRequest),
}

/// New parameters for a grid rebuild. `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReconfigureRequest {
    pub count: Option<i64>,
    pub spacing: Option<f32>,
    pub base_rotation: Option<f32>,
    pub expansion_factor: Option<f32>,
}

impl ReconfigureRequest {
    pub fn with_count(count: i64) -> Self {
        Self {
            count: Some(count),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_move_is_constructible() {
        let c = Command::PointerMove(Vec2::new(0.5, -0.5));
        assert!(matches!(c, Command::PointerMove(_)));
    }

    #[test]
    fn empty_request() {
        assert!(ReconfigureRequest::default().is_empty());
        assert!(!ReconfigureRequest::with_count(4).is_empty());
    }
}
