use glam::Vec2;
use glowgrid_common::{DEFAULT_CUBE_COLOR, PALETTE, Rgb};

/// Press-and-hold phase of the interaction state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Pressed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => f.write_str("idle"),
            Phase::Pressed => f.write_str("pressed"),
        }
    }
}

/// Interaction state read by the animation loop every tick.
#[derive(Debug, Clone)]
pub struct InteractionState {
    pub(crate) pointer: Vec2,
    pub(crate) phase: Phase,
    pub(crate) rotation_speed: f32,
    pub(crate) color_index: usize,
    pub(crate) color: Rgb,
}

impl InteractionState {
    pub fn new(base_rotation: f32) -> Self {
        Self {
            pointer: Vec2::ZERO,
            phase: Phase::Idle,
            rotation_speed: base_rotation,
            color_index: 0,
            color: DEFAULT_CUBE_COLOR,
        }
    }

    /// Last pointer position in normalized device coordinates.
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_pressed(&self) -> bool {
        self.phase == Phase::Pressed
    }

    /// Rotation added per tick on both axes.
    pub fn rotation_speed(&self) -> f32 {
        self.rotation_speed
    }

    pub fn color_index(&self) -> usize {
        self.color_index
    }

    /// Color currently applied to every cube.
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Advance to the next palette entry. The index is incremented before it
    /// is used, so the first click shows `PALETTE[1]`.
    pub(crate) fn cycle_color(&mut self) -> Rgb {
        self.color_index = (self.color_index + 1) % PALETTE.len();
        self.color = PALETTE[self.color_index];
        self.color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle_and_green() {
        let s = InteractionState::new(0.01);
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.color_index(), 0);
        assert_eq!(s.color(), Rgb::from_hex(0x00ff00));
        assert_eq!(s.rotation_speed(), 0.01);
    }

    #[test]
    fn color_cycle_pre_increments() {
        let mut s = InteractionState::new(0.01);
        let seen: Vec<usize> = (0..6)
            .map(|_| {
                s.cycle_color();
                s.color_index()
            })
            .collect();
        assert_eq!(seen, vec![1, 2, 3, 4, 0, 1]);
        assert_eq!(s.color(), PALETTE[1]);
    }
}
