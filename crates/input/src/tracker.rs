use glam::Vec2;

use crate::command::Command;

/// What an event landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTarget {
    /// The 3-D render surface itself.
    Surface,
    /// A UI control layered over the surface (slider, button, text field).
    Overlay,
}

/// Raw pointer/touch/viewport event from the host, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    PointerMoved { x: f64, y: f64 },
    PointerDown { target: EventTarget },
    PointerUp { target: EventTarget },
    TouchStart { x: f64, y: f64, target: EventTarget },
    TouchMoved { x: f64, y: f64 },
    TouchEnd,
    Resized { width: u32, height: u32 },
}

/// Commands produced by one host event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputOutcome {
    pub commands: Vec<Command>,
    /// The host should not run its default handling (scroll, zoom, UI
    /// gestures) for this event.
    pub suppress_default: bool,
}

impl InputOutcome {
    fn none() -> Self {
        Self::default()
    }

    fn one(command: Command) -> Self {
        Self {
            commands: vec![command],
            suppress_default: false,
        }
    }

    fn suppressed(mut self) -> Self {
        self.suppress_default = true;
        self
    }
}

/// Map pixel coordinates to normalized device coordinates.
///
/// Screen Y grows downward, device Y upward. Values outside the viewport map
/// outside `[-1, 1]`; they are not clamped. Returns `None` for an empty
/// viewport.
pub fn normalize(x: f64, y: f64, width: u32, height: u32) -> Option<Vec2> {
    if width == 0 || height == 0 || !x.is_finite() || !y.is_finite() {
        return None;
    }
    let nx = (x / width as f64) * 2.0 - 1.0;
    let ny = -((y / height as f64) * 2.0 - 1.0);
    Some(Vec2::new(nx as f32, ny as f32))
}

/// Turns host events into interaction commands.
///
/// Tracks the viewport size for normalization and where the current press
/// started, so a click is only synthesized when press and release both hit
/// the render surface.
#[derive(Debug, Clone)]
pub struct InputTracker {
    width: u32,
    height: u32,
    pointer: Vec2,
    press_target: Option<EventTarget>,
}

impl InputTracker {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pointer: Vec2::ZERO,
            press_target: None,
        }
    }

    /// Last normalized pointer position.
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn handle(&mut self, event: HostEvent) -> InputOutcome {
        match event {
            HostEvent::PointerMoved { x, y } => self.move_to(x, y),
            HostEvent::PointerDown { target } => {
                self.press_target = Some(target);
                match target {
                    EventTarget::Surface => InputOutcome::one(Command::Press),
                    EventTarget::Overlay => InputOutcome::none(),
                }
            }
            HostEvent::PointerUp { target } => {
                let mut outcome = InputOutcome::one(Command::Release);
                if self.press_target.take() == Some(EventTarget::Surface)
                    && target == EventTarget::Surface
                {
                    outcome.commands.push(Command::Click);
                }
                outcome
            }
            HostEvent::TouchStart { x, y, target } => {
                if target == EventTarget::Overlay {
                    return InputOutcome::none();
                }
                let mut outcome = self.move_to(x, y);
                outcome.commands.push(Command::Press);
                outcome.suppressed()
            }
            HostEvent::TouchMoved { x, y } => self.move_to(x, y),
            HostEvent::TouchEnd => InputOutcome::one(Command::Release).suppressed(),
            HostEvent::Resized { width, height } => {
                tracing::debug!(width, height, "viewport resized");
                self.width = width;
                self.height = height;
                InputOutcome::none()
            }
        }
    }

    fn move_to(&mut self, x: f64, y: f64) -> InputOutcome {
        match normalize(x, y, self.width, self.height) {
            Some(p) => {
                self.pointer = p;
                InputOutcome::one(Command::PointerMove(p))
            }
            None => InputOutcome::none(),
        }
    }
}
