/// Keyboard shortcuts the orrery responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Space: play/pause. The browser's default scroll is suppressed.
    TogglePlay,
    /// `r` / `R`: pause and rewind to day 0.
    Reset,
}

impl KeyAction {
    /// Map a DOM `KeyboardEvent.key` value to an action.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            " " | "Spacebar" => Some(KeyAction::TogglePlay),
            "r" | "R" => Some(KeyAction::Reset),
            _ => None,
        }
    }
}

/// Input event types the orrery understands.
/// Pointer coordinates are CSS pixels relative to the container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp,
    /// Wheel delta; negative zooms in.
    Wheel { delta_y: f32 },
    Key(KeyAction),
    /// Play/pause button.
    TogglePlay,
    /// Reset button.
    Reset,
    /// Time slider moved to an absolute day.
    Scrub { day: f64 },
    /// Speed slider moved.
    SetSpeed { speed: f64 },
    /// Container resized to CSS pixels.
    Resize { width: f32, height: f32 },
}

/// A queue of input events.
/// DOM listeners push into the queue; the frame pump drains it once per frame.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events in arrival order.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
