use glam::Vec2;

/// Raw input forwarded by the host. Coordinates are canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// The pointer moved to (x, y).
    PointerMove { x: f32, y: f32 },
    /// A click or touch began at (x, y).
    PointerDown { x: f32, y: f32, timestamp_ms: f64 },
    /// A click or touch ended at (x, y).
    PointerUp { x: f32, y: f32 },
    /// The pointer left the canvas.
    PointerLeave,
}

/// Last-write-wins view of the pointer, read once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSnapshot {
    pub pointer: Vec2,
    pub last_pointer: Vec2,
    /// Pointer displacement since the previous move event.
    pub speed: Vec2,
    /// True between pointer-down and pointer-up.
    pub clicked: bool,
    /// Timestamp of the most recent pointer-down.
    pub click_time_ms: Option<f64>,
    /// Where the most recent pointer-down happened.
    pub click_pos: Vec2,
    pub on_screen: bool,
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self {
            pointer: Vec2::ZERO,
            last_pointer: Vec2::ZERO,
            speed: Vec2::ZERO,
            clicked: false,
            click_time_ms: None,
            click_pos: Vec2::ZERO,
            on_screen: false,
        }
    }
}

impl InputSnapshot {
    /// Fold one event into the snapshot.
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMove { x, y } => {
                let next = Vec2::new(x, y);
                self.last_pointer = self.pointer;
                self.speed = if self.on_screen { next - self.pointer } else { Vec2::ZERO };
                self.pointer = next;
                self.on_screen = true;
            }
            InputEvent::PointerDown { x, y, timestamp_ms } => {
                self.pointer = Vec2::new(x, y);
                self.click_pos = self.pointer;
                self.clicked = true;
                self.click_time_ms = Some(timestamp_ms);
                self.on_screen = true;
            }
            InputEvent::PointerUp { x, y } => {
                self.pointer = Vec2::new(x, y);
                self.clicked = false;
            }
            InputEvent::PointerLeave => {
                self.on_screen = false;
                self.clicked = false;
                self.speed = Vec2::ZERO;
            }
        }
    }

    /// Whether a click newer than `since` is waiting to be handled.
    pub fn click_after(&self, since: Option<f64>) -> Option<(Vec2, f64)> {
        match (self.click_time_ms, since) {
            (Some(t), Some(seen)) if t <= seen => None,
            (Some(t), _) => Some((self.click_pos, t)),
            (None, _) => None,
        }
    }
}
