use glam::DVec2;

/// Keys and buttons the runtime reacts to. Mouse buttons are keys too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Tab,
    Space,
    Enter,
    Left,
    Right,
    Up,
    Down,
    LeftControl,
    RightControl,
    M,
    MouseLeft,
    MouseRight,
}

const KEY_COUNT: usize = 13;

impl Key {
    const fn index(self) -> usize {
        match self {
            Key::Escape => 0,
            Key::Tab => 1,
            Key::Space => 2,
            Key::Enter => 3,
            Key::Left => 4,
            Key::Right => 5,
            Key::Up => 6,
            Key::Down => 7,
            Key::LeftControl => 8,
            Key::RightControl => 9,
            Key::M => 10,
            Key::MouseLeft => 11,
            Key::MouseRight => 12,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct KeySet {
    bits: [bool; KEY_COUNT],
}

impl KeySet {
    fn set(&mut self, key: Key, on: bool) {
        self.bits[key.index()] = on;
    }

    fn contains(&self, key: Key) -> bool {
        self.bits[key.index()]
    }
}

/// One frame's view of the input devices.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    down: KeySet,
    just_pressed: KeySet,
    just_released: KeySet,
    mouse_position: DVec2,
    mouse_scroll: DVec2,
}

impl InputSnapshot {
    pub fn pressed(&self, key: Key) -> bool {
        self.down.contains(key)
    }

    pub fn just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(key)
    }

    pub fn just_released(&self, key: Key) -> bool {
        self.just_released.contains(key)
    }

    pub fn ctrl_pressed(&self) -> bool {
        self.pressed(Key::LeftControl) || self.pressed(Key::RightControl)
    }

    /// Cursor in screen space, origin bottom-left.
    pub fn mouse_position(&self) -> DVec2 {
        self.mouse_position
    }

    /// Scroll accumulated since the previous snapshot.
    pub fn mouse_scroll(&self) -> DVec2 {
        self.mouse_scroll
    }
}

/// Accumulates device events between frames. Edges and scroll are consumed
/// by [`InputCollector::snapshot`]; held state carries over.
#[derive(Debug, Clone, Default)]
pub struct InputCollector {
    current: InputSnapshot,
}

impl InputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// OS key repeat re-sends presses; only the first one is an edge.
    pub fn press(&mut self, key: Key) {
        if !self.current.down.contains(key) {
            self.current.just_pressed.set(key, true);
        }
        self.current.down.set(key, true);
    }

    pub fn release(&mut self, key: Key) {
        if self.current.down.contains(key) {
            self.current.just_released.set(key, true);
        }
        self.current.down.set(key, false);
    }

    pub fn set_mouse_position(&mut self, position: DVec2) {
        self.current.mouse_position = position;
    }

    pub fn scroll(&mut self, delta: DVec2) {
        self.current.mouse_scroll += delta;
    }

    /// Presses and releases `key` within the same frame.
    pub fn tap(&mut self, key: Key) {
        self.press(key);
        self.release(key);
    }

    pub fn snapshot(&mut self) -> InputSnapshot {
        let snapshot = self.current;
        self.current.just_pressed = KeySet::default();
        self.current.just_released = KeySet::default();
        self.current.mouse_scroll = DVec2::ZERO;
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_key_does_not_retrigger_edges() {
        let mut input = InputCollector::new();
        input.press(Key::Right);
        let first = input.snapshot();
        assert!(first.just_pressed(Key::Right));
        assert!(first.pressed(Key::Right));

        input.press(Key::Right);
        let held = input.snapshot();
        assert!(!held.just_pressed(Key::Right));
        assert!(!held.just_released(Key::Right));
        assert!(held.pressed(Key::Right));

        input.release(Key::Right);
        let released = input.snapshot();
        assert!(released.just_released(Key::Right));
        assert!(!released.pressed(Key::Right));
        assert!(!input.snapshot().just_released(Key::Right));
    }

    #[test]
    fn release_without_press_is_not_an_edge() {
        let mut input = InputCollector::new();
        input.release(Key::Escape);
        assert!(!input.snapshot().just_released(Key::Escape));
    }

    #[test]
    fn scroll_accumulates_and_resets_per_snapshot() {
        let mut input = InputCollector::new();
        input.scroll(DVec2::new(0.0, 1.0));
        input.scroll(DVec2::new(0.0, 2.5));
        assert_eq!(input.snapshot().mouse_scroll(), DVec2::new(0.0, 3.5));
        assert_eq!(input.snapshot().mouse_scroll(), DVec2::ZERO);
    }

    #[test]
    fn tap_yields_both_edges_and_leaves_key_up() {
        let mut input = InputCollector::new();
        input.set_mouse_position(DVec2::new(3.0, 4.0));
        input.tap(Key::MouseLeft);
        let snapshot = input.snapshot();
        assert!(snapshot.just_pressed(Key::MouseLeft));
        assert!(snapshot.just_released(Key::MouseLeft));
        assert!(!snapshot.pressed(Key::MouseLeft));
        assert_eq!(snapshot.mouse_position(), DVec2::new(3.0, 4.0));
    }

    #[test]
    fn either_control_key_counts() {
        let mut input = InputCollector::new();
        assert!(!input.snapshot().ctrl_pressed());
        input.press(Key::RightControl);
        assert!(input.snapshot().ctrl_pressed());
    }
}
