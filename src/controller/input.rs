/// Window-system-agnostic input handling
use std::collections::HashSet;

use winit::keyboard::KeyCode;

/// Input events the frontend forwards after egui has had its turn.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    MouseMove { dx: f32, dy: f32 },
    MouseWheel { delta_y: f32 },
    FocusLost,
    PointerLockChanged { locked: bool },
}

#[derive(Debug, Default)]
pub struct InputState {
    pub pressed_keys: HashSet<KeyCode>,
    /// Keys that went down since the last [`InputState::end_frame`].
    pub just_pressed: HashSet<KeyCode>,
    pub look_delta: (f32, f32),
    pub scroll: f32,
    pub pointer_locked: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                // Auto-repeat arrives as repeated KeyDown; only the first one counts.
                if self.pressed_keys.insert(*key) {
                    self.just_pressed.insert(*key);
                }
            }
            InputEvent::KeyUp(key) => {
                self.pressed_keys.remove(key);
            }
            InputEvent::MouseMove { dx, dy } => {
                if self.pointer_locked {
                    self.look_delta.0 += dx;
                    self.look_delta.1 += dy;
                }
            }
            InputEvent::MouseWheel { delta_y } => {
                self.scroll += delta_y;
            }
            InputEvent::FocusLost => {
                self.clear_keys();
            }
            InputEvent::PointerLockChanged { locked } => {
                self.pointer_locked = *locked;
            }
        }
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.pressed_keys.contains(&key)
    }

    pub fn was_just_pressed(&self, key: KeyCode) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn any_pressed(&self, keys: &[KeyCode]) -> bool {
        keys.iter().any(|k| self.pressed_keys.contains(k))
    }

    pub fn clear_keys(&mut self) {
        self.pressed_keys.clear();
        self.just_pressed.clear();
    }

    pub fn consume_look(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.look_delta)
    }

    pub fn consume_scroll(&mut self) -> f32 {
        std::mem::take(&mut self.scroll)
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
    }
}

/// Key mapping configuration
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBindings {
    pub forward: Vec<KeyCode>,
    pub backward: Vec<KeyCode>,
    pub left: Vec<KeyCode>,
    pub right: Vec<KeyCode>,
    pub dance: KeyCode,
    pub spin: KeyCode,
    pub quit: KeyCode,
}

impl KeyBindings {
    pub fn wasd() -> Self {
        Self {
            forward: vec![KeyCode::KeyW],
            backward: vec![KeyCode::KeyS],
            left: vec![KeyCode::KeyA],
            right: vec![KeyCode::KeyD],
            ..Self::default()
        }
    }

    pub fn arrows() -> Self {
        Self {
            forward: vec![KeyCode::ArrowUp],
            backward: vec![KeyCode::ArrowDown],
            left: vec![KeyCode::ArrowLeft],
            right: vec![KeyCode::ArrowRight],
            ..Self::default()
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: vec![KeyCode::KeyW, KeyCode::ArrowUp],
            backward: vec![KeyCode::KeyS, KeyCode::ArrowDown],
            left: vec![KeyCode::KeyA, KeyCode::ArrowLeft],
            right: vec![KeyCode::KeyD, KeyCode::ArrowRight],
            dance: KeyCode::KeyE,
            spin: KeyCode::KeyR,
            quit: KeyCode::Escape,
        }
    }
}

/// Directional keys held this frame. For ground entities left/right turn; for fly
/// cameras they strafe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveIntent {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveIntent {
    pub fn is_moving(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}

/// High-level input processor
#[derive(Debug, Clone, Default)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn move_intent(&self, input: &InputState) -> MoveIntent {
        MoveIntent {
            forward: input.any_pressed(&self.bindings.forward),
            backward: input.any_pressed(&self.bindings.backward),
            left: input.any_pressed(&self.bindings.left),
            right: input.any_pressed(&self.bindings.right),
        }
    }

    pub fn wants_dance(&self, input: &InputState) -> bool {
        input.was_just_pressed(self.bindings.dance)
    }

    pub fn is_spinning(&self, input: &InputState) -> bool {
        input.is_key_pressed(self.bindings.spin)
    }

    pub fn wants_quit(&self, input: &InputState) -> bool {
        input.was_just_pressed(self.bindings.quit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_repeat_does_not_retrigger() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown(KeyCode::KeyE));
        input.end_frame();
        input.process_event(&InputEvent::KeyDown(KeyCode::KeyE));
        assert!(input.is_key_pressed(KeyCode::KeyE));
        assert!(!input.was_just_pressed(KeyCode::KeyE));
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown(KeyCode::KeyW));
        input.process_event(&InputEvent::FocusLost);
        assert!(input.pressed_keys.is_empty());
    }

    #[test]
    fn look_only_accumulates_when_locked() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::MouseMove { dx: 3.0, dy: 1.0 });
        assert_eq!(input.consume_look(), (0.0, 0.0));
        input.process_event(&InputEvent::PointerLockChanged { locked: true });
        input.process_event(&InputEvent::MouseMove { dx: 3.0, dy: 1.0 });
        input.process_event(&InputEvent::MouseMove { dx: 1.0, dy: -2.0 });
        assert_eq!(input.consume_look(), (4.0, -1.0));
        assert_eq!(input.consume_look(), (0.0, 0.0));
    }

    #[test]
    fn arrows_and_wasd_both_move_by_default() {
        let processor = InputProcessor::default();
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown(KeyCode::ArrowUp));
        input.process_event(&InputEvent::KeyDown(KeyCode::KeyA));
        let intent = processor.move_intent(&input);
        assert!(intent.forward && intent.left);
        assert!(!intent.backward && !intent.right);
    }

    #[test]
    fn split_bindings_do_not_overlap() {
        let character = InputProcessor::new(KeyBindings::wasd());
        let camera = InputProcessor::new(KeyBindings::arrows());
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown(KeyCode::ArrowLeft));
        assert!(!character.move_intent(&input).is_moving());
        assert!(camera.move_intent(&input).left);
    }

    #[test]
    fn dance_and_quit_are_edge_triggered() {
        let processor = InputProcessor::default();
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown(KeyCode::KeyE));
        input.process_event(&InputEvent::KeyDown(KeyCode::Escape));
        assert!(processor.wants_dance(&input));
        assert!(processor.wants_quit(&input));
        input.end_frame();
        assert!(!processor.wants_dance(&input));
        assert!(!processor.wants_quit(&input));
    }
}
