use super::input::{ActionStates, InputAction, TypedKey};
use super::rendering::Canvas;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    /// Drop every held and pending key so state does not leak across a UI boundary.
    ClearInput,
    Quit,
}

#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    held: ActionStates,
    pressed: ActionStates,
    typed_keys: Vec<TypedKey>,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        held: ActionStates,
        pressed: ActionStates,
        typed_keys: Vec<TypedKey>,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            held,
            pressed,
            typed_keys,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// True while the key bound to `action` is held.
    pub fn is_down(&self, action: InputAction) -> bool {
        self.held.is_down(action)
    }

    /// True only on the tick the key bound to `action` went down.
    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed.is_down(action)
    }

    pub fn typed_keys(&self) -> &[TypedKey] {
        &self.typed_keys
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.held.set(action, is_down);
        self
    }

    /// Marks `action` as both held and freshly pressed.
    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.held.set(action, true);
        self.pressed.set(action, true);
        self
    }

    pub fn with_typed_keys(mut self, keys: impl IntoIterator<Item = TypedKey>) -> Self {
        self.typed_keys.extend(keys);
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(self, other: Vec2) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    pub fn distance(self, other: Vec2) -> f32 {
        self.distance_squared(other).sqrt()
    }
}

/// `position` is the world point shown at the viewport center. Screen y grows downward,
/// same as world y.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
}

impl Camera2D {
    pub fn centered_on(position: Vec2) -> Self {
        Self { position }
    }

    /// World coordinate of the viewport's top-left pixel.
    pub fn top_left(&self, viewport: (u32, u32)) -> Vec2 {
        Vec2 {
            x: self.position.x - viewport.0 as f32 * 0.5,
            y: self.position.y - viewport.1 as f32 * 0.5,
        }
    }
}

pub trait Scene {
    fn load(&mut self) {}
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand;
    fn render(&mut self, canvas: &mut dyn Canvas);
    fn unload(&mut self) {}
    fn debug_title(&self) -> Option<String> {
        None
    }
}
