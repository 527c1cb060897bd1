mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::{InputAction, TypedKey};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use rendering::{
    text_width_px, Canvas, Renderer, Rgba, ScreenRect, SourceRect, GLYPH_ADVANCE_PX,
    GLYPH_HEIGHT_PX,
};
pub use scene::{Camera2D, InputSnapshot, Scene, SceneCommand, Vec2};
