mod canvas;
mod font;
mod renderer;

pub use canvas::{Canvas, Rgba, ScreenRect, SourceRect};
pub use font::{text_width_px, GLYPH_ADVANCE_PX, GLYPH_HEIGHT_PX};
pub use renderer::Renderer;
