use crate::assets::ImageId;

pub type Rgba = [u8; 4];

/// Pixel region inside a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Destination rectangle in screen pixels; may lie partly or fully off screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn square(x: f32, y: f32, size: f32) -> Self {
        Self::new(x, y, size, size)
    }
}

/// Drawing surface handed to `Scene::render`.
pub trait Canvas {
    fn viewport(&self) -> (u32, u32);
    fn clear(&mut self, color: Rgba);
    fn draw_image(&mut self, image: ImageId, dest: ScreenRect);
    fn draw_image_region(&mut self, image: ImageId, source: SourceRect, dest: ScreenRect);
    fn fill_rect(&mut self, dest: ScreenRect, color: Rgba);
    fn stroke_rect(&mut self, dest: ScreenRect, color: Rgba);
    fn draw_text(&mut self, x: f32, y: f32, text: &str, color: Rgba);
}
