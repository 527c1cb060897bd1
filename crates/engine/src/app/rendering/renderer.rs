use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::Scene;
use crate::assets::{AssetStore, ImageId, LoadedImage};

use super::canvas::{Canvas, Rgba, ScreenRect, SourceRect};
use super::font::draw_text_clipped;

const CLEAR_COLOR: Rgba = [20, 22, 28, 255];

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: (u32, u32),
    assets: AssetStore,
}

impl Renderer {
    pub fn new(window: Arc<Window>, assets: AssetStore) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: (size.width, size.height),
            assets,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = (width, height);
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render_scene(&mut self, scene: &mut dyn Scene) -> Result<(), Error> {
        let (width, height) = self.viewport;
        if width == 0 || height == 0 {
            return Ok(());
        }

        let mut canvas = FrameCanvas {
            frame: self.pixels.frame_mut(),
            width,
            height,
            assets: &self.assets,
        };
        canvas.clear(CLEAR_COLOR);
        scene.render(&mut canvas);

        self.pixels.render()
    }
}

/// `Canvas` over a raw RGBA8 frame buffer.
pub(crate) struct FrameCanvas<'a> {
    pub(crate) frame: &'a mut [u8],
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) assets: &'a AssetStore,
}

impl Canvas for FrameCanvas<'_> {
    fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Rgba) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    fn draw_image(&mut self, image: ImageId, dest: ScreenRect) {
        let Some(loaded) = self.assets.get(image) else {
            return;
        };
        let source = SourceRect {
            x: 0,
            y: 0,
            width: loaded.width(),
            height: loaded.height(),
        };
        blit_scaled(self.frame, self.width, self.height, loaded, source, dest);
    }

    fn draw_image_region(&mut self, image: ImageId, source: SourceRect, dest: ScreenRect) {
        let Some(loaded) = self.assets.get(image) else {
            return;
        };
        blit_scaled(self.frame, self.width, self.height, loaded, source, dest);
    }

    fn fill_rect(&mut self, dest: ScreenRect, color: Rgba) {
        let Some((left, top, right, bottom)) = clipped_bounds(dest, self.width, self.height)
        else {
            return;
        };
        for y in top..bottom {
            for x in left..right {
                blend_pixel(self.frame, self.width, self.height, x, y, color);
            }
        }
    }

    fn stroke_rect(&mut self, dest: ScreenRect, color: Rgba) {
        if dest.width <= 1.0 || dest.height <= 1.0 {
            return;
        }
        let edges = [
            ScreenRect::new(dest.x, dest.y, dest.width, 1.0),
            ScreenRect::new(dest.x, dest.y + dest.height - 1.0, dest.width, 1.0),
            ScreenRect::new(dest.x, dest.y, 1.0, dest.height),
            ScreenRect::new(dest.x + dest.width - 1.0, dest.y, 1.0, dest.height),
        ];
        for edge in edges {
            self.fill_rect(edge, color);
        }
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str, color: Rgba) {
        draw_text_clipped(
            self.frame,
            self.width,
            self.height,
            x.round() as i32,
            y.round() as i32,
            text,
            color,
        );
    }
}

fn clipped_bounds(dest: ScreenRect, width: u32, height: u32) -> Option<(i32, i32, i32, i32)> {
    if !(dest.width > 0.0 && dest.height > 0.0) {
        return None;
    }
    let left = (dest.x.round() as i32).max(0);
    let top = (dest.y.round() as i32).max(0);
    let right = ((dest.x + dest.width).round() as i32).min(width as i32);
    let bottom = ((dest.y + dest.height).round() as i32).min(height as i32);
    if left >= right || top >= bottom {
        return None;
    }
    Some((left, top, right, bottom))
}

fn clamp_source(image: &LoadedImage, source: SourceRect) -> Option<SourceRect> {
    if source.x >= image.width() || source.y >= image.height() {
        return None;
    }
    let width = source.width.min(image.width() - source.x);
    let height = source.height.min(image.height() - source.y);
    if width == 0 || height == 0 {
        return None;
    }
    Some(SourceRect {
        x: source.x,
        y: source.y,
        width,
        height,
    })
}

fn blit_scaled(
    frame: &mut [u8],
    width: u32,
    height: u32,
    image: &LoadedImage,
    source: SourceRect,
    dest: ScreenRect,
) {
    let Some(source) = clamp_source(image, source) else {
        return;
    };
    let Some((draw_left, draw_top, draw_right, draw_bottom)) =
        clipped_bounds(dest, width, height)
    else {
        return;
    };

    let left = dest.x.round() as i32;
    let top = dest.y.round() as i32;
    let dest_w = ((dest.x + dest.width).round() as i32 - left).max(1);
    let dest_h = ((dest.y + dest.height).round() as i32 - top).max(1);
    let scale_x = source.width as f32 / dest_w as f32;
    let scale_y = source.height as f32 / dest_h as f32;

    for out_y in draw_top..draw_bottom {
        let offset_y = ((out_y - top) as f32 * scale_y).floor() as u32;
        let src_y = source.y + offset_y.min(source.height - 1);
        for out_x in draw_left..draw_right {
            let offset_x = ((out_x - left) as f32 * scale_x).floor() as u32;
            let src_x = source.x + offset_x.min(source.width - 1);
            let Some(texel) = image.pixel(src_x, src_y) else {
                continue;
            };
            blend_pixel(frame, width, height, out_x, out_y, texel);
        }
    }
}

/// Source-over blend of `color` into the frame; out-of-bounds writes are ignored.
pub(super) fn blend_pixel(frame: &mut [u8], width: u32, height: u32, x: i32, y: i32, color: Rgba) {
    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
        return;
    }
    let alpha = color[3];
    if alpha == 0 {
        return;
    }
    let offset = (y as usize * width as usize + x as usize) * 4;
    let Some(dst) = frame.get_mut(offset..offset + 4) else {
        return;
    };
    if alpha == 255 {
        dst.copy_from_slice(&color);
        return;
    }
    let a = alpha as u32;
    for channel in 0..3 {
        let src = color[channel] as u32;
        let old = dst[channel] as u32;
        dst[channel] = ((src * a + old * (255 - a)) / 255) as u8;
    }
    dst[3] = 255;
}
