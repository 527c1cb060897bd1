use engine::{Canvas, ImageId, ScreenRect, SourceRect};

/// Horizontal strip of equally sized frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SpriteSheet {
    pub(crate) image: ImageId,
    pub(crate) frame_width: u32,
    pub(crate) frame_height: u32,
    pub(crate) frame_count: u32,
    pub(crate) frame_seconds: f32,
}

#[derive(Debug, Clone)]
pub(crate) struct SpriteAnimator {
    sheet: SpriteSheet,
    current_frame: u32,
    elapsed: f32,
}

impl SpriteAnimator {
    pub(crate) fn new(sheet: SpriteSheet) -> Self {
        Self {
            sheet,
            current_frame: 0,
            elapsed: 0.0,
        }
    }

    /// Advances at most one frame per call.
    pub(crate) fn update(&mut self, dt_seconds: f32) {
        self.elapsed += dt_seconds;
        if self.elapsed >= self.sheet.frame_seconds {
            self.elapsed = 0.0;
            self.current_frame = (self.current_frame + 1) % self.sheet.frame_count.max(1);
        }
    }

    #[cfg(test)]
    pub(crate) fn current_frame(&self) -> u32 {
        self.current_frame
    }

    pub(crate) fn source_rect(&self) -> SourceRect {
        SourceRect {
            x: self.current_frame * self.sheet.frame_width,
            y: 0,
            width: self.sheet.frame_width,
            height: self.sheet.frame_height,
        }
    }

    pub(crate) fn draw(&self, canvas: &mut dyn Canvas, x: f32, y: f32, size: f32) {
        canvas.draw_image_region(
            self.sheet.image,
            self.source_rect(),
            ScreenRect::square(x, y, size),
        );
    }
}
