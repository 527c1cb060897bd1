use engine::{Canvas, ImageId, ScreenRect, SourceRect};
use rand::Rng;

use super::config::TILE_SIZE;

const QUADRANTS: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
struct CollagePiece {
    image: ImageId,
    source: SourceRect,
}

/// Shared texture for collage tiles: four random crops, reshuffled periodically.
#[derive(Debug, Clone)]
pub(crate) struct CollageTexture {
    sources: Vec<(ImageId, (u32, u32))>,
    pieces: Vec<CollagePiece>,
    timer: f32,
    period_seconds: f32,
}

impl CollageTexture {
    pub(crate) fn new<R: Rng + ?Sized>(
        sources: Vec<(ImageId, (u32, u32))>,
        period_seconds: f32,
        rng: &mut R,
    ) -> Self {
        let mut collage = Self {
            sources,
            pieces: Vec::new(),
            timer: 0.0,
            period_seconds,
        };
        collage.compose(rng);
        collage
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub(crate) fn update<R: Rng + ?Sized>(&mut self, dt_seconds: f32, rng: &mut R) {
        self.timer += dt_seconds;
        if self.timer > self.period_seconds {
            self.compose(rng);
            self.timer = 0.0;
        }
    }

    fn compose<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.pieces.clear();
        if self.sources.is_empty() {
            return;
        }
        let crop = (TILE_SIZE / 2.0) as u32;
        for _ in 0..QUADRANTS {
            let (image, (width, height)) = self.sources[rng.random_range(0..self.sources.len())];
            let crop_width = crop.min(width);
            let crop_height = crop.min(height);
            let x = if width > crop_width {
                rng.random_range(0..=width - crop_width)
            } else {
                0
            };
            let y = if height > crop_height {
                rng.random_range(0..=height - crop_height)
            } else {
                0
            };
            self.pieces.push(CollagePiece {
                image,
                source: SourceRect {
                    x,
                    y,
                    width: crop_width,
                    height: crop_height,
                },
            });
        }
    }

    pub(crate) fn draw(&self, canvas: &mut dyn Canvas, dest: ScreenRect) {
        let half_width = dest.width / 2.0;
        let half_height = dest.height / 2.0;
        for (index, piece) in self.pieces.iter().enumerate() {
            let column = (index % 2) as f32;
            let row = (index / 2) as f32;
            canvas.draw_image_region(
                piece.image,
                piece.source,
                ScreenRect::new(
                    dest.x + column * half_width,
                    dest.y + row * half_height,
                    half_width,
                    half_height,
                ),
            );
        }
    }
}
