use std::collections::HashMap;
use std::time::{Duration, Instant};

use engine::{Canvas, ImageId, ScreenRect};
use rand::Rng;

use super::animation::{SpriteAnimator, SpriteSheet};
use super::oracle::WallMask;
use super::world::{TileCoord, WorldMap, GRASS_CHAR, LIQUID_CHAR};

/// What to draw for one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TileVisual {
    Static(ImageId),
    /// The persistent animator registered for this coordinate.
    Animated(TileCoord),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct TileImages {
    pub(crate) grass: [ImageId; 3],
    pub(crate) rock: ImageId,
    pub(crate) water: SpriteSheet,
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    visual: TileVisual,
    cached_at: Instant,
}

#[derive(Debug)]
pub(crate) struct TileRenderCache {
    lifetime: Duration,
    images: TileImages,
    entries: HashMap<TileCoord, CacheEntry>,
    animated: HashMap<TileCoord, SpriteAnimator>,
}

impl TileRenderCache {
    pub(crate) fn new(images: TileImages, lifetime: Duration) -> Self {
        Self {
            lifetime,
            images,
            entries: HashMap::new(),
            animated: HashMap::new(),
        }
    }

    /// Returns the cached visual while it is younger than the lifetime, otherwise picks
    /// a fresh one and restarts its lifetime.
    pub(crate) fn get_tile<R: Rng + ?Sized>(
        &mut self,
        tx: i32,
        ty: i32,
        now: Instant,
        world: &WorldMap,
        walls: &mut WallMask,
        rng: &mut R,
    ) -> TileVisual {
        let coord = (tx, ty);
        if let Some(entry) = self.entries.get(&coord) {
            if now.saturating_duration_since(entry.cached_at) < self.lifetime {
                return entry.visual;
            }
        }

        let visual = match world.char_at(tx, ty) {
            Some(LIQUID_CHAR) => {
                let water = self.images.water;
                self.animated
                    .entry(coord)
                    .or_insert_with(|| SpriteAnimator::new(water));
                TileVisual::Animated(coord)
            }
            Some(GRASS_CHAR) | None if walls.is_wall(world, tx, ty) => {
                TileVisual::Static(self.images.rock)
            }
            _ => TileVisual::Static(self.random_grass(rng)),
        };

        self.entries.insert(
            coord,
            CacheEntry {
                visual,
                cached_at: now,
            },
        );
        visual
    }

    fn random_grass<R: Rng + ?Sized>(&self, rng: &mut R) -> ImageId {
        let index = rng.random_range(0..self.images.grass.len());
        self.images.grass[index]
    }

    /// Drops cached selections in the 3x3 block around the entered tile.
    pub(crate) fn on_tile_changed(&mut self, tx: i32, ty: i32) {
        for dy in -1..=1 {
            for dx in -1..=1 {
                self.entries.remove(&(tx + dx, ty + dy));
            }
        }
    }

    pub(crate) fn update_animated(&mut self, dt_seconds: f32) {
        for animator in self.animated.values_mut() {
            animator.update(dt_seconds);
        }
    }

    pub(crate) fn draw(&self, visual: TileVisual, canvas: &mut dyn Canvas, dest: ScreenRect) {
        match visual {
            TileVisual::Static(image) => canvas.draw_image(image, dest),
            TileVisual::Animated(coord) => {
                if let Some(animator) = self.animated.get(&coord) {
                    animator.draw(canvas, dest.x, dest.y, dest.width);
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn is_cached(&self, tx: i32, ty: i32) -> bool {
        self.entries.contains_key(&(tx, ty))
    }

    #[cfg(test)]
    pub(crate) fn animated_frame(&self, tx: i32, ty: i32) -> Option<u32> {
        self.animated
            .get(&(tx, ty))
            .map(SpriteAnimator::current_frame)
    }
}
