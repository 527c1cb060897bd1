use std::collections::BTreeSet;

use engine::{Canvas, Vec2};

use super::animation::{SpriteAnimator, SpriteSheet};
use super::config::TILE_SIZE;
use super::world::TileCoord;

#[derive(Debug, Clone)]
pub(crate) struct Pickup {
    id: String,
    tile: TileCoord,
    collected: bool,
    animator: SpriteAnimator,
}

impl Pickup {
    pub(crate) fn new(id: impl Into<String>, tile: TileCoord, sheet: SpriteSheet) -> Self {
        Self {
            id: id.into(),
            tile,
            collected: false,
            animator: SpriteAnimator::new(sheet),
        }
    }

    #[cfg(test)]
    pub(crate) fn is_collected(&self) -> bool {
        self.collected
    }

    fn tile_center(&self) -> Vec2 {
        Vec2::new(
            self.tile.0 as f32 * TILE_SIZE + TILE_SIZE / 2.0,
            self.tile.1 as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        )
    }

    /// Uncollected pickups occupy their tile.
    fn blocks(&self, tile: TileCoord) -> bool {
        !self.collected && self.tile == tile
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Inventory {
    ids: BTreeSet<String>,
}

impl Inventory {
    #[cfg(test)]
    pub(crate) fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PickupRegistry {
    pickups: Vec<Pickup>,
    inventory: Inventory,
}

impl PickupRegistry {
    pub(crate) fn add(&mut self, pickup: Pickup) {
        self.pickups.push(pickup);
    }

    pub(crate) fn update(&mut self, dt_seconds: f32) {
        for pickup in self.pickups.iter_mut().filter(|pickup| !pickup.collected) {
            pickup.animator.update(dt_seconds);
        }
    }

    pub(crate) fn blocks(&self, tile: TileCoord) -> bool {
        self.pickups.iter().any(|pickup| pickup.blocks(tile))
    }

    /// Collects the first uncollected pickup whose tile center is strictly closer than
    /// `range` and returns its id.
    pub(crate) fn try_collect(&mut self, position: Vec2, range: f32) -> Option<&str> {
        let index = self.pickups.iter().position(|pickup| {
            !pickup.collected && pickup.tile_center().distance(position) < range
        })?;
        let pickup = &mut self.pickups[index];
        pickup.collected = true;
        self.inventory.ids.insert(pickup.id.clone());
        Some(pickup.id.as_str())
    }

    pub(crate) fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Pickup> {
        self.pickups.iter()
    }

    pub(crate) fn render(&self, canvas: &mut dyn Canvas, top_left: Vec2) {
        for pickup in self.pickups.iter().filter(|pickup| !pickup.collected) {
            let x = pickup.tile.0 as f32 * TILE_SIZE - top_left.x;
            let y = pickup.tile.1 as f32 * TILE_SIZE - top_left.y;
            pickup.animator.draw(canvas, x, y, TILE_SIZE);
        }
    }
}
