use std::collections::HashMap;

use super::world::{is_reserved, TileCoord, WorldMap};

pub(crate) const WALL_THRESHOLD: f32 = 0.12;

/// Deterministic value in `[0, 1]` for a tile and seed.
///
/// The middle xor-shift is sign-propagating: the state is reinterpreted as `i32`
/// before shifting right.
pub(crate) fn wall_chance(tx: i32, ty: i32, seed: u32) -> f32 {
    let mut h = (tx as u32)
        .wrapping_mul(374_761_393)
        .wrapping_add((ty as u32).wrapping_mul(668_265_263))
        .wrapping_add(seed.wrapping_mul(1_442_695_040));
    h ^= h << 13;
    h ^= ((h as i32) >> 17) as u32;
    h ^= h << 5;
    (h as f64 / u32::MAX as f64) as f32
}

/// Memoized wall decisions. Entries are never invalidated.
#[derive(Debug)]
pub(crate) struct WallMask {
    seed: u32,
    walls: HashMap<TileCoord, bool>,
}

impl WallMask {
    pub(crate) fn new(seed: u32) -> Self {
        Self {
            seed,
            walls: HashMap::new(),
        }
    }

    pub(crate) fn is_wall(&mut self, world: &WorldMap, tx: i32, ty: i32) -> bool {
        let seed = self.seed;
        *self.walls.entry((tx, ty)).or_insert_with(|| match world.char_at(tx, ty) {
            Some(ch) if is_reserved(ch) => false,
            _ => wall_chance(tx, ty, seed) < WALL_THRESHOLD,
        })
    }

    pub(crate) fn is_walkable(&mut self, world: &WorldMap, tx: i32, ty: i32) -> bool {
        if world.char_at(tx, ty).is_some_and(is_reserved) {
            return true;
        }
        !self.is_wall(world, tx, ty)
    }

    #[cfg(test)]
    pub(crate) fn cached_len(&self) -> usize {
        self.walls.len()
    }
}
