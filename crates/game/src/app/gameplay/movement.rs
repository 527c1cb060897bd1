use engine::{InputAction, InputSnapshot, Vec2};

use super::config::TILE_SIZE;
use super::world::TileCoord;

/// Held movement keys for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct DirectionKeys {
    pub(crate) up: bool,
    pub(crate) down: bool,
    pub(crate) left: bool,
    pub(crate) right: bool,
}

impl DirectionKeys {
    pub(crate) fn from_input(input: &InputSnapshot) -> Self {
        Self {
            up: input.is_down(InputAction::MoveUp),
            down: input.is_down(InputAction::MoveDown),
            left: input.is_down(InputAction::MoveLeft),
            right: input.is_down(InputAction::MoveRight),
        }
    }

    pub(crate) fn any(self) -> bool {
        self.up || self.down || self.left || self.right
    }

    /// Opposite keys cancel.
    pub(crate) fn delta(self, step: f32) -> Vec2 {
        let mut delta = Vec2::default();
        if self.left {
            delta.x -= step;
        }
        if self.right {
            delta.x += step;
        }
        if self.up {
            delta.y -= step;
        }
        if self.down {
            delta.y += step;
        }
        delta
    }
}

/// Tile holding the player's center point for a top-left sprite anchor.
pub(crate) fn center_tile(position: Vec2) -> TileCoord {
    let half = TILE_SIZE / 2.0;
    (
        ((position.x + half) / TILE_SIZE).floor() as i32,
        ((position.y + half) / TILE_SIZE).floor() as i32,
    )
}

/// Applies `delta` one axis at a time, X first. An axis whose candidate center tile
/// is not passable keeps its old value.
pub(crate) fn resolve_movement(
    position: Vec2,
    delta: Vec2,
    mut is_passable: impl FnMut(TileCoord) -> bool,
) -> Vec2 {
    let mut resolved = position;

    if delta.x != 0.0 {
        let candidate = Vec2::new(resolved.x + delta.x, resolved.y);
        if is_passable(center_tile(candidate)) {
            resolved.x = candidate.x;
        }
    }

    if delta.y != 0.0 {
        let candidate = Vec2::new(resolved.x, resolved.y + delta.y);
        if is_passable(center_tile(candidate)) {
            resolved.y = candidate.y;
        }
    }

    resolved
}
