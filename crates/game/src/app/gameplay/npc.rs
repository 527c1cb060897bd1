use engine::{Canvas, SoundChannel, Vec2};

use super::animation::{SpriteAnimator, SpriteSheet};
use super::brain::DancerBrain;
use super::config::TILE_SIZE;
use super::world::{tile_of, TileCoord};

#[derive(Debug, Clone)]
pub(crate) enum NpcBehavior {
    Brain(DancerBrain),
    /// Replies with sampled quotes.
    Quotes,
}

/// Stationary character the player can talk to.
pub(crate) struct Npc {
    name: String,
    position: Vec2,
    animator: SpriteAnimator,
    pub(crate) behavior: NpcBehavior,
    ambient: Option<Box<dyn SoundChannel>>,
}

impl Npc {
    pub(crate) fn new(
        name: impl Into<String>,
        position: Vec2,
        sheet: SpriteSheet,
        behavior: NpcBehavior,
    ) -> Self {
        Self {
            name: name.into(),
            position,
            animator: SpriteAnimator::new(sheet),
            behavior,
            ambient: None,
        }
    }

    pub(crate) fn with_ambient(mut self, channel: Option<Box<dyn SoundChannel>>) -> Self {
        self.ambient = channel;
        self
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Tile containing the NPC's anchor point; the player may not enter it.
    pub(crate) fn tile(&self) -> TileCoord {
        (tile_of(self.position.x), tile_of(self.position.y))
    }

    pub(crate) fn update(&mut self, dt_seconds: f32) {
        self.animator.update(dt_seconds);
    }

    pub(crate) fn update_ambient(&mut self, listener: Vec2, falloff: f32, smoothing: f32) {
        let Some(channel) = self.ambient.as_mut() else {
            return;
        };
        let target = ambient_target_volume(self.position.distance(listener), falloff);

        if target > 0.0 && channel.is_paused() {
            channel.play();
        } else if target <= 0.0 && !channel.is_paused() {
            channel.pause();
        }

        let volume = channel.volume();
        channel.set_volume(volume + (target - volume) * smoothing);
    }

    pub(crate) fn render(&self, canvas: &mut dyn Canvas, top_left: Vec2) {
        self.animator.draw(
            canvas,
            self.position.x - top_left.x,
            self.position.y - top_left.y,
            TILE_SIZE,
        );
    }
}

/// Linear falloff to silence at `falloff` units.
pub(crate) fn ambient_target_volume(distance: f32, falloff: f32) -> f32 {
    if distance < falloff {
        1.0 - distance / falloff
    } else {
        0.0
    }
}

/// Index of the closest NPC strictly within `radius`; ties keep the earlier NPC.
pub(crate) fn nearest_in_range(npcs: &[Npc], position: Vec2, radius: f32) -> Option<usize> {
    let radius_squared = radius * radius;
    let mut best: Option<(usize, f32)> = None;
    for (index, npc) in npcs.iter().enumerate() {
        let distance_squared = npc.position.distance_squared(position);
        if distance_squared >= radius_squared {
            continue;
        }
        match best {
            Some((_, best_distance)) if best_distance <= distance_squared => {}
            _ => best = Some((index, distance_squared)),
        }
    }
    best.map(|(index, _)| index)
}
