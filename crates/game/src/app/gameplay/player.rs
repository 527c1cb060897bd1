use engine::{Canvas, SoundChannel, Vec2};
use tracing::debug;

use super::animation::{SpriteAnimator, SpriteSheet};
use super::movement::DirectionKeys;

const SPRITE_SIZE: f32 = 264.0;
const SPRITE_OFFSET: f32 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Facing {
    Up,
    Down,
    Left,
    Right,
}

impl Facing {
    /// Up wins over down, down over left, left over right.
    fn from_keys(keys: DirectionKeys) -> Option<Self> {
        if keys.up {
            Some(Self::Up)
        } else if keys.down {
            Some(Self::Down)
        } else if keys.left {
            Some(Self::Left)
        } else if keys.right {
            Some(Self::Right)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AnimationSlot {
    Walk(Facing),
    IdleLeft,
    IdleRight,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct PlayerSheets {
    pub(crate) walk_up: SpriteSheet,
    pub(crate) walk_down: SpriteSheet,
    pub(crate) walk_left: SpriteSheet,
    pub(crate) walk_right: SpriteSheet,
    pub(crate) idle_left: SpriteSheet,
    pub(crate) idle_right: SpriteSheet,
}

#[derive(Default)]
pub(crate) struct PlayerSounds {
    pub(crate) footsteps: Option<Box<dyn SoundChannel>>,
    pub(crate) soundtrack: Option<Box<dyn SoundChannel>>,
}

pub(crate) struct PlayerAvatar {
    position: Vec2,
    facing: Facing,
    moving: bool,
    input_enabled: bool,
    soundtrack_started: bool,
    slot: AnimationSlot,
    walk_up: SpriteAnimator,
    walk_down: SpriteAnimator,
    walk_left: SpriteAnimator,
    walk_right: SpriteAnimator,
    idle_left: SpriteAnimator,
    idle_right: SpriteAnimator,
    sounds: PlayerSounds,
}

impl PlayerAvatar {
    pub(crate) fn new(position: Vec2, sheets: PlayerSheets, mut sounds: PlayerSounds) -> Self {
        for channel in [sounds.footsteps.as_mut(), sounds.soundtrack.as_mut()]
            .into_iter()
            .flatten()
        {
            channel.set_volume(1.0);
        }
        Self {
            position,
            facing: Facing::Right,
            moving: false,
            input_enabled: true,
            soundtrack_started: false,
            slot: AnimationSlot::IdleRight,
            walk_up: SpriteAnimator::new(sheets.walk_up),
            walk_down: SpriteAnimator::new(sheets.walk_down),
            walk_left: SpriteAnimator::new(sheets.walk_left),
            walk_right: SpriteAnimator::new(sheets.walk_right),
            idle_left: SpriteAnimator::new(sheets.idle_left),
            idle_right: SpriteAnimator::new(sheets.idle_right),
            sounds,
        }
    }

    pub(crate) fn position(&self) -> Vec2 {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    #[cfg(test)]
    pub(crate) fn facing(&self) -> Facing {
        self.facing
    }

    #[cfg(test)]
    pub(crate) fn is_moving(&self) -> bool {
        self.moving
    }

    pub(crate) fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    #[cfg(test)]
    pub(crate) fn animation_slot(&self) -> AnimationSlot {
        self.slot
    }

    pub(crate) fn update(&mut self, dt_seconds: f32, keys: DirectionKeys) {
        if let Some(facing) = Facing::from_keys(keys) {
            self.facing = facing;
        }
        let was_moving = self.moving;
        self.moving = keys.any() && self.input_enabled;

        if self.moving {
            self.slot = AnimationSlot::Walk(self.facing);
            self.slot_animator_mut().update(dt_seconds);
        } else {
            match self.facing {
                Facing::Left => self.slot = AnimationSlot::IdleLeft,
                Facing::Right => self.slot = AnimationSlot::IdleRight,
                Facing::Up | Facing::Down => {}
            }
            if matches!(self.slot, AnimationSlot::IdleLeft | AnimationSlot::IdleRight) {
                self.slot_animator_mut().update(dt_seconds);
            }
        }

        self.update_sounds(was_moving);
    }

    fn update_sounds(&mut self, was_moving: bool) {
        if self.moving && !was_moving {
            if let Some(footsteps) = self.sounds.footsteps.as_mut() {
                footsteps.restart();
            }
            if !self.soundtrack_started {
                self.soundtrack_started = true;
                if let Some(soundtrack) = self.sounds.soundtrack.as_mut() {
                    soundtrack.play();
                }
                debug!("soundtrack_started");
            }
        } else if !self.moving && was_moving {
            if let Some(footsteps) = self.sounds.footsteps.as_mut() {
                footsteps.pause();
            }
        }
    }

    fn slot_animator(&self) -> &SpriteAnimator {
        match self.slot {
            AnimationSlot::Walk(Facing::Up) => &self.walk_up,
            AnimationSlot::Walk(Facing::Down) => &self.walk_down,
            AnimationSlot::Walk(Facing::Left) => &self.walk_left,
            AnimationSlot::Walk(Facing::Right) => &self.walk_right,
            AnimationSlot::IdleLeft => &self.idle_left,
            AnimationSlot::IdleRight => &self.idle_right,
        }
    }

    fn slot_animator_mut(&mut self) -> &mut SpriteAnimator {
        match self.slot {
            AnimationSlot::Walk(Facing::Up) => &mut self.walk_up,
            AnimationSlot::Walk(Facing::Down) => &mut self.walk_down,
            AnimationSlot::Walk(Facing::Left) => &mut self.walk_left,
            AnimationSlot::Walk(Facing::Right) => &mut self.walk_right,
            AnimationSlot::IdleLeft => &mut self.idle_left,
            AnimationSlot::IdleRight => &mut self.idle_right,
        }
    }

    #[cfg(test)]
    pub(crate) fn current_frame(&self) -> u32 {
        self.slot_animator().current_frame()
    }

    /// The camera follows the player, so it is always drawn at screen center.
    pub(crate) fn render(&self, canvas: &mut dyn Canvas) {
        let (width, height) = canvas.viewport();
        self.slot_animator().draw(
            canvas,
            width as f32 / 2.0 - SPRITE_OFFSET,
            height as f32 / 2.0 - SPRITE_OFFSET,
            SPRITE_SIZE,
        );
    }
}
