use std::env;
use std::time::Duration;

use tracing::warn;

/// Edge length of one world tile, in world units and screen pixels.
pub(crate) const TILE_SIZE: f32 = 164.0;
pub(crate) const SEED_ENV_VAR: &str = "TILEWALK_SEED";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GameConfig {
    pub(crate) world_seed: u32,
    pub(crate) tile_lifetime: Duration,
    pub(crate) player_speed: f32,
    pub(crate) npc_interaction_radius: f32,
    pub(crate) pickup_radius_tiles: f32,
    pub(crate) audio_falloff: f32,
    pub(crate) volume_smoothing: f32,
    pub(crate) collage_period_seconds: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_seed: 1337,
            tile_lifetime: Duration::from_millis(3000),
            player_speed: 200.0,
            npc_interaction_radius: 100.0,
            pickup_radius_tiles: 10.0,
            audio_falloff: 300.0,
            volume_smoothing: 0.1,
            collage_period_seconds: 2.0,
        }
    }
}

impl GameConfig {
    pub(crate) fn from_env() -> Self {
        match env::var(SEED_ENV_VAR) {
            Ok(value) => Self::default().with_seed_override(&value),
            Err(env::VarError::NotPresent) => Self::default(),
            Err(error) => {
                warn!(
                    env_var = SEED_ENV_VAR,
                    error = %error,
                    "unable to read seed env var; using default seed"
                );
                Self::default()
            }
        }
    }

    fn with_seed_override(mut self, raw: &str) -> Self {
        match raw.trim().parse::<u32>() {
            Ok(seed) => self.world_seed = seed,
            Err(_) => {
                warn!(
                    env_var = SEED_ENV_VAR,
                    value = raw,
                    default_seed = self.world_seed,
                    "invalid seed env var value; using default seed"
                );
            }
        }
        self
    }

    pub(crate) fn pickup_range(&self) -> f32 {
        self.pickup_radius_tiles * TILE_SIZE
    }
}
