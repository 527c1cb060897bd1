use std::time::{Duration, Instant};

use engine::{
    AssetStore, Camera2D, Canvas, ImageId, InputAction, InputSnapshot, Rgba, Scene, SceneCommand,
    ScreenRect, SoundChannel, Vec2,
};
use rand::rngs::StdRng;
use thiserror::Error;
use tracing::{debug, error, info};

mod animation;
mod brain;
mod collage;
mod config;
mod dialogue;
mod dialogue_box;
mod movement;
mod npc;
mod oracle;
mod overlay;
mod pickups;
mod player;
mod quotes;
mod tile_cache;
mod world;

use animation::SpriteSheet;
use brain::DancerBrain;
use collage::CollageTexture;
use dialogue::{DialogueError, DialogueOrchestrator};
use dialogue_box::DialogueBox;
use movement::{resolve_movement, DirectionKeys};
use npc::{nearest_in_range, Npc, NpcBehavior};
use oracle::WallMask;
use pickups::{Inventory, Pickup, PickupRegistry};
use player::{PlayerAvatar, PlayerSheets};
use tile_cache::{TileImages, TileRenderCache};
use world::{tile_of, TileCoord, COLLAGE_CHAR};

pub(crate) use config::{GameConfig, TILE_SIZE};
pub(crate) use overlay::{FaceFilter, MaskOverlay};
pub(crate) use player::PlayerSounds;
pub(crate) use quotes::{QuoteComposer, QuoteCorpus};
pub(crate) use world::{WorldMap, WorldMapDocument, WorldMapError};

include!("scene_state.rs");
include!("scene_impl.rs");
