pub(crate) const GRASS_IMAGES: [&str; 3] = ["1.png", "2.png", "3.png"];
pub(crate) const ROCK_IMAGE: &str = "4.png";
pub(crate) const WATER_IMAGE: &str = "water.jpg";
pub(crate) const MASK_IMAGE: &str = "clown.png";

/// Images the scene cannot be built without.
pub(crate) const REQUIRED_IMAGES: &[&str] = &[
    "1.png",
    "2.png",
    "3.png",
    "4.png",
    "walk_right.png",
    "walk_left.png",
    "walk_up.png",
    "walk_down.png",
    "idle_right.png",
    "idle_left.png",
    "duck.png",
    "dancer.png",
    "water.jpg",
    "root.png",
];

const SPRITE_FRAME_PX: u32 = 64;
const MASK_FRAME_PX: u32 = 128;
const DUCK_NAME: &str = "animal";
const DUCK_POSITION: Vec2 = Vec2 {
    x: 1000.0,
    y: 1000.0,
};
const DANCER_NAME: &str = "dancer";
const DANCER_POSITION: Vec2 = Vec2 { x: 500.0, y: 500.0 };
const ROOT_PICKUP_ID: &str = "root";
const ROOT_PICKUP_TILE: TileCoord = (2, 2);
const PLAYER_LABEL: &str = "You";
const BACKGROUND: Rgba = [0, 0, 0, 255];

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum SceneError {
    #[error("required image asset `{name}` is not loaded")]
    MissingAsset { name: String },
}

/// Looping channels handed to the scene; `None` plays nothing.
#[derive(Default)]
pub(crate) struct SceneSounds {
    pub(crate) player: PlayerSounds,
    pub(crate) duck: Option<Box<dyn SoundChannel>>,
    pub(crate) dancer: Option<Box<dyn SoundChannel>>,
}

pub(crate) struct SceneSetup<'a> {
    pub(crate) config: GameConfig,
    pub(crate) world: WorldMap,
    pub(crate) composer: QuoteComposer,
    pub(crate) assets: &'a AssetStore,
    pub(crate) collage_images: Vec<String>,
    pub(crate) sounds: SceneSounds,
    pub(crate) face: Box<dyn FaceFilter>,
    pub(crate) rng: StdRng,
    pub(crate) player_spawn: Vec2,
    pub(crate) viewport_width: u32,
}

pub(crate) struct WorldScene {
    config: GameConfig,
    world: WorldMap,
    walls: WallMask,
    tiles: TileRenderCache,
    collage: CollageTexture,
    pickups: PickupRegistry,
    npcs: Vec<Npc>,
    player: PlayerAvatar,
    dialogue: DialogueOrchestrator,
    dialogue_box: DialogueBox,
    face: Box<dyn FaceFilter>,
    rng: StdRng,
    frozen_position: Option<Vec2>,
    last_tile: TileCoord,
    was_in_dialogue: bool,
    clock_origin: Instant,
    elapsed: Duration,
}

impl WorldScene {
    pub(crate) fn new(setup: SceneSetup<'_>) -> Result<Self, SceneError> {
        let SceneSetup {
            config,
            world,
            composer,
            assets,
            collage_images,
            sounds,
            face,
            mut rng,
            player_spawn,
            viewport_width,
        } = setup;

        let tile_images = TileImages {
            grass: [
                require_image(assets, GRASS_IMAGES[0])?,
                require_image(assets, GRASS_IMAGES[1])?,
                require_image(assets, GRASS_IMAGES[2])?,
            ],
            rock: require_image(assets, ROCK_IMAGE)?,
            water: sprite_sheet(assets, WATER_IMAGE, 10, 0.15)?,
        };

        let mut collage_sources = Vec::with_capacity(collage_images.len());
        for name in &collage_images {
            let image = require_image(assets, name)?;
            let size = assets.size(image).unwrap_or((0, 0));
            collage_sources.push((image, size));
        }
        let collage = CollageTexture::new(collage_sources, config.collage_period_seconds, &mut rng);

        let mut pickups = PickupRegistry::default();
        pickups.add(Pickup::new(
            ROOT_PICKUP_ID,
            ROOT_PICKUP_TILE,
            sprite_sheet(assets, "root.png", 26, 0.08)?,
        ));

        let npcs = vec![
            Npc::new(
                DUCK_NAME,
                DUCK_POSITION,
                sprite_sheet(assets, "duck.png", 4, 0.25)?,
                NpcBehavior::Quotes,
            )
            .with_ambient(sounds.duck),
            Npc::new(
                DANCER_NAME,
                DANCER_POSITION,
                sprite_sheet(assets, "dancer.png", 14, 0.25)?,
                NpcBehavior::Brain(DancerBrain::default()),
            )
            .with_ambient(sounds.dancer),
        ];

        let sheets = PlayerSheets {
            walk_up: sprite_sheet(assets, "walk_up.png", 4, 0.15)?,
            walk_down: sprite_sheet(assets, "walk_down.png", 4, 0.15)?,
            walk_left: sprite_sheet(assets, "walk_left.png", 4, 0.15)?,
            walk_right: sprite_sheet(assets, "walk_right.png", 4, 0.15)?,
            idle_left: sprite_sheet(assets, "idle_left.png", 4, 0.4)?,
            idle_right: sprite_sheet(assets, "idle_right.png", 4, 0.4)?,
        };
        let player = PlayerAvatar::new(player_spawn, sheets, sounds.player);

        Ok(Self {
            walls: WallMask::new(config.world_seed),
            tiles: TileRenderCache::new(tile_images, config.tile_lifetime),
            config,
            world,
            collage,
            pickups,
            npcs,
            last_tile: (tile_of(player_spawn.x), tile_of(player_spawn.y)),
            player,
            dialogue: DialogueOrchestrator::new(composer),
            dialogue_box: DialogueBox::new(viewport_width),
            face,
            rng,
            frozen_position: None,
            was_in_dialogue: false,
            clock_origin: Instant::now(),
            elapsed: Duration::ZERO,
        })
    }

    #[cfg(test)]
    pub(crate) fn player_position(&self) -> Vec2 {
        self.player.position()
    }

    #[cfg(test)]
    pub(crate) fn player(&self) -> &PlayerAvatar {
        &self.player
    }

    pub(crate) fn is_in_dialogue(&self) -> bool {
        self.dialogue_box.is_active()
    }

    #[cfg(test)]
    pub(crate) fn dialogue_box(&self) -> &DialogueBox {
        &self.dialogue_box
    }

    #[cfg(test)]
    pub(crate) fn dialogue(&self) -> &DialogueOrchestrator {
        &self.dialogue
    }

    #[cfg(test)]
    pub(crate) fn inventory(&self) -> &Inventory {
        self.pickups.inventory()
    }

    #[cfg(test)]
    pub(crate) fn npc_behavior(&self, name: &str) -> Option<&NpcBehavior> {
        self.npcs
            .iter()
            .find(|npc| npc.name() == name)
            .map(|npc| &npc.behavior)
    }

    #[cfg(test)]
    pub(crate) fn is_tile_cached(&self, tile: TileCoord) -> bool {
        self.tiles.is_cached(tile.0, tile.1)
    }

    /// Simulated time; advances only with update ticks.
    fn now(&self) -> Instant {
        self.clock_origin + self.elapsed
    }

    fn move_player(&mut self, dt_seconds: f32, keys: DirectionKeys) {
        if !keys.any() {
            return;
        }
        let delta = keys.delta(self.config.player_speed * dt_seconds);
        let world = &self.world;
        let walls = &mut self.walls;
        let npcs = &self.npcs;
        let pickups = &self.pickups;
        let resolved = resolve_movement(self.player.position(), delta, |tile| {
            walls.is_walkable(world, tile.0, tile.1)
                && !npcs.iter().any(|npc| npc.tile() == tile)
                && !pickups.blocks(tile)
        });
        self.player.set_position(resolved);
    }

    fn try_interact(&mut self) -> SceneCommand {
        let Some(index) = nearest_in_range(
            &self.npcs,
            self.player.position(),
            self.config.npc_interaction_radius,
        ) else {
            return SceneCommand::None;
        };
        self.start_talk(index)
    }

    fn start_talk(&mut self, index: usize) -> SceneCommand {
        if let Err(error) = self.dialogue.start(&mut self.npcs, index) {
            report_dialogue_error(&error);
            return SceneCommand::None;
        }
        self.frozen_position = Some(self.player.position());
        self.dialogue_box.open(PLAYER_LABEL, "");
        self.dialogue_box.set_typing(true);
        SceneCommand::ClearInput
    }

    fn reply_to(&mut self, text: &str) {
        match self.dialogue.respond(&mut self.npcs, text, &mut self.rng) {
            Ok(reply) => {
                let name = self
                    .dialogue
                    .conversation()
                    .map(|conversation| conversation.npc_name().to_string())
                    .unwrap_or_default();
                self.dialogue_box.open(&name, &reply);
            }
            Err(error) => report_dialogue_error(&error),
        }
    }

    fn try_collect(&mut self) {
        let range = self.config.pickup_range();
        let Some(id) = self
            .pickups
            .try_collect(self.player.position(), range)
            .map(str::to_string)
        else {
            return;
        };
        info!(
            pickup = %id,
            inventory = self.pickups.inventory().len(),
            "pickup_collected"
        );
    }

    fn track_tile(&mut self) {
        let position = self.player.position();
        let tile = (tile_of(position.x), tile_of(position.y));
        if tile == self.last_tile {
            return;
        }
        self.last_tile = tile;
        self.tiles.on_tile_changed(tile.0, tile.1);
        debug!(tx = tile.0, ty = tile.1, "tile_changed");
    }

    fn update_npcs(&mut self, dt_seconds: f32) {
        let listener = self.player.position();
        for npc in &mut self.npcs {
            npc.update(dt_seconds);
            npc.update_ambient(
                listener,
                self.config.audio_falloff,
                self.config.volume_smoothing,
            );
        }
    }

    /// Reacts to the dialogue box opening or closing during this tick.
    fn apply_dialogue_transition(&mut self) -> SceneCommand {
        let active = self.dialogue_box.is_active();
        let was_active = self.was_in_dialogue;
        self.was_in_dialogue = active;

        if active && !was_active {
            self.face.show();
            SceneCommand::None
        } else if !active && was_active {
            self.face.hide();
            self.dialogue_box.set_typing(false);
            self.frozen_position = None;
            self.dialogue.end();
            SceneCommand::ClearInput
        } else {
            SceneCommand::None
        }
    }

    fn render_tiles(&mut self, canvas: &mut dyn Canvas, top_left: Vec2, viewport: (u32, u32)) {
        let start_x = (top_left.x / TILE_SIZE).floor() as i32 - 1;
        let start_y = (top_left.y / TILE_SIZE).floor() as i32 - 1;
        let end_x = ((top_left.x + viewport.0 as f32) / TILE_SIZE).ceil() as i32 + 1;
        let end_y = ((top_left.y + viewport.1 as f32) / TILE_SIZE).ceil() as i32 + 1;
        let now = self.now();

        for ty in start_y..end_y {
            for tx in start_x..end_x {
                let dest = ScreenRect::square(
                    tx as f32 * TILE_SIZE - top_left.x,
                    ty as f32 * TILE_SIZE - top_left.y,
                    TILE_SIZE,
                );
                if self.world.char_at(tx, ty) == Some(COLLAGE_CHAR) && !self.collage.is_empty() {
                    self.collage.draw(canvas, dest);
                    continue;
                }
                let visual =
                    self.tiles
                        .get_tile(tx, ty, now, &self.world, &mut self.walls, &mut self.rng);
                self.tiles.draw(visual, canvas, dest);
            }
        }
    }
}

fn require_image(assets: &AssetStore, name: &str) -> Result<ImageId, SceneError> {
    assets.id(name).ok_or_else(|| SceneError::MissingAsset {
        name: name.to_string(),
    })
}

fn sprite_sheet(
    assets: &AssetStore,
    name: &str,
    frame_count: u32,
    frame_seconds: f32,
) -> Result<SpriteSheet, SceneError> {
    Ok(SpriteSheet {
        image: require_image(assets, name)?,
        frame_width: SPRITE_FRAME_PX,
        frame_height: SPRITE_FRAME_PX,
        frame_count,
        frame_seconds,
    })
}

/// Mask strip for the conversation overlay, if the image was loaded.
pub(crate) fn mask_sheet(assets: &AssetStore) -> Option<SpriteSheet> {
    Some(SpriteSheet {
        image: assets.id(MASK_IMAGE)?,
        frame_width: MASK_FRAME_PX,
        frame_height: MASK_FRAME_PX,
        frame_count: 6,
        frame_seconds: 0.3,
    })
}

fn report_dialogue_error(error: &DialogueError) {
    error!(error = %error, "dialogue_failed");
    if cfg!(debug_assertions) {
        panic!("dialogue failed: {error}");
    }
}
