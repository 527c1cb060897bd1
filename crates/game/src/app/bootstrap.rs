use std::path::Path;

use engine::{
    read_json_document, resolve_app_paths, AssetError, AssetStore, AudioContext, ContentError,
    LoopConfig, Scene, SoundChannel, StartupError, Vec2,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::gameplay::{
    mask_sheet, GameConfig, MaskOverlay, PlayerSounds, QuoteComposer, QuoteCorpus, SceneError,
    SceneSetup, SceneSounds, WorldMap, WorldMapDocument, WorldMapError, WorldScene, MASK_IMAGE,
    REQUIRED_IMAGES,
};

const WORLD_FILE: &str = "world.json";
const QUOTES_FILE: &str = "npcQuotes.json";
const COLLAGE_FILE: &str = "collage.json";
const PLAYER_SPAWN: Vec2 = Vec2 { x: 0.0, y: 0.0 };

/// Sound name -> file in the asset directory.
const SOUND_FILES: &[(&str, &str)] = &[
    ("footsteps", "horse.mp3"),
    ("soundtrack", "soundtrack.mp3"),
    ("duck", "duck.mp3"),
    ("dancer", "dancer.mp3"),
];

#[derive(Debug, Deserialize)]
struct CollageDocument {
    #[serde(default)]
    images: Vec<String>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("invalid world map: {0}")]
    WorldMap(#[from] WorldMapError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
    pub(crate) assets: AssetStore,
    /// Owns the output device; channels go silent once it is dropped.
    pub(crate) audio: AudioContext,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "=== tilewalk startup ===");

    let game_config = GameConfig::from_env();
    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        seed = game_config.world_seed,
        "app_paths_resolved"
    );
    let assets_dir = paths.assets_dir.as_path();

    let collage = load_collage_document(assets_dir)?;
    let mut assets = AssetStore::load_from_dir(
        assets_dir,
        REQUIRED_IMAGES
            .iter()
            .copied()
            .chain(collage.images.iter().map(String::as_str)),
    )?;
    if let Err(error) = assets.load_file(assets_dir, MASK_IMAGE) {
        warn!(error = %error, "face_mask_unavailable");
    }

    let world = WorldMap::from_document(read_json_document::<WorldMapDocument>(
        &assets_dir.join(WORLD_FILE),
    )?)?;
    info!(
        width = world.width(),
        height = world.height(),
        "world_map_loaded"
    );

    let corpus = read_json_document::<QuoteCorpus>(&assets_dir.join(QUOTES_FILE))?;
    let composer = QuoteComposer::new(corpus);
    info!(authors = composer.author_count(), "quotes_loaded");

    let mut audio = AudioContext::new();
    for (name, file) in SOUND_FILES {
        audio.load_sound(name, &assets_dir.join(file));
    }
    info!(
        available = audio.is_available(),
        sounds = audio.loaded_count(),
        "audio_ready"
    );
    let sounds = SceneSounds {
        player: PlayerSounds {
            footsteps: looping_channel(&mut audio, "footsteps"),
            soundtrack: looping_channel(&mut audio, "soundtrack"),
        },
        duck: looping_channel(&mut audio, "duck"),
        dancer: looping_channel(&mut audio, "dancer"),
    };

    let config = LoopConfig::default();
    let scene = WorldScene::new(SceneSetup {
        config: game_config,
        world,
        composer,
        assets: &assets,
        collage_images: collage.images,
        sounds,
        face: Box::new(MaskOverlay::new(mask_sheet(&assets))),
        rng: StdRng::from_os_rng(),
        player_spawn: PLAYER_SPAWN,
        viewport_width: config.window_width,
    })?;

    Ok(AppWiring {
        config,
        scene: Box::new(scene),
        assets,
        audio,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn load_collage_document(assets_dir: &Path) -> Result<CollageDocument, ContentError> {
    let document: CollageDocument = read_json_document(&assets_dir.join(COLLAGE_FILE))?;
    info!(images = document.images.len(), "collage_document_loaded");
    Ok(document)
}

fn looping_channel(audio: &mut AudioContext, name: &str) -> Option<Box<dyn SoundChannel>> {
    audio
        .looping(name)
        .map(|sound| Box::new(sound) as Box<dyn SoundChannel>)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn missing_collage_document_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");

        let error = load_collage_document(dir.path()).expect_err("document is required");

        assert!(matches!(error, ContentError::Read { .. }));
        let error: BootstrapError = error.into();
        assert!(matches!(error, BootstrapError::Content(_)));
    }

    #[test]
    fn collage_document_without_images_key_has_no_sources() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(COLLAGE_FILE), "{}").expect("write collage.json");

        let document = load_collage_document(dir.path()).expect("empty document");

        assert!(document.images.is_empty());
    }

    #[test]
    fn collage_document_lists_image_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join(COLLAGE_FILE),
            r#"{ "images": ["collage/a.png", "collage/b.png"] }"#,
        )
        .expect("write collage.json");

        let document = load_collage_document(dir.path()).expect("valid document");

        assert_eq!(document.images, vec!["collage/a.png", "collage/b.png"]);
    }

    #[test]
    fn malformed_collage_document_is_a_content_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(COLLAGE_FILE), r#"{ "images": [1] }"#)
            .expect("write collage.json");

        let error = load_collage_document(dir.path()).expect_err("malformed document");

        assert!(matches!(error, ContentError::Parse { .. }));
    }

    #[test]
    fn world_map_errors_convert_into_bootstrap_errors() {
        let error: BootstrapError = WorldMapError::NoRows.into();

        assert!(error.to_string().contains("no rows"));
    }
}
