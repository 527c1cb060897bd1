    use std::cell::RefCell;
    use std::rc::Rc;

    use engine::{LoadedImage, SourceRect, TypedKey};
    use rand::SeedableRng;

    use super::brain::DancerState;
    use super::player::{AnimationSlot, Facing};
    use super::*;

    const DT: f32 = 1.0 / 60.0;
    const VIEWPORT: (u32, u32) = (1280, 720);
    const NEAR_DANCER: Vec2 = Vec2 { x: 405.0, y: 500.0 };
    const COLLAGE_IMAGE: &str = "collage_a.png";

    #[derive(Debug)]
    struct ChannelLog {
        paused: bool,
        volume: f32,
        plays: u32,
        pauses: u32,
        restarts: u32,
    }

    impl Default for ChannelLog {
        fn default() -> Self {
            Self {
                paused: true,
                volume: 0.0,
                plays: 0,
                pauses: 0,
                restarts: 0,
            }
        }
    }

    struct FakeChannel(Rc<RefCell<ChannelLog>>);

    impl SoundChannel for FakeChannel {
        fn play(&mut self) {
            let mut log = self.0.borrow_mut();
            log.paused = false;
            log.plays += 1;
        }

        fn pause(&mut self) {
            let mut log = self.0.borrow_mut();
            log.paused = true;
            log.pauses += 1;
        }

        fn restart(&mut self) {
            let mut log = self.0.borrow_mut();
            log.paused = false;
            log.restarts += 1;
        }

        fn is_paused(&self) -> bool {
            self.0.borrow().paused
        }

        fn volume(&self) -> f32 {
            self.0.borrow().volume
        }

        fn set_volume(&mut self, volume: f32) {
            self.0.borrow_mut().volume = volume;
        }
    }

    fn fake_channel() -> (Rc<RefCell<ChannelLog>>, Option<Box<dyn SoundChannel>>) {
        let log = Rc::new(RefCell::new(ChannelLog::default()));
        let channel: Box<dyn SoundChannel> = Box::new(FakeChannel(Rc::clone(&log)));
        (log, Some(channel))
    }

    struct RecordingFace {
        events: Rc<RefCell<Vec<&'static str>>>,
        visible: bool,
    }

    impl FaceFilter for RecordingFace {
        fn show(&mut self) {
            self.visible = true;
            self.events.borrow_mut().push("show");
        }

        fn hide(&mut self) {
            self.visible = false;
            self.events.borrow_mut().push("hide");
        }

        fn is_visible(&self) -> bool {
            self.visible
        }
    }

    #[derive(Default)]
    struct RecordingCanvas {
        images: Vec<(ImageId, ScreenRect)>,
        regions: Vec<(ImageId, SourceRect, ScreenRect)>,
        texts: Vec<String>,
    }

    impl Canvas for RecordingCanvas {
        fn viewport(&self) -> (u32, u32) {
            VIEWPORT
        }

        fn clear(&mut self, _color: Rgba) {}

        fn draw_image(&mut self, image: ImageId, dest: ScreenRect) {
            self.images.push((image, dest));
        }

        fn draw_image_region(&mut self, image: ImageId, source: SourceRect, dest: ScreenRect) {
            self.regions.push((image, source, dest));
        }

        fn fill_rect(&mut self, _dest: ScreenRect, _color: Rgba) {}

        fn stroke_rect(&mut self, _dest: ScreenRect, _color: Rgba) {}

        fn draw_text(&mut self, _x: f32, _y: f32, text: &str, _color: Rgba) {
            self.texts.push(text.to_string());
        }
    }

    fn pixel() -> LoadedImage {
        LoadedImage::from_rgba(1, 1, vec![255; 4]).expect("1x1 image")
    }

    fn test_assets(skip: &[&str], extra: &[&str]) -> AssetStore {
        let mut assets = AssetStore::default();
        for name in REQUIRED_IMAGES.iter().filter(|name| !skip.contains(*name)) {
            assets.insert(*name, pixel());
        }
        for name in extra {
            assets.insert(*name, pixel());
        }
        assets
    }

    fn composer() -> QuoteComposer {
        let mut corpus = QuoteCorpus::new();
        corpus.insert(
            "walker".to_string(),
            vec!["the ground keeps every step we ever took".to_string()],
        );
        QuoteComposer::new(corpus)
    }

    fn world_filled_with(ch: char) -> WorldMap {
        let row = ch.to_string().repeat(20);
        let rows: Vec<&str> = vec![row.as_str(); 20];
        WorldMap::from_rows(&rows).expect("valid world")
    }

    struct Harness {
        scene: WorldScene,
        face_events: Rc<RefCell<Vec<&'static str>>>,
        duck: Rc<RefCell<ChannelLog>>,
        dancer: Rc<RefCell<ChannelLog>>,
        footsteps: Rc<RefCell<ChannelLog>>,
        soundtrack: Rc<RefCell<ChannelLog>>,
    }

    fn build_scene(
        world: WorldMap,
        assets: &AssetStore,
        collage_images: Vec<String>,
        spawn: Vec2,
    ) -> Result<Harness, SceneError> {
        let face_events = Rc::new(RefCell::new(Vec::new()));
        let (duck, duck_channel) = fake_channel();
        let (dancer, dancer_channel) = fake_channel();
        let (footsteps, footsteps_channel) = fake_channel();
        let (soundtrack, soundtrack_channel) = fake_channel();

        let scene = WorldScene::new(SceneSetup {
            config: GameConfig::default(),
            world,
            composer: composer(),
            assets,
            collage_images,
            sounds: SceneSounds {
                player: PlayerSounds {
                    footsteps: footsteps_channel,
                    soundtrack: soundtrack_channel,
                },
                duck: duck_channel,
                dancer: dancer_channel,
            },
            face: Box::new(RecordingFace {
                events: Rc::clone(&face_events),
                visible: false,
            }),
            rng: StdRng::seed_from_u64(1337),
            player_spawn: spawn,
            viewport_width: VIEWPORT.0,
        })?;

        Ok(Harness {
            scene,
            face_events,
            duck,
            dancer,
            footsteps,
            soundtrack,
        })
    }

    fn harness_at(spawn: Vec2) -> Harness {
        let assets = test_assets(&[], &[]);
        build_scene(world_filled_with('W'), &assets, Vec::new(), spawn).expect("scene builds")
    }

    fn idle() -> InputSnapshot {
        InputSnapshot::empty().with_window_size(VIEWPORT)
    }

    fn pressed(action: InputAction) -> InputSnapshot {
        idle().with_action_pressed(action)
    }

    fn held(action: InputAction) -> InputSnapshot {
        idle().with_action_down(action, true)
    }

    fn typed(text: &str) -> InputSnapshot {
        idle().with_typed_keys(
            text.chars()
                .map(TypedKey::Char)
                .chain(std::iter::once(TypedKey::Enter)),
        )
    }

    fn close_dialogue(harness: &mut Harness) -> SceneCommand {
        for _ in 0..100 {
            let command = harness.scene.update(DT, &pressed(InputAction::Confirm));
            if !harness.scene.is_in_dialogue() {
                return command;
            }
        }
        panic!("dialogue did not close");
    }

    fn dancer_state(scene: &WorldScene) -> Option<DancerState> {
        match scene.npc_behavior("dancer") {
            Some(NpcBehavior::Brain(brain)) => Some(brain.state()),
            _ => None,
        }
    }

    fn assert_position(actual: Vec2, x: f32, y: f32) {
        assert!(
            (actual.x - x).abs() < 0.001 && (actual.y - y).abs() < 0.001,
            "expected ({x}, {y}), got ({}, {})",
            actual.x,
            actual.y
        );
    }

    #[test]
    fn talking_to_dancer_freezes_player_and_toggles_overlay() {
        let mut harness = harness_at(NEAR_DANCER);

        let command = harness.scene.update(DT, &pressed(InputAction::Interact));
        assert_eq!(command, SceneCommand::ClearInput);
        assert!(harness.scene.is_in_dialogue());
        assert!(harness.scene.dialogue_box().is_typing());
        assert_eq!(harness.scene.dialogue_box().name(), "You");
        assert_eq!(*harness.face_events.borrow(), vec!["show"]);

        for _ in 0..10 {
            harness.scene.update(DT, &held(InputAction::MoveLeft));
        }
        assert_position(harness.scene.player_position(), 405.0, 500.0);
        assert!(!harness.scene.player().is_moving());

        harness.scene.update(DT, &typed("hello"));
        assert_eq!(harness.scene.dialogue_box().name(), "dancer");
        assert!(!harness.scene.dialogue_box().is_typing());
        assert_eq!(dancer_state(&harness.scene), Some(DancerState::HintNorth));
        assert_eq!(harness.scene.dialogue().history().len(), 2);

        let command = close_dialogue(&mut harness);
        assert_eq!(command, SceneCommand::ClearInput);
        assert_eq!(*harness.face_events.borrow(), vec!["show", "hide"]);
        assert!(!harness.scene.dialogue().is_active());

        harness.scene.update(0.1, &held(InputAction::MoveLeft));
        assert_position(harness.scene.player_position(), 385.0, 500.0);
    }

    #[test]
    fn brain_progress_survives_between_conversations() {
        let mut harness = harness_at(NEAR_DANCER);

        harness.scene.update(DT, &pressed(InputAction::Interact));
        harness.scene.update(DT, &typed("hello"));
        close_dialogue(&mut harness);

        harness.scene.update(DT, &pressed(InputAction::Interact));
        harness.scene.update(DT, &typed("I went up north"));
        close_dialogue(&mut harness);

        assert_eq!(dancer_state(&harness.scene), Some(DancerState::HintRoot));
    }

    #[test]
    fn interact_out_of_range_does_nothing() {
        let mut harness = harness_at(Vec2::new(0.0, 0.0));

        let command = harness.scene.update(DT, &pressed(InputAction::Interact));

        assert_eq!(command, SceneCommand::None);
        assert!(!harness.scene.is_in_dialogue());
        assert!(harness.face_events.borrow().is_empty());
    }

    #[test]
    fn typed_letters_never_collect_during_dialogue() {
        let mut harness = harness_at(NEAR_DANCER);
        harness.scene.update(DT, &pressed(InputAction::Interact));

        let input = pressed(InputAction::Collect).with_typed_keys([TypedKey::Char('f')]);
        harness.scene.update(DT, &input);

        assert!(!harness.scene.inventory().contains("root"));
        assert_eq!(harness.scene.dialogue_box().typed(), "f");

        harness.scene.update(DT, &typed(""));
        close_dialogue(&mut harness);
        harness.scene.update(DT, &pressed(InputAction::Collect));

        assert!(harness.scene.inventory().contains("root"));
    }

    #[test]
    fn blank_submission_is_not_a_conversation_turn() {
        let mut harness = harness_at(NEAR_DANCER);
        harness.scene.update(DT, &pressed(InputAction::Interact));

        harness.scene.update(DT, &typed("   "));

        assert_eq!(dancer_state(&harness.scene), Some(DancerState::Intro));
        assert!(harness.scene.dialogue().history().is_empty());
        assert!(harness.scene.is_in_dialogue());
        assert!(!harness.scene.dialogue_box().is_typing());
        assert_eq!(harness.scene.dialogue_box().pages(), [String::new()]);
    }

    #[test]
    fn confirm_keys_while_typing_are_treated_as_text() {
        let mut harness = harness_at(NEAR_DANCER);
        harness.scene.update(DT, &pressed(InputAction::Interact));

        let input = pressed(InputAction::Confirm).with_typed_keys([TypedKey::Char(' ')]);
        harness.scene.update(DT, &input);

        assert!(harness.scene.is_in_dialogue());
        assert!(harness.scene.dialogue_box().is_typing());
        assert_eq!(harness.scene.dialogue_box().typed(), " ");
    }

    #[test]
    fn npc_tile_blocks_movement_on_that_axis_only() {
        let mut harness = harness_at(NEAR_DANCER);

        let input = held(InputAction::MoveRight).with_action_down(InputAction::MoveUp, true);
        harness.scene.update(0.1, &input);

        assert_position(harness.scene.player_position(), 405.0, 480.0);
    }

    #[test]
    fn pickup_blocks_until_collected() {
        let mut harness = harness_at(Vec2::new(410.0, 250.0));

        harness.scene.update(0.1, &held(InputAction::MoveLeft));
        assert_position(harness.scene.player_position(), 410.0, 250.0);

        harness.scene.update(DT, &pressed(InputAction::Collect));
        assert!(harness.scene.inventory().contains("root"));

        harness.scene.update(0.1, &held(InputAction::MoveLeft));
        assert_position(harness.scene.player_position(), 390.0, 250.0);
    }

    #[test]
    fn ambient_volume_eases_toward_distance_target() {
        let mut harness = harness_at(NEAR_DANCER);

        harness.scene.update(DT, &idle());

        let dancer = harness.dancer.borrow();
        let target = 1.0 - 95.0 / 300.0;
        assert!((dancer.volume - target * 0.1).abs() < 0.0001);
        assert!(!dancer.paused);
        assert_eq!(dancer.plays, 1);

        let duck = harness.duck.borrow();
        assert!(duck.paused);
        assert_eq!(duck.volume, 0.0);
    }

    #[test]
    fn entering_a_new_tile_evicts_its_neighborhood() {
        let mut harness = harness_at(NEAR_DANCER);
        harness.scene.render(&mut RecordingCanvas::default());
        assert!(harness.scene.is_tile_cached((1, 3)));
        assert!(harness.scene.is_tile_cached((5, 5)));

        harness.scene.update(0.5, &held(InputAction::MoveLeft));

        assert_position(harness.scene.player_position(), 305.0, 500.0);
        for ty in 2..=4 {
            for tx in 0..=2 {
                assert!(!harness.scene.is_tile_cached((tx, ty)), "({tx}, {ty})");
            }
        }
        assert!(harness.scene.is_tile_cached((5, 5)));
        assert!(harness.scene.is_tile_cached((3, 3)));
    }

    #[test]
    fn walking_starts_footsteps_and_soundtrack_once() {
        let mut harness = harness_at(Vec2::new(0.0, 0.0));
        assert_eq!(harness.footsteps.borrow().volume, 1.0);
        assert_eq!(harness.soundtrack.borrow().volume, 1.0);

        harness.scene.update(DT, &held(InputAction::MoveDown));
        harness.scene.update(DT, &idle());
        harness.scene.update(DT, &held(InputAction::MoveDown));

        assert_eq!(harness.footsteps.borrow().restarts, 2);
        assert_eq!(harness.footsteps.borrow().pauses, 1);
        assert_eq!(harness.soundtrack.borrow().plays, 1);
    }

    #[test]
    fn player_animation_tracks_direction_and_idle_side() {
        let mut harness = harness_at(Vec2::new(0.0, 0.0));
        assert_eq!(
            harness.scene.player().animation_slot(),
            AnimationSlot::IdleRight
        );

        let up_and_left = held(InputAction::MoveUp).with_action_down(InputAction::MoveLeft, true);
        harness.scene.update(DT, &up_and_left);
        assert_eq!(harness.scene.player().facing(), Facing::Up);
        assert_eq!(
            harness.scene.player().animation_slot(),
            AnimationSlot::Walk(Facing::Up)
        );

        for _ in 0..30 {
            harness.scene.update(DT, &idle());
        }
        let player = harness.scene.player();
        assert_eq!(player.animation_slot(), AnimationSlot::Walk(Facing::Up));
        assert_eq!(player.current_frame(), 0);

        harness.scene.update(DT, &held(InputAction::MoveLeft));
        harness.scene.update(DT, &idle());
        assert_eq!(
            harness.scene.player().animation_slot(),
            AnimationSlot::IdleLeft
        );
    }

    #[test]
    fn missing_required_image_fails_construction() {
        let assets = test_assets(&["dancer.png"], &[]);

        let result = build_scene(world_filled_with('W'), &assets, Vec::new(), Vec2::default());

        match result {
            Err(error) => assert_eq!(
                error,
                SceneError::MissingAsset {
                    name: "dancer.png".to_string()
                }
            ),
            Ok(_) => panic!("scene should not build without dancer.png"),
        }
    }

    #[test]
    fn collage_tiles_draw_collage_crops() {
        let assets = test_assets(&[], &[COLLAGE_IMAGE]);
        let collage_id = assets.id(COLLAGE_IMAGE).expect("collage image");
        let mut harness = build_scene(
            world_filled_with('C'),
            &assets,
            vec![COLLAGE_IMAGE.to_string()],
            Vec2::new(1640.0, 1640.0),
        )
        .expect("scene builds");

        let mut canvas = RecordingCanvas::default();
        harness.scene.render(&mut canvas);

        let collage_draws = canvas
            .regions
            .iter()
            .filter(|(image, _, _)| *image == collage_id)
            .count();
        assert!(collage_draws > 0);
        assert_eq!(collage_draws % 4, 0);
        assert!(canvas.images.is_empty());
    }

    #[test]
    fn collage_tiles_fall_back_to_grass_without_sources() {
        let assets = test_assets(&[], &[]);
        let grass: Vec<ImageId> = GRASS_IMAGES
            .iter()
            .map(|name| assets.id(name).expect("grass image"))
            .collect();
        let mut harness = build_scene(
            world_filled_with('C'),
            &assets,
            Vec::new(),
            Vec2::new(1640.0, 1640.0),
        )
        .expect("scene builds");

        let mut canvas = RecordingCanvas::default();
        harness.scene.render(&mut canvas);

        assert!(!canvas.images.is_empty());
        assert!(canvas.images.iter().all(|(image, _)| grass.contains(image)));
    }

    #[test]
    fn tile_choices_expire_on_scene_time() {
        let assets = test_assets(&[], &[]);
        let mut harness = build_scene(
            world_filled_with('G'),
            &assets,
            Vec::new(),
            Vec2::new(1640.0, 1640.0),
        )
        .expect("scene builds");
        let mut first = RecordingCanvas::default();
        harness.scene.render(&mut first);

        for _ in 0..170 {
            harness.scene.update(DT, &idle());
        }
        let mut held = RecordingCanvas::default();
        harness.scene.render(&mut held);
        assert_eq!(held.images, first.images);

        for _ in 0..20 {
            harness.scene.update(DT, &idle());
        }
        let mut rerolled = RecordingCanvas::default();
        harness.scene.render(&mut rerolled);
        assert_eq!(rerolled.images.len(), first.images.len());
        assert_ne!(rerolled.images, first.images);
    }

    #[test]
    fn render_shows_dialogue_text_and_prompt() {
        let mut harness = harness_at(NEAR_DANCER);
        harness.scene.update(DT, &pressed(InputAction::Interact));
        harness.scene.update(DT, &idle().with_typed_keys([TypedKey::Char('h')]));

        let mut canvas = RecordingCanvas::default();
        harness.scene.render(&mut canvas);

        assert!(canvas.texts.contains(&"You".to_string()));
        assert!(canvas.texts.contains(&"h_".to_string()));
    }

    #[test]
    fn debug_title_reports_tile_and_dialogue() {
        let mut harness = harness_at(NEAR_DANCER);
        let before = harness.scene.debug_title().expect("title");
        assert!(before.starts_with("tile (2, 3) unmapped |"));
        assert!(!before.contains("talking"));

        harness.scene.update(DT, &pressed(InputAction::Interact));

        let during = harness.scene.debug_title().expect("title");
        assert!(during.ends_with("| talking"));
    }

