impl Scene for WorldScene {
    fn load(&mut self) {
        info!(
            seed = self.config.world_seed,
            world_width = self.world.width(),
            world_height = self.world.height(),
            npcs = self.npcs.len(),
            pickups = self.pickups.iter().count(),
            "scene_loaded"
        );
    }

    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        self.elapsed += Duration::from_secs_f32(fixed_dt_seconds.max(0.0));
        self.dialogue_box.set_viewport_width(input.window_size().0);

        self.collage.update(fixed_dt_seconds, &mut self.rng);
        self.tiles.update_animated(fixed_dt_seconds);
        self.pickups.update(fixed_dt_seconds);
        self.face.tick(fixed_dt_seconds);

        let in_dialogue = self.dialogue_box.is_active();
        if in_dialogue {
            if let Some(frozen) = self.frozen_position {
                self.player.set_position(frozen);
            }
        }
        self.player.set_input_enabled(!in_dialogue);

        let keys = DirectionKeys::from_input(input);
        let mut command = SceneCommand::None;
        if in_dialogue {
            self.dialogue_box.update(fixed_dt_seconds, input);
            let submitted = self.dialogue_box.take_submitted();
            if let Some(text) = submitted.filter(|text| !text.is_empty()) {
                self.reply_to(&text);
            }
        } else {
            self.move_player(fixed_dt_seconds, keys);
            if input.was_pressed(InputAction::Interact) {
                command = self.try_interact();
            }
        }

        if !self.dialogue_box.is_active() && input.was_pressed(InputAction::Collect) {
            self.try_collect();
        }

        self.track_tile();
        self.player.update(fixed_dt_seconds, keys);
        self.update_npcs(fixed_dt_seconds);

        match self.apply_dialogue_transition() {
            SceneCommand::None => command,
            transition => transition,
        }
    }

    fn render(&mut self, canvas: &mut dyn Canvas) {
        canvas.clear(BACKGROUND);
        let viewport = canvas.viewport();
        let top_left = Camera2D::centered_on(self.player.position()).top_left(viewport);

        self.render_tiles(canvas, top_left, viewport);
        self.pickups.render(canvas, top_left);
        self.player.render(canvas);
        for npc in &self.npcs {
            npc.render(canvas, top_left);
        }
        self.dialogue_box.render(canvas);
        self.face.render(canvas);
    }

    fn unload(&mut self) {
        self.dialogue.end();
        info!(
            inventory = self.pickups.inventory().len(),
            "scene_unloaded"
        );
    }

    fn debug_title(&self) -> Option<String> {
        let position = self.player.position();
        let terrain = self
            .world
            .char_at(self.last_tile.0, self.last_tile.1)
            .and_then(|ch| self.world.legend_name(ch))
            .unwrap_or("unmapped");
        Some(format!(
            "tile ({}, {}) {} | pos ({:.0}, {:.0}) | items {}{}",
            self.last_tile.0,
            self.last_tile.1,
            terrain,
            position.x,
            position.y,
            self.pickups.inventory().len(),
            if self.is_in_dialogue() { " | talking" } else { "" }
        ))
    }
}
