use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::assets::AssetStore;

use super::input::{ActionStates, TypedKey};
use super::metrics::LoopMetrics;
use super::{InputAction, InputSnapshot, Renderer, Scene, SceneCommand};

const MAX_TYPED_KEYS_PER_TICK: usize = 256;

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "tilewalk".to_string(),
            window_width: 1280,
            window_height: 720,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(
    config: LoopConfig,
    mut scene: Box<dyn Scene>,
    assets: AssetStore,
) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer =
        Renderer::new(Arc::clone(&window), assets).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();
    let initial_size = window.inner_size();
    let mut input_collector = InputCollector::new(initial_size.width, initial_size.height);

    scene.load();
    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut metrics = LoopMetrics::new(metrics_log_interval, last_frame_instant);
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    input_collector.mark_quit_requested();
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    input_collector.set_window_size(new_size.width, new_size.height);
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    input_collector.set_window_size(size.width, size.height);
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::Focused(false) => {
                    input_collector.release_held();
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                    if input_collector.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                    accumulator = accumulator.saturating_add(clamped_frame_dt);

                    let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    for _ in 0..step_plan.ticks_to_run {
                        let input_snapshot = input_collector.snapshot_for_tick();
                        match scene.update(fixed_dt_seconds, &input_snapshot) {
                            SceneCommand::None => {}
                            SceneCommand::ClearInput => input_collector.clear(),
                            SceneCommand::Quit => {
                                info!(reason = "scene_request", "shutdown_requested");
                                window_target.exit();
                            }
                        }
                    }
                    accumulator = step_plan.remaining_accumulator;

                    if step_plan.dropped_backlog > Duration::ZERO {
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame, "sim_clamp_triggered"
                        );
                    }

                    if let Err(error) = renderer.render_scene(scene.as_mut()) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }

                    let next_title = scene.debug_title();
                    if next_title != last_applied_title {
                        if let Some(title) = &next_title {
                            window.set_title(title);
                        } else {
                            window.set_title(&config.window_title);
                        }
                        last_applied_title = next_title;
                    }
                    metrics.record_frame(
                        raw_frame_dt,
                        step_plan.ticks_to_run,
                        step_plan.dropped_backlog > Duration::ZERO,
                    );

                    if let Some(report) = metrics.take_report(now) {
                        info!(
                            fps = report.fps,
                            tps = report.tps,
                            frame_time_ms = report.frame_time_ms,
                            worst_frame_ms = report.worst_frame_ms,
                            clamped_frames = report.clamped_frames,
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                scene.unload();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    held: ActionStates,
    pressed_edges: ActionStates,
    typed_keys: Vec<TypedKey>,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        let is_pressed = key_event.state == ElementState::Pressed;
        self.update_action_state_from_physical_key(
            key_event.physical_key,
            is_pressed,
            key_event.repeat,
        );
        if is_pressed {
            self.record_typed_key(key_event.physical_key, key_event.text.as_deref());
        }
    }

    fn update_action_state_from_physical_key(
        &mut self,
        key: PhysicalKey,
        is_pressed: bool,
        is_repeat: bool,
    ) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        let Some(action) = action_for_key(code) else {
            return;
        };

        if is_pressed && !is_repeat && !self.held.is_down(action) {
            self.pressed_edges.set(action, true);
        }
        self.held.set(action, is_pressed);

        if action == InputAction::Quit && is_pressed {
            self.mark_quit_requested();
        }
    }

    fn record_typed_key(&mut self, key: PhysicalKey, text: Option<&str>) {
        if self.typed_keys.len() >= MAX_TYPED_KEYS_PER_TICK {
            return;
        }
        match key {
            PhysicalKey::Code(KeyCode::Backspace) => self.typed_keys.push(TypedKey::Backspace),
            PhysicalKey::Code(KeyCode::Enter | KeyCode::NumpadEnter) => {
                self.typed_keys.push(TypedKey::Enter)
            }
            _ => {
                let Some(text) = text else {
                    return;
                };
                for ch in text.chars() {
                    if ch.is_control() {
                        continue;
                    }
                    if self.typed_keys.len() >= MAX_TYPED_KEYS_PER_TICK {
                        break;
                    }
                    self.typed_keys.push(TypedKey::Char(ch));
                }
            }
        }
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.quit_requested,
            self.held,
            self.pressed_edges,
            std::mem::take(&mut self.typed_keys),
            self.window_width,
            self.window_height,
        );
        self.pressed_edges.clear();
        snapshot
    }

    /// Forgets held keys, pending edges and typed text. Keys physically still down
    /// register again on their next press.
    fn clear(&mut self) {
        self.held.clear();
        self.pressed_edges.clear();
        self.typed_keys.clear();
    }

    fn release_held(&mut self) {
        self.held.clear();
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }
}

fn action_for_key(code: KeyCode) -> Option<InputAction> {
    match code {
        KeyCode::KeyW | KeyCode::ArrowUp => Some(InputAction::MoveUp),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(InputAction::MoveDown),
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(InputAction::MoveLeft),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(InputAction::MoveRight),
        KeyCode::KeyE => Some(InputAction::Interact),
        KeyCode::KeyF => Some(InputAction::Collect),
        KeyCode::Space | KeyCode::Enter | KeyCode::NumpadEnter | KeyCode::KeyZ => {
            Some(InputAction::Confirm)
        }
        KeyCode::Escape => Some(InputAction::Quit),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut InputCollector, code: KeyCode) {
        input.update_action_state_from_physical_key(PhysicalKey::Code(code), true, false);
    }

    fn release(input: &mut InputCollector, code: KeyCode) {
        input.update_action_state_from_physical_key(PhysicalKey::Code(code), false, false);
    }

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        let raw_frame_dt = Duration::from_millis(600);

        assert_eq!(
            clamp_frame_delta(raw_frame_dt, max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(48), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_keeps_partial_tick_in_accumulator() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(20), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 1);
        assert_eq!(result.remaining_accumulator, Duration::from_millis(4));
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(120), fixed_dt, 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn interact_press_is_edge_triggered_for_single_tick() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyE);

        let first = input.snapshot_for_tick();
        let second = input.snapshot_for_tick();

        assert!(first.was_pressed(InputAction::Interact));
        assert!(!second.was_pressed(InputAction::Interact));
        assert!(second.is_down(InputAction::Interact));
    }

    #[test]
    fn held_key_does_not_spam_press_edges() {
        let mut input = InputCollector::default();

        press(&mut input, KeyCode::KeyF);
        let first = input.snapshot_for_tick();
        press(&mut input, KeyCode::KeyF);
        let second = input.snapshot_for_tick();
        release(&mut input, KeyCode::KeyF);
        press(&mut input, KeyCode::KeyF);
        let third = input.snapshot_for_tick();

        assert!(first.was_pressed(InputAction::Collect));
        assert!(!second.was_pressed(InputAction::Collect));
        assert!(third.was_pressed(InputAction::Collect));
    }

    #[test]
    fn os_key_repeat_is_not_a_press() {
        let mut input = InputCollector::default();
        input.update_action_state_from_physical_key(
            PhysicalKey::Code(KeyCode::Space),
            true,
            true,
        );

        let snapshot = input.snapshot_for_tick();
        assert!(!snapshot.was_pressed(InputAction::Confirm));
        assert!(snapshot.is_down(InputAction::Confirm));
    }

    #[test]
    fn wasd_and_arrow_keys_map_to_actions() {
        let mut input = InputCollector::default();

        press(&mut input, KeyCode::KeyW);
        press(&mut input, KeyCode::ArrowLeft);

        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.is_down(InputAction::MoveUp));
        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(!snapshot.is_down(InputAction::MoveRight));
    }

    #[test]
    fn confirm_has_three_bindings() {
        for code in [KeyCode::Space, KeyCode::Enter, KeyCode::KeyZ] {
            assert_eq!(action_for_key(code), Some(InputAction::Confirm));
        }
    }

    #[test]
    fn key_release_clears_action_state() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyD);
        release(&mut input, KeyCode::KeyD);

        let snapshot = input.snapshot_for_tick();
        assert!(!snapshot.is_down(InputAction::MoveRight));
    }

    #[test]
    fn escape_requests_quit() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::Escape);

        assert!(input.quit_requested);
        assert!(input.snapshot_for_tick().quit_requested());
    }

    #[test]
    fn typed_text_skips_control_characters() {
        let mut input = InputCollector::default();
        input.record_typed_key(PhysicalKey::Code(KeyCode::KeyH), Some("h"));
        input.record_typed_key(PhysicalKey::Code(KeyCode::Tab), Some("\t"));
        input.record_typed_key(PhysicalKey::Code(KeyCode::Space), Some(" "));
        input.record_typed_key(PhysicalKey::Code(KeyCode::Backspace), Some("\u{8}"));
        input.record_typed_key(PhysicalKey::Code(KeyCode::Enter), Some("\r"));

        let snapshot = input.snapshot_for_tick();
        assert_eq!(
            snapshot.typed_keys(),
            &[
                TypedKey::Char('h'),
                TypedKey::Char(' '),
                TypedKey::Backspace,
                TypedKey::Enter,
            ]
        );
    }

    #[test]
    fn typed_keys_are_drained_per_tick() {
        let mut input = InputCollector::default();
        input.record_typed_key(PhysicalKey::Code(KeyCode::KeyA), Some("a"));

        assert_eq!(input.snapshot_for_tick().typed_keys().len(), 1);
        assert!(input.snapshot_for_tick().typed_keys().is_empty());
    }

    #[test]
    fn clear_drops_held_edges_and_text() {
        let mut input = InputCollector::new(800, 600);
        press(&mut input, KeyCode::KeyW);
        press(&mut input, KeyCode::KeyE);
        input.record_typed_key(PhysicalKey::Code(KeyCode::KeyE), Some("e"));

        input.clear();
        let snapshot = input.snapshot_for_tick();

        assert!(!snapshot.is_down(InputAction::MoveUp));
        assert!(!snapshot.was_pressed(InputAction::Interact));
        assert!(snapshot.typed_keys().is_empty());
        assert_eq!(snapshot.window_size(), (800, 600));
    }

    #[test]
    fn key_pressed_again_after_clear_fires_new_edge() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyE);
        input.clear();
        press(&mut input, KeyCode::KeyE);

        assert!(input.snapshot_for_tick().was_pressed(InputAction::Interact));
    }
}
