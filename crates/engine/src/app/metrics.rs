use std::time::{Duration, Instant};

/// Loop rates over one reporting window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LoopReport {
    pub(crate) fps: f32,
    pub(crate) tps: f32,
    pub(crate) frame_time_ms: f32,
    pub(crate) worst_frame_ms: f32,
    /// Frames whose simulation backlog was dropped.
    pub(crate) clamped_frames: u32,
}

/// Counts frames and ticks until the window length has passed.
#[derive(Debug)]
pub(crate) struct LoopMetrics {
    window: Duration,
    opened_at: Instant,
    frames: u32,
    ticks: u32,
    clamped_frames: u32,
    total_frame_time: Duration,
    worst_frame_time: Duration,
}

impl LoopMetrics {
    pub(crate) fn new(window: Duration, opened_at: Instant) -> Self {
        Self {
            window,
            opened_at,
            frames: 0,
            ticks: 0,
            clamped_frames: 0,
            total_frame_time: Duration::ZERO,
            worst_frame_time: Duration::ZERO,
        }
    }

    pub(crate) fn record_frame(&mut self, frame_time: Duration, ticks: u32, clamped: bool) {
        self.frames = self.frames.saturating_add(1);
        self.ticks = self.ticks.saturating_add(ticks);
        if clamped {
            self.clamped_frames = self.clamped_frames.saturating_add(1);
        }
        self.total_frame_time = self.total_frame_time.saturating_add(frame_time);
        self.worst_frame_time = self.worst_frame_time.max(frame_time);
    }

    /// Closes the window and starts a fresh one once it has run its length.
    pub(crate) fn take_report(&mut self, now: Instant) -> Option<LoopReport> {
        let elapsed = now.saturating_duration_since(self.opened_at);
        if elapsed < self.window {
            return None;
        }

        let seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = match self.frames {
            0 => 0.0,
            frames => self.total_frame_time.as_secs_f32() * 1000.0 / frames as f32,
        };
        let report = LoopReport {
            fps: self.frames as f32 / seconds,
            tps: self.ticks as f32 / seconds,
            frame_time_ms,
            worst_frame_ms: self.worst_frame_time.as_secs_f32() * 1000.0,
            clamped_frames: self.clamped_frames,
        };
        *self = Self::new(self.window, now);
        Some(report)
    }
}
