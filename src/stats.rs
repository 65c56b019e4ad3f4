//! Rolling frame timing statistics

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Samples kept per history (one minute at 60 FPS)
pub const HISTORY_LEN: usize = 60 * 60;

/// How often the instantaneous FPS is sampled
pub const FPS_SAMPLE_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Default)]
pub struct FrameStats {
    frame_times: VecDeque<f32>,
    fps_history: VecDeque<f32>,
    last_sample: Option<Instant>,
    current_fps: Option<f32>,
    frame_count: u64,
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            frame_times: VecDeque::with_capacity(HISTORY_LEN),
            fps_history: VecDeque::with_capacity(HISTORY_LEN),
            ..Default::default()
        }
    }

    /// Record a rendered frame that took `delta` seconds, finishing at `now`
    pub fn record(&mut self, delta: f32, now: Instant) {
        self.frame_count += 1;
        push_bounded(&mut self.frame_times, delta * 1000.0);

        let last_sample = *self.last_sample.get_or_insert(now);
        if now.duration_since(last_sample) >= FPS_SAMPLE_INTERVAL {
            if delta > 0.0 {
                let fps = 1.0 / delta;
                self.current_fps = Some(fps);
                push_bounded(&mut self.fps_history, fps);
            }
            self.last_sample = Some(now);
        }
    }

    /// Most recent FPS sample, if one has been taken yet
    pub fn current_fps(&self) -> Option<f32> {
        self.current_fps
    }

    /// Mean of the FPS history
    pub fn average_fps(&self) -> Option<f32> {
        mean(&self.fps_history)
    }

    /// Duration of the last frame in milliseconds
    pub fn last_frame_time_ms(&self) -> Option<f32> {
        self.frame_times.back().copied()
    }

    pub fn average_frame_time_ms(&self) -> Option<f32> {
        mean(&self.frame_times)
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn frame_time_history(&self) -> &VecDeque<f32> {
        &self.frame_times
    }

    pub fn fps_history(&self) -> &VecDeque<f32> {
        &self.fps_history
    }

    /// Forget everything; the next frame starts a new sampling window
    pub fn reset(&mut self) {
        self.frame_times.clear();
        self.fps_history.clear();
        self.last_sample = None;
        self.current_fps = None;
        self.frame_count = 0;
    }
}

fn push_bounded(history: &mut VecDeque<f32>, value: f32) {
    if history.len() == HISTORY_LEN {
        history.pop_front();
    }
    history.push_back(value);
}

fn mean(values: &VecDeque<f32>) -> Option<f32> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f32>() / values.len() as f32)
    }
}
