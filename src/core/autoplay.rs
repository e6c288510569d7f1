//! Intro auto-play driver
//!
//! Before scroll input is honored, a fixed frame range plays at a constant
//! rate: `0, 1, ..., E`, one step per elapsed frame duration. On reaching E
//! the driver parks in `Done` for the rest of the session and reports
//! completion exactly once, which is the signal that unblocks scroll control
//! and the surrounding intro UI.
//!
//! # Timing model
//!
//! FPS-based, not wall-clock accumulating: each tick advances at most one
//! frame when a frame duration has elapsed. A long stall therefore never
//! skips frames; the counter sequence is always gapless.

use std::time::Instant;

use log::{info, trace};

/// Driver lifecycle. Transitions only forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoPlayState {
    Idle,
    Playing,
    Done,
}

/// Plays frames `0..=end` at a fixed rate, then parks.
#[derive(Debug, Clone)]
pub struct AutoPlayDriver {
    state: AutoPlayState,
    fps: f32,
    /// Last intro frame E (inclusive)
    end: i32,
    frame: i32,
    last_frame_time: Option<Instant>,
    completed: bool,
}

impl AutoPlayDriver {
    pub fn new(end: i32, fps: f32) -> Self {
        Self {
            state: AutoPlayState::Idle,
            fps: fps.clamp(1.0, 240.0),
            end: end.max(0),
            frame: 0,
            last_frame_time: None,
            completed: false,
        }
    }

    /// Begin playing at frame 0. Returns the frame to display.
    ///
    /// A zero-length intro (`end == 0`) completes immediately.
    pub fn start(&mut self, now: Instant) -> i32 {
        if self.state != AutoPlayState::Idle {
            return self.frame;
        }
        self.frame = 0;
        if self.end == 0 {
            self.finish();
        } else {
            self.state = AutoPlayState::Playing;
            self.last_frame_time = Some(now);
            info!("Auto-play started: frames 0..={} at {} fps", self.end, self.fps);
        }
        self.frame
    }

    /// Advance the counter if a frame duration has elapsed.
    ///
    /// Returns the new frame on change, None otherwise. Never returns a
    /// value greater than E and never skips a step.
    pub fn tick(&mut self, now: Instant) -> Option<i32> {
        if self.state != AutoPlayState::Playing {
            return None;
        }

        let Some(last) = self.last_frame_time else {
            self.last_frame_time = Some(now);
            return None;
        };

        let frame_duration = 1.0 / self.fps;
        if now.duration_since(last).as_secs_f32() < frame_duration {
            return None;
        }

        self.frame += 1;
        self.last_frame_time = Some(now);

        if self.frame >= self.end {
            self.frame = self.end;
            self.finish();
        } else {
            trace!("Auto-play frame {}", self.frame);
        }
        Some(self.frame)
    }

    fn finish(&mut self) {
        self.state = AutoPlayState::Done;
        self.last_frame_time = None;
        self.completed = true;
        info!("Auto-play finished at frame {}", self.frame);
    }

    /// One-shot completion flag: true exactly once, when E was reached.
    pub fn take_completed(&mut self) -> bool {
        std::mem::take(&mut self.completed)
    }

    pub fn state(&self) -> AutoPlayState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == AutoPlayState::Done
    }

    pub fn frame(&self) -> i32 {
        self.frame
    }

    pub fn end(&self) -> i32 {
        self.end
    }
}
