//! Scroll-to-frame mapping
//!
//! Consumes the smoothed scroll progress (0..1) and maps it linearly onto a
//! configured frame sub-range. Emission is deduplicated on the floored index
//! so sub-integer movement never causes redundant repaints, and optionally
//! rate-limited to a maximum frequency independent of how often the input
//! arrives (precision traded for paint cost).

use std::time::{Duration, Instant};

/// Maps smoothed progress onto `[range_start, range_end]` (inclusive).
#[derive(Debug, Clone)]
pub struct ScrollFrameMapper {
    range_start: i32,
    range_end: i32,
    /// Minimum interval between emissions; None = emit on every change
    min_interval: Option<Duration>,
    last_emit_time: Option<Instant>,
    last_index: Option<i32>,
}

impl ScrollFrameMapper {
    /// Default emission cap: 30 Hz is plenty for scroll scrubbing.
    pub const DEFAULT_MAX_RATE_HZ: f32 = 30.0;

    pub fn new(range_start: i32, range_end: i32) -> Self {
        let (range_start, range_end) = if range_end < range_start {
            (range_end, range_start)
        } else {
            (range_start, range_end)
        };
        Self {
            range_start,
            range_end,
            min_interval: Some(Duration::from_secs_f32(1.0 / Self::DEFAULT_MAX_RATE_HZ)),
            last_emit_time: None,
            last_index: None,
        }
    }

    /// Cap emissions at `hz`. Zero or negative disables throttling.
    pub fn with_max_rate(mut self, hz: f32) -> Self {
        self.min_interval = if hz > 0.0 {
            Some(Duration::from_secs_f32(1.0 / hz))
        } else {
            None
        };
        self
    }

    pub fn range(&self) -> (i32, i32) {
        (self.range_start, self.range_end)
    }

    /// Clamp both ends into `[min, max]`. Called once the catalog resolves
    /// and the real frame count is known.
    pub fn clamp_range(&mut self, min: i32, max: i32) {
        self.range_start = self.range_start.clamp(min, max);
        self.range_end = self.range_end.clamp(min, max);
    }

    /// Pure mapping: progress 0..1 -> floored frame index in range.
    pub fn map(&self, progress: f32) -> i32 {
        let p = progress.clamp(0.0, 1.0);
        let span = (self.range_end - self.range_start) as f32;
        self.range_start + (span * p).floor() as i32
    }

    /// Feed a progress sample. Returns the new frame index only when the
    /// floored index changed since the last emission and the throttle window
    /// has passed.
    pub fn update(&mut self, progress: f32, now: Instant) -> Option<i32> {
        if let (Some(interval), Some(last)) = (self.min_interval, self.last_emit_time) {
            if now.duration_since(last) < interval {
                return None;
            }
        }

        let index = self.map(progress);
        if self.last_index == Some(index) {
            return None;
        }

        self.last_index = Some(index);
        self.last_emit_time = Some(now);
        Some(index)
    }

    /// Last emitted index, if any.
    pub fn last_index(&self) -> Option<i32> {
        self.last_index
    }
}
