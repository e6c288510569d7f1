//! Session frame cache
//!
//! Structure: HashMap<i32, DecodedFrame> behind a single mutex.
//!
//! The cache is append-only for the life of a session: entries accumulate as
//! loads complete and are never individually freed (bounded by the total
//! frame count, which is known up front). Insert is idempotent so duplicate
//! fetches cannot corrupt the loaded count.
//!
//! Mutated only by loader completions, read by the renderer; both sides go
//! through the mutex, so interleaving is safe without any further
//! coordination.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use log::debug;

use crate::core::frame::DecodedFrame;

/// Cache statistics for monitoring renderer hit rate
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStats {
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits() + self.misses();
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }
}

/// Append-only frame cache shared between loader and renderer.
#[derive(Debug, Default)]
pub struct FrameCache {
    frames: Mutex<HashMap<i32, DecodedFrame>>,
    /// Monotonic count of successful inserts
    loaded: AtomicUsize,
    /// Bumped on every insert; lets the UI skip repaints when nothing landed
    revision: AtomicU64,
    dirty: AtomicBool,
    stats: CacheStats,
}

impl FrameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check membership without touching stats.
    pub fn has(&self, index: i32) -> bool {
        self.frames
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&index)
    }

    /// Get a frame. Cheap: the pixel buffer is shared, not copied.
    pub fn get(&self, index: i32) -> Option<DecodedFrame> {
        let result = self
            .frames
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&index)
            .cloned();
        if result.is_some() {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    /// Insert a decoded frame.
    ///
    /// Idempotent: inserting an already-present index is a no-op and does not
    /// bump the loaded count. Returns true if the frame was actually stored.
    pub fn insert(&self, index: i32, frame: DecodedFrame) -> bool {
        let mut frames = self.frames.lock().unwrap_or_else(|e| e.into_inner());
        if frames.contains_key(&index) {
            debug!("Frame {} already cached, ignoring duplicate insert", index);
            return false;
        }
        frames.insert(index, frame);
        drop(frames);

        self.loaded.fetch_add(1, Ordering::Relaxed);
        self.revision.fetch_add(1, Ordering::Relaxed);
        self.dirty.store(true, Ordering::Relaxed);
        true
    }

    /// Number of frames loaded so far. Monotonic within a session.
    pub fn loaded_count(&self) -> usize {
        self.loaded.load(Ordering::Relaxed)
    }

    /// Insert counter, for change detection across polls.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Relaxed)
    }

    /// One-shot dirty flag: true if anything was inserted since the last
    /// call. Drives repaint requests.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.frames
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}
