//! Progressive background loader - priority ranges, bounded batches
//!
//! **Why**: A sequence can hold ~2000 frames; decoding them all at once would
//! saturate every core and starve the UI. The loader is the admission-control
//! mechanism: it walks a prioritized list of index ranges (frames needed soon
//! first) and inside each range issues decodes in fixed-size batches,
//! awaiting full batch settlement before issuing the next.
//!
//! **Used by**: App startup (after the catalog resolves)
//!
//! # Ordering guarantees
//!
//! - Within a range, issue order is ascending frame index.
//! - Batch N+1 is never issued before batch N fully settles (ok or skip),
//!   bounding peak outstanding decodes to the batch size.
//! - No range B decode starts before range A is exhausted.
//! - A given index is issued at most once per session (checked against both
//!   the cache and the local issued set).
//!
//! # Failure policy
//!
//! A failed decode settles as a skip: logged at debug, no retry, the frame
//! simply stays absent and the renderer holds the previous paint. On
//! teardown the liveness flag is cleared so in-flight completions become
//! no-ops instead of touching the cache.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use log::{debug, info, trace};

use crate::core::cache::FrameCache;
use crate::core::catalog::FrameCatalog;
use crate::core::frame::{DecodedFrame, FrameError};
use crate::core::workers::Workers;

/// Default concurrent decodes per batch. Observed useful range is 10-30.
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Fetches one frame by path. The seam that lets tests run the loader
/// without touching the filesystem.
pub trait FrameFetcher: Send + Sync + 'static {
    fn fetch(&self, path: &Path) -> Result<DecodedFrame, FrameError>;
}

/// Production fetcher: decode from disk via the image crate.
pub struct DiskFetcher;

impl FrameFetcher for DiskFetcher {
    fn fetch(&self, path: &Path) -> Result<DecodedFrame, FrameError> {
        DecodedFrame::load(path)
    }
}

/// Half-open index range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadRange {
    pub start: i32,
    pub end: i32,
}

impl LoadRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        (self.end - self.start).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Priority-ordered load schedule. Earlier ranges load first.
#[derive(Debug, Clone)]
pub struct LoadPlan {
    pub ranges: Vec<LoadRange>,
    pub batch_size: usize,
}

impl LoadPlan {
    pub fn new(ranges: Vec<LoadRange>, batch_size: usize) -> Self {
        Self {
            ranges,
            batch_size: batch_size.max(1),
        }
    }

    /// Whole sequence in one range.
    pub fn full(total: i32, batch_size: usize) -> Self {
        Self::new(vec![LoadRange::new(0, total)], batch_size)
    }

    /// Staged priority schedule: intro frames first (they play immediately),
    /// then the scroll body in widening slices towards the tail.
    pub fn staged(intro_end: i32, total: i32, batch_size: usize) -> Self {
        let mut ranges = vec![LoadRange::new(0, intro_end + 1)];
        let mut cursor = intro_end + 1;
        for stop in [400, 800, 1200] {
            if cursor < stop && stop < total {
                ranges.push(LoadRange::new(cursor, stop));
                cursor = stop;
            }
        }
        if cursor < total {
            ranges.push(LoadRange::new(cursor, total));
        }
        Self::new(ranges, batch_size)
    }

    /// Clamp every range into `[0, total)` and drop empties. Priority order
    /// is preserved.
    fn clamped(&self, total: i32) -> Vec<LoadRange> {
        self.ranges
            .iter()
            .map(|r| LoadRange::new(r.start.clamp(0, total), r.end.clamp(0, total)))
            .filter(|r| !r.is_empty())
            .collect()
    }
}

/// Background loader. Owns a scheduler thread that feeds the worker pool.
pub struct ProgressiveLoader {
    alive: Arc<AtomicBool>,
    scheduler: Option<thread::JoinHandle<()>>,
}

impl ProgressiveLoader {
    /// Start loading per the plan. Returns immediately; decode results land
    /// in the cache as they settle.
    pub fn start(
        workers: Arc<Workers>,
        catalog: Arc<FrameCatalog>,
        cache: Arc<FrameCache>,
        fetcher: Arc<dyn FrameFetcher>,
        plan: LoadPlan,
    ) -> Self {
        let alive = Arc::new(AtomicBool::new(true));
        let alive_for_thread = Arc::clone(&alive);

        let scheduler = thread::Builder::new()
            .name("scrolla-preload".into())
            .spawn(move || {
                run_schedule(workers, catalog, cache, fetcher, plan, alive_for_thread);
            })
            .ok();

        Self { alive, scheduler }
    }

    /// Clear the liveness flag: in-flight completions become no-ops and no
    /// further batches are issued. Idempotent.
    pub fn stop(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}

impl Drop for ProgressiveLoader {
    fn drop(&mut self) {
        self.stop();
        if let Some(handle) = self.scheduler.take() {
            // Scheduler exits after the current batch settles or times out
            let _ = handle.join();
        }
    }
}

fn run_schedule(
    workers: Arc<Workers>,
    catalog: Arc<FrameCatalog>,
    cache: Arc<FrameCache>,
    fetcher: Arc<dyn FrameFetcher>,
    plan: LoadPlan,
    alive: Arc<AtomicBool>,
) {
    let total = catalog.len() as i32;
    let ranges = plan.clamped(total);
    if ranges.is_empty() {
        trace!("Preload schedule empty, nothing to do");
        return;
    }

    info!(
        "Preload starting: {} ranges, batch size {}, {} frames total",
        ranges.len(),
        plan.batch_size,
        total
    );

    // At-most-once per session, independent of cache membership
    let mut issued: HashSet<i32> = HashSet::new();

    'ranges: for range in &ranges {
        let pending: Vec<i32> = (range.start..range.end)
            .filter(|idx| !issued.contains(idx) && !cache.has(*idx))
            .collect();

        let mut loaded = 0usize;
        let mut skipped = 0usize;

        for batch in pending.chunks(plan.batch_size) {
            if !alive.load(Ordering::SeqCst) {
                break 'ranges;
            }

            let (tx, rx) = crossbeam_channel::bounded::<bool>(batch.len());
            let mut submitted = 0usize;

            for &idx in batch {
                issued.insert(idx);
                let Some(path) = catalog.resolve_path(idx) else {
                    continue;
                };

                let tx = tx.clone();
                let cache = Arc::clone(&cache);
                let fetcher = Arc::clone(&fetcher);
                let alive = Arc::clone(&alive);
                workers.execute(move || {
                    let mut inserted = false;
                    if alive.load(Ordering::SeqCst) {
                        match fetcher.fetch(&path) {
                            Ok(frame) => {
                                // Re-check: teardown may have happened mid-decode
                                if alive.load(Ordering::SeqCst) {
                                    inserted = cache.insert(idx, frame);
                                }
                            }
                            Err(e) => {
                                debug!("Frame {} skipped: {}", idx, e);
                            }
                        }
                    }
                    let _ = tx.send(inserted);
                });
                submitted += 1;
            }
            drop(tx);

            // Await full batch settlement before issuing the next batch
            let mut settled = 0usize;
            while settled < submitted {
                match rx.recv_timeout(Duration::from_millis(200)) {
                    Ok(inserted) => {
                        settled += 1;
                        if inserted {
                            loaded += 1;
                        } else {
                            skipped += 1;
                        }
                    }
                    Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                        if !alive.load(Ordering::SeqCst) {
                            break 'ranges;
                        }
                    }
                    Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
                }
            }
        }

        debug!(
            "Preload range [{}..{}) settled: {} loaded, {} skipped",
            range.start, range.end, loaded, skipped
        );
    }

    info!(
        "Preload finished: {} of {} frames cached",
        cache.loaded_count(),
        total
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    /// Fetcher that records issue order and tracks peak concurrency.
    struct ProbeFetcher {
        order: Mutex<Vec<i32>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        fail_on: Vec<i32>,
    }

    impl ProbeFetcher {
        fn new(fail_on: Vec<i32>) -> Self {
            Self {
                order: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                fail_on,
            }
        }
    }

    /// Filenames encode the index so the probe can recover it from the path.
    fn index_of(path: &Path) -> i32 {
        path.file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse().ok())
            .unwrap()
    }

    impl FrameFetcher for ProbeFetcher {
        fn fetch(&self, path: &Path) -> Result<DecodedFrame, FrameError> {
            let idx = index_of(path);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.order.lock().unwrap().push(idx);

            thread::sleep(Duration::from_millis(5));
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail_on.contains(&idx) {
                Err(FrameError::Image("probe failure".into()))
            } else {
                DecodedFrame::from_rgba8(vec![0u8; 4], 1, 1)
            }
        }
    }

    fn catalog_of(n: usize) -> Arc<FrameCatalog> {
        Arc::new(FrameCatalog::from_filenames(
            PathBuf::from("/probe"),
            (0..n).map(|i| format!("{}.jpg", i)).collect(),
        ))
    }

    fn wait_until(deadline_ms: u64, mut done: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_millis(deadline_ms);
        while !done() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
    }

    /// Test: batch size 2 over [0,5) never exceeds 2 in flight, loads all 5
    #[test]
    fn test_batch_bound() {
        let workers = Arc::new(Workers::new(4));
        let catalog = catalog_of(5);
        let cache = Arc::new(FrameCache::new());
        let fetcher = Arc::new(ProbeFetcher::new(vec![]));

        let plan = LoadPlan::new(vec![LoadRange::new(0, 5)], 2);
        let _loader = ProgressiveLoader::start(
            Arc::clone(&workers),
            catalog,
            Arc::clone(&cache),
            Arc::clone(&fetcher) as Arc<dyn FrameFetcher>,
            plan,
        );

        wait_until(3000, || cache.loaded_count() == 5);
        assert_eq!(cache.loaded_count(), 5);
        assert!(fetcher.peak.load(Ordering::SeqCst) <= 2);

        // Batched issue order: {0,1} then {2,3} then {4}
        let order = fetcher.order.lock().unwrap().clone();
        assert_eq!(order.len(), 5);
        assert!(order[0..2].contains(&0) && order[0..2].contains(&1));
        assert!(order[2..4].contains(&2) && order[2..4].contains(&3));
        assert_eq!(order[4], 4);
    }

    /// Test: ranges load in strict priority order
    #[test]
    fn test_range_priority() {
        let workers = Arc::new(Workers::new(4));
        let catalog = catalog_of(8);
        let cache = Arc::new(FrameCache::new());
        let fetcher = Arc::new(ProbeFetcher::new(vec![]));

        // Tail range prioritized over the head
        let plan = LoadPlan::new(vec![LoadRange::new(4, 8), LoadRange::new(0, 4)], 4);
        let _loader = ProgressiveLoader::start(
            workers,
            catalog,
            Arc::clone(&cache),
            Arc::clone(&fetcher) as Arc<dyn FrameFetcher>,
            plan,
        );

        wait_until(3000, || cache.loaded_count() == 8);
        let order = fetcher.order.lock().unwrap().clone();
        assert_eq!(order.len(), 8);
        assert!(order[0..4].iter().all(|i| *i >= 4));
        assert!(order[4..8].iter().all(|i| *i < 4));
    }

    /// Test: a failed fetch settles as a skip without blocking the batch
    #[test]
    fn test_failed_fetch_skips() {
        let workers = Arc::new(Workers::new(2));
        let catalog = catalog_of(4);
        let cache = Arc::new(FrameCache::new());
        let fetcher = Arc::new(ProbeFetcher::new(vec![1]));

        let plan = LoadPlan::new(vec![LoadRange::new(0, 4)], 2);
        let _loader = ProgressiveLoader::start(
            workers,
            catalog,
            Arc::clone(&cache),
            Arc::clone(&fetcher) as Arc<dyn FrameFetcher>,
            plan,
        );

        wait_until(3000, || cache.loaded_count() == 3);
        assert_eq!(cache.loaded_count(), 3);
        assert!(!cache.has(1));
        assert!(cache.has(0) && cache.has(2) && cache.has(3));
    }

    /// Test: overlapping ranges fetch each index at most once
    #[test]
    fn test_at_most_once() {
        let workers = Arc::new(Workers::new(2));
        let catalog = catalog_of(4);
        let cache = Arc::new(FrameCache::new());
        let fetcher = Arc::new(ProbeFetcher::new(vec![]));

        let plan = LoadPlan::new(vec![LoadRange::new(0, 4), LoadRange::new(2, 4)], 4);
        let _loader = ProgressiveLoader::start(
            workers,
            catalog,
            Arc::clone(&cache),
            Arc::clone(&fetcher) as Arc<dyn FrameFetcher>,
            plan,
        );

        wait_until(3000, || cache.loaded_count() == 4);
        assert_eq!(fetcher.order.lock().unwrap().len(), 4);
    }

    /// Test: ranges clamp against the catalog length
    #[test]
    fn test_plan_clamps_to_total() {
        let plan = LoadPlan::new(vec![LoadRange::new(-5, 3), LoadRange::new(2, 99)], 10);
        let clamped = plan.clamped(4);
        assert_eq!(clamped, vec![LoadRange::new(0, 3), LoadRange::new(2, 4)]);

        assert_eq!(LoadPlan::full(10, 3).clamped(10), vec![LoadRange::new(0, 10)]);
    }

    /// Test: staged plan covers [0, total) exactly once with intro first
    #[test]
    fn test_staged_plan_coverage() {
        let plan = LoadPlan::staged(187, 1999, DEFAULT_BATCH_SIZE);
        assert_eq!(plan.ranges[0], LoadRange::new(0, 188));
        let mut cursor = 0;
        for range in &plan.ranges {
            assert_eq!(range.start, cursor);
            cursor = range.end;
        }
        assert_eq!(cursor, 1999);

        // Short sequences degenerate gracefully
        let short = LoadPlan::staged(187, 100, DEFAULT_BATCH_SIZE);
        assert_eq!(short.clamped(100), vec![LoadRange::new(0, 100)]);
    }
}
