//! Background thread pool for frame decoding
//!
//! Work-stealing deques: jobs land in a global injector, idle workers steal
//! from each other, so a burst of decode jobs spreads across cores without a
//! shared lock. The loader bounds how many jobs are outstanding, the pool
//! just drains them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam::deque::{Injector, Worker};
use log::trace;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Decode worker pool.
///
/// Recommended size: `num_cpus::get() * 3 / 4` (leave headroom for the UI
/// thread).
pub struct Workers {
    injector: Arc<Injector<Job>>,
    handles: Vec<thread::JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl Workers {
    pub fn new(num_threads: usize) -> Self {
        let num_threads = num_threads.max(1);
        let injector: Arc<Injector<Job>> = Arc::new(Injector::new());
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut locals: Vec<Worker<Job>> = Vec::new();
        let mut stealers = Vec::new();
        for _ in 0..num_threads {
            let worker: Worker<Job> = Worker::new_fifo();
            stealers.push(worker.stealer());
            locals.push(worker);
        }

        let mut handles = Vec::new();
        for (worker_id, worker) in locals.into_iter().enumerate() {
            let injector = Arc::clone(&injector);
            let shutdown = Arc::clone(&shutdown);
            let stealers = stealers.clone();

            let handle = thread::Builder::new()
                .name(format!("scrolla-worker-{}", worker_id))
                .spawn(move || {
                    trace!("Worker {} started", worker_id);
                    loop {
                        // Own queue first, then the injector, then steal
                        if let Some(job) = worker.pop() {
                            job();
                            continue;
                        }
                        if let Some(job) = injector.steal().success() {
                            job();
                            continue;
                        }
                        if let Some(job) = stealers.iter().find_map(|s| s.steal().success()) {
                            job();
                            continue;
                        }

                        if shutdown.load(Ordering::Relaxed) {
                            break;
                        }

                        // No work - short sleep instead of spinning
                        thread::sleep(std::time::Duration::from_millis(1));
                    }
                    trace!("Worker {} stopped", worker_id);
                })
                .expect("Failed to spawn worker thread");

            handles.push(handle);
        }

        trace!(
            "Workers initialized: {} threads (work-stealing)",
            num_threads
        );

        Self {
            injector,
            handles,
            shutdown,
        }
    }

    /// Enqueue a job. Runs asynchronously on some worker thread.
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.injector.push(Box::new(f));
    }

    pub fn thread_count(&self) -> usize {
        self.handles.len()
    }
}

impl Drop for Workers {
    fn drop(&mut self) {
        use std::time::{Duration, Instant};

        let num_threads = self.handles.len();
        trace!("Workers shutting down ({} threads)...", num_threads);
        self.shutdown.store(true, Ordering::SeqCst);

        // Wait with timeout; anything still running dies with the process
        let deadline = Instant::now() + Duration::from_millis(500);
        let handles = std::mem::take(&mut self.handles);
        for handle in handles {
            while !handle.is_finished() {
                if Instant::now() >= deadline {
                    trace!("Shutdown timeout reached, exiting anyway");
                    return;
                }
                thread::sleep(Duration::from_millis(1));
            }
            let _ = handle.join();
        }

        trace!("All {} workers stopped gracefully", num_threads);
    }
}
