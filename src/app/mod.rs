//! Application state and construction.
//!
//! `ScrollaApp` owns the engine pieces (catalog, cache, workers, loader,
//! player) plus the UI state (canvas, HUD, spring, scroll accumulator).
//! The update loop lives in `run.rs`, event processing in `events.rs`.

mod events;
mod run;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::Receiver;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::config::PathConfig;
use crate::core::autoplay::AutoPlayDriver;
use crate::core::cache::FrameCache;
use crate::core::catalog::{CatalogSource, FrameCatalog};
use crate::core::event_bus::EventBus;
use crate::core::loader::{DEFAULT_BATCH_SIZE, DiskFetcher, LoadPlan, ProgressiveLoader};
use crate::core::mapper::ScrollFrameMapper;
use crate::core::player::SequencePlayer;
use crate::core::spring::ScrollSpring;
use crate::core::stations::StationSet;
use crate::core::workers::Workers;
use crate::widgets::canvas::CanvasRenderer;
use crate::widgets::status::StatusHud;

/// Persisted user settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub show_hud: bool,
    pub spring_stiffness: f32,
    pub spring_damping: f32,
    pub spring_mass: f32,
    /// Scroll travel for the full sequence, in viewport heights
    pub page_screens: f32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            show_hud: true,
            spring_stiffness: 30.0,
            spring_damping: 30.0,
            spring_mass: 1.0,
            page_screens: 8.0,
        }
    }
}

/// Accumulates wheel deltas into normalized progress over a virtual page.
///
/// Wheel down (negative delta) advances through the sequence; the offset is
/// clamped to the page so progress stays in [0, 1].
#[derive(Debug, Default)]
pub struct ScrollAccumulator {
    offset_px: f32,
}

impl ScrollAccumulator {
    pub fn apply(&mut self, delta: f32, page_len: f32) -> f32 {
        let page_len = page_len.max(1.0);
        self.offset_px = (self.offset_px - delta).clamp(0.0, page_len);
        self.offset_px / page_len
    }
}

/// Main application state.
pub struct ScrollaApp {
    pub settings: AppSettings,
    pub path_config: PathConfig,

    // Engine
    pub catalog: Arc<FrameCatalog>,
    pub cache: Arc<FrameCache>,
    pub workers: Arc<Workers>,
    pub loader: Option<ProgressiveLoader>,
    pub player: SequencePlayer,
    pub stations: StationSet,
    pub event_bus: EventBus,

    // One-shot catalog resolution
    catalog_rx: Option<Receiver<FrameCatalog>>,

    // Loader tuning carried from CLI
    batch_size: usize,

    // Scroll input
    pub spring: ScrollSpring,
    scroll: ScrollAccumulator,

    // UI
    pub canvas: CanvasRenderer,
    pub hud: StatusHud,
    pub is_fullscreen: bool,

    // Bookkeeping
    last_update: Option<Instant>,
    last_stats_log: Instant,
    pub current_station: Option<String>,
}

impl ScrollaApp {
    pub fn new(cc: &eframe::CreationContext<'_>, args: &Args, path_config: PathConfig) -> Self {
        // Restore persisted settings, fall back to defaults
        let mut settings: AppSettings = cc
            .storage
            .and_then(|storage| storage.get_string(eframe::APP_KEY))
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_else(|| {
                info!("No persisted settings found, using defaults");
                AppSettings::default()
            });
        if args.page_screens > 0.0 {
            settings.page_screens = args.page_screens;
        }

        let worker_count = args
            .workers
            .unwrap_or_else(|| (num_cpus::get() * 3 / 4).max(1));
        let workers = Arc::new(Workers::new(worker_count));
        info!("Worker pool: {} threads", worker_count);

        let stations = match &args.stations {
            Some(path) => StationSet::load(path).unwrap_or_else(|e| {
                warn!("Failed to load stations from {}: {}", path.display(), e);
                StationSet::default_set()
            }),
            None => StationSet::default_set(),
        };

        let event_bus = EventBus::new();

        let intro_end = if args.no_intro { 0 } else { args.intro_end.max(0) };
        let autoplay = AutoPlayDriver::new(intro_end, args.fps);

        // Scroll range defaults to (intro end + 1, last frame); both ends are
        // clamped against the catalog once it resolves.
        let scroll_start = args.scroll_start.unwrap_or(intro_end + 1);
        let scroll_end = args.scroll_end.unwrap_or(i32::MAX);
        let mapper = ScrollFrameMapper::new(scroll_start, scroll_end).with_max_rate(args.max_rate);

        let player = SequencePlayer::new(autoplay, mapper, event_bus.emitter());

        // Kick off the one-shot catalog resolution
        let source = Self::catalog_source(args);
        let catalog_rx = match source {
            Some(source) => {
                info!("Resolving catalog from {}", source);
                Some(FrameCatalog::load_async(source))
            }
            None => {
                warn!("No sequence source given; drop a frame directory onto the window");
                None
            }
        };

        let spring = ScrollSpring::new(
            settings.spring_stiffness,
            settings.spring_damping,
            settings.spring_mass,
        );

        if args.fullscreen {
            cc.egui_ctx
                .send_viewport_cmd(eframe::egui::ViewportCommand::Fullscreen(true));
        }

        Self {
            settings,
            path_config,
            catalog: Arc::new(FrameCatalog::empty()),
            cache: Arc::new(FrameCache::new()),
            workers,
            loader: None,
            player,
            stations,
            event_bus,
            catalog_rx,
            batch_size: args.batch_size.clamp(1, 64),
            spring,
            scroll: ScrollAccumulator::default(),
            canvas: CanvasRenderer::new(),
            hud: StatusHud::new(),
            is_fullscreen: args.fullscreen,
            last_update: None,
            last_stats_log: Instant::now(),
            current_station: None,
        }
    }

    fn catalog_source(args: &Args) -> Option<CatalogSource> {
        if let Some(manifest) = &args.manifest {
            return Some(CatalogSource::Manifest(manifest.clone()));
        }
        args.sequence_dir.clone().map(CatalogSource::Directory)
    }

    /// Begin resolving a catalog source (startup or dropped directory).
    pub fn begin_catalog_load(&mut self, source: CatalogSource) {
        info!("Resolving catalog from {}", source);
        self.catalog_rx = Some(FrameCatalog::load_async(source));
    }

    /// Catalog resolved: wire up the loader and leave the Loading phase.
    pub fn attach_catalog(&mut self, catalog: FrameCatalog, now: Instant) {
        let total = catalog.len();
        self.catalog = Arc::new(catalog);
        self.player.attach_catalog(total, now);

        if total > 0 {
            let intro_end = self.player.autoplay().end();
            let plan = LoadPlan::staged(
                intro_end,
                total as i32,
                self.batch_size.clamp(1, DEFAULT_BATCH_SIZE * 3),
            );
            self.loader = Some(ProgressiveLoader::start(
                Arc::clone(&self.workers),
                Arc::clone(&self.catalog),
                Arc::clone(&self.cache),
                Arc::new(DiskFetcher),
                plan,
            ));
        }
    }

    /// Accept a dropped frame directory (or manifest) while no catalog is
    /// resolved yet.
    pub fn handle_dropped_path(&mut self, path: PathBuf) {
        if !self.catalog.is_empty() || self.catalog_rx.is_some() {
            return;
        }
        let source = if path.is_dir() {
            CatalogSource::Directory(path)
        } else if path.extension().and_then(|e| e.to_str()) == Some("json") {
            CatalogSource::Manifest(path)
        } else {
            warn!("Dropped path is neither a directory nor a manifest");
            return;
        };
        self.begin_catalog_load(source);
    }

    pub(crate) fn poll_catalog(&mut self, now: Instant) {
        let Some(rx) = &self.catalog_rx else {
            return;
        };
        if let Ok(catalog) = rx.try_recv() {
            self.catalog_rx = None;
            self.attach_catalog(catalog, now);
        }
    }

    pub(crate) fn frame_dt(&mut self, now: Instant) -> f32 {
        let dt = self
            .last_update
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(1.0 / 60.0);
        self.last_update = Some(now);
        dt
    }

    /// Accumulate wheel input into normalized page progress.
    pub(crate) fn apply_scroll_input(&mut self, scroll_delta: f32, viewport_height: f32) -> f32 {
        let page_len = viewport_height * self.settings.page_screens;
        self.scroll.apply(scroll_delta, page_len)
    }

    pub(crate) fn maybe_log_stats(&mut self, now: Instant) {
        if now.duration_since(self.last_stats_log).as_secs() < 10 {
            return;
        }
        self.last_stats_log = now;
        let stats = self.cache.stats();
        info!(
            "Cache: {}/{} frames | hits: {} | misses: {} | hit rate: {:.1}%",
            self.cache.loaded_count(),
            self.player.total(),
            stats.hits(),
            stats.misses(),
            stats.hit_rate() * 100.0
        );
    }
}
