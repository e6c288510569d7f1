//! SCROLLA - Scroll-driven image sequence scrubber library
//!
//! Re-exports all modules for use by the binary target.

// Core engine (catalog, cache, loader, playback)
pub mod core;

// App modules
pub mod app;
pub mod cli;
pub mod config;
pub mod runner;
pub mod widgets;

// Re-export commonly used types from core
pub use core::autoplay::{AutoPlayDriver, AutoPlayState};
pub use core::cache::FrameCache;
pub use core::catalog::{CatalogSource, FrameCatalog, ManifestEntry};
pub use core::event_bus::{BoxedEvent, EventBus, EventEmitter, downcast_event};
pub use core::frame::DecodedFrame;
pub use core::loader::{LoadPlan, LoadRange, ProgressiveLoader};
pub use core::mapper::ScrollFrameMapper;
pub use core::player::{PlaybackPhase, SequencePlayer};
pub use core::spring::ScrollSpring;
pub use core::stations::{ScrollStation, StationSet};
pub use core::workers::Workers;
