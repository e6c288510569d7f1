//! Core engine modules - catalog, cache, loader, playback
//!
//! These modules form the scrubbing engine, independent of UI.

pub mod autoplay;
pub mod cache;
pub mod catalog;
pub mod event_bus;
pub mod events;
pub mod frame;
pub mod loader;
pub mod mapper;
pub mod player;
pub mod spring;
pub mod stations;
pub mod workers;

// Re-exports for convenience
pub use autoplay::{AutoPlayDriver, AutoPlayState};
pub use cache::FrameCache;
pub use catalog::{CatalogSource, FrameCatalog, ManifestEntry};
pub use event_bus::{BoxedEvent, EventBus, EventEmitter, downcast_event};
pub use frame::DecodedFrame;
pub use loader::{DiskFetcher, FrameFetcher, LoadPlan, LoadRange, ProgressiveLoader};
pub use mapper::ScrollFrameMapper;
pub use player::{PlaybackPhase, SequencePlayer};
pub use spring::ScrollSpring;
pub use stations::{ScrollStation, StationSet};
pub use workers::Workers;
