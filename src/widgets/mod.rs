//! UI Widgets - canvas painting and HUD overlays

pub mod canvas;
pub mod status;

pub use canvas::{CanvasRenderer, cover_fit};
pub use status::StatusHud;
