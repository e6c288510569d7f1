//! Playback and loading events.

use crate::core::player::PlaybackPhase;

// === Frame changes ===

/// Displayed frame changed (auto-play step or scroll mapping).
#[derive(Clone, Debug)]
pub struct SetFrameEvent(pub i32);

// === Phase transitions ===

#[derive(Clone, Debug)]
pub struct PhaseChangedEvent(pub PlaybackPhase);

/// Auto-play reached its end frame. Fired exactly once per session;
/// surrounding UI (HUD unlock, overlay removal) keys off this.
#[derive(Clone, Debug)]
pub struct IntroCompleteEvent;

// === Display-only ===

/// Current scroll station changed (label for the HUD, never affects frame
/// selection).
#[derive(Clone, Debug)]
pub struct StationChangedEvent {
    pub name: String,
    pub action: String,
}
