//! Sequence player - composed playback state machine
//!
//! **Architecture**: exactly one driver owns the displayed frame at any
//! moment, selected by phase rather than by lock:
//!
//! `Loading` — catalog unresolved, nothing renders, nobody owns the frame.
//! `AutoPlaying` — the intro driver owns it; scroll emissions are ignored,
//! so a fast scroll during the intro cannot fight the counter for control.
//! `ScrollControlled` — terminal; the scroll mapper owns it.
//!
//! Transitions only ever move forward, once per session. The background
//! loader keeps filling the cache regardless of phase.
//!
//! **Used by**: app update loop (tick + scroll input), HUD (phase display)

use std::time::Instant;

use log::{info, warn};

use crate::core::autoplay::AutoPlayDriver;
use crate::core::event_bus::EventEmitter;
use crate::core::events::{IntroCompleteEvent, PhaseChangedEvent, SetFrameEvent};
use crate::core::mapper::ScrollFrameMapper;

/// Who owns the displayed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    Loading,
    AutoPlaying,
    ScrollControlled,
}

/// Composed playback state: intro auto-play, then scroll scrubbing.
pub struct SequencePlayer {
    phase: PlaybackPhase,
    current_frame: i32,
    /// Total frame count N; zero until the catalog resolves
    total: i32,
    autoplay: AutoPlayDriver,
    mapper: ScrollFrameMapper,
    emitter: EventEmitter,
}

impl SequencePlayer {
    pub fn new(autoplay: AutoPlayDriver, mapper: ScrollFrameMapper, emitter: EventEmitter) -> Self {
        Self {
            phase: PlaybackPhase::Loading,
            current_frame: 0,
            total: 0,
            autoplay,
            mapper,
            emitter,
        }
    }

    /// Catalog resolved: leave `Loading` and start the intro.
    ///
    /// An empty catalog keeps the player in `Loading` for the rest of the
    /// session (the renderer draws nothing; this is the manifest-unavailable
    /// degrade, not an error).
    pub fn attach_catalog(&mut self, total: usize, now: Instant) {
        if self.phase != PlaybackPhase::Loading {
            return;
        }
        if total == 0 {
            warn!("Catalog is empty, player stays in Loading for this session");
            return;
        }

        self.total = total as i32;
        // The scroll range is configured before N is known; clamp it now
        self.mapper.clamp_range(0, self.total - 1);
        self.phase = PlaybackPhase::AutoPlaying;
        self.emitter.emit(PhaseChangedEvent(self.phase));

        let start_frame = self.autoplay.start(now);
        self.current_frame = self.clamp(start_frame);
        self.emitter.emit(SetFrameEvent(self.current_frame));
        info!(
            "Catalog attached: {} frames, auto-play to {}",
            total,
            self.autoplay.end()
        );
    }

    /// Advance the intro. No-op outside `AutoPlaying`.
    pub fn update(&mut self, now: Instant) {
        if self.phase != PlaybackPhase::AutoPlaying {
            return;
        }

        if let Some(frame) = self.autoplay.tick(now) {
            self.set_current(frame);
        }

        if self.autoplay.take_completed() {
            self.phase = PlaybackPhase::ScrollControlled;
            self.emitter.emit(PhaseChangedEvent(self.phase));
            self.emitter.emit(IntroCompleteEvent);
            info!("Intro complete, scroll control active");
        }
    }

    /// Feed smoothed scroll progress. Ignored until `ScrollControlled`
    /// (the guarded handoff). Returns true if the frame changed.
    pub fn on_scroll(&mut self, progress: f32, now: Instant) -> bool {
        if self.phase != PlaybackPhase::ScrollControlled {
            return false;
        }
        match self.mapper.update(progress, now) {
            Some(index) => {
                self.set_current(index);
                true
            }
            None => false,
        }
    }

    fn set_current(&mut self, frame: i32) {
        let clamped = self.clamp(frame);
        if clamped != self.current_frame {
            self.current_frame = clamped;
            self.emitter.emit(SetFrameEvent(clamped));
        }
    }

    fn clamp(&self, frame: i32) -> i32 {
        if self.total > 0 {
            frame.clamp(0, self.total - 1)
        } else {
            frame.max(0)
        }
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn current_frame(&self) -> i32 {
        self.current_frame
    }

    pub fn total(&self) -> i32 {
        self.total
    }

    pub fn autoplay(&self) -> &AutoPlayDriver {
        &self.autoplay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event_bus::{EventBus, downcast_event};
    use std::time::Duration;

    fn player_with_bus(intro_end: i32, total: usize) -> (SequencePlayer, EventBus, Instant) {
        let bus = EventBus::new();
        let autoplay = AutoPlayDriver::new(intro_end, 24.0);
        let mapper = ScrollFrameMapper::new(intro_end + 1, total as i32 - 1).with_max_rate(0.0);
        let mut player = SequencePlayer::new(autoplay, mapper, bus.emitter());
        let t0 = Instant::now();
        player.attach_catalog(total, t0);
        (player, bus, t0)
    }

    fn frame_dur() -> Duration {
        // One frame at 24 fps plus slack for float rounding at the boundary
        Duration::from_secs_f32(1.0 / 24.0) + Duration::from_millis(1)
    }

    /// Test: phases walk Loading -> AutoPlaying -> ScrollControlled, forward
    /// only
    #[test]
    fn test_phase_progression() {
        let (mut player, _bus, t0) = player_with_bus(2, 100);
        assert_eq!(player.phase(), PlaybackPhase::AutoPlaying);

        let mut now = t0;
        for _ in 0..5 {
            now += frame_dur();
            player.update(now);
        }
        assert_eq!(player.phase(), PlaybackPhase::ScrollControlled);
        assert_eq!(player.current_frame(), 2);

        // Terminal: further updates never leave scroll control
        player.update(now + Duration::from_secs(1));
        assert_eq!(player.phase(), PlaybackPhase::ScrollControlled);
    }

    /// Test: scroll emissions during AutoPlaying never alter the frame
    #[test]
    fn test_scroll_ignored_during_autoplay() {
        let (mut player, _bus, t0) = player_with_bus(50, 100);
        assert_eq!(player.phase(), PlaybackPhase::AutoPlaying);

        let before = player.current_frame();
        assert!(!player.on_scroll(0.9, t0 + Duration::from_millis(5)));
        assert_eq!(player.current_frame(), before);
    }

    /// Test: scroll drives the frame once control is handed over
    #[test]
    fn test_scroll_after_handoff() {
        let (mut player, _bus, t0) = player_with_bus(1, 100);
        let mut now = t0;
        for _ in 0..3 {
            now += frame_dur();
            player.update(now);
        }
        assert_eq!(player.phase(), PlaybackPhase::ScrollControlled);

        assert!(player.on_scroll(1.0, now));
        assert_eq!(player.current_frame(), 99);
    }

    /// Test: empty catalog parks the player in Loading for the session
    #[test]
    fn test_empty_catalog_stays_loading() {
        let bus = EventBus::new();
        let autoplay = AutoPlayDriver::new(10, 24.0);
        let mapper = ScrollFrameMapper::new(0, 10).with_max_rate(0.0);
        let mut player = SequencePlayer::new(autoplay, mapper, bus.emitter());

        let t0 = Instant::now();
        player.attach_catalog(0, t0);
        assert_eq!(player.phase(), PlaybackPhase::Loading);
        assert!(!player.on_scroll(0.5, t0));
        player.update(t0 + Duration::from_secs(1));
        assert_eq!(player.phase(), PlaybackPhase::Loading);
    }

    /// Test: IntroCompleteEvent fires exactly once
    #[test]
    fn test_intro_complete_once() {
        let (mut player, bus, t0) = player_with_bus(2, 100);
        let mut now = t0;
        for _ in 0..20 {
            now += frame_dur();
            player.update(now);
        }

        let completions = bus
            .poll()
            .iter()
            .filter(|e| downcast_event::<IntroCompleteEvent>(e).is_some())
            .count();
        assert_eq!(completions, 1);
    }

    /// Test: frames are clamped against the catalog total
    #[test]
    fn test_current_frame_clamped() {
        // Intro end beyond the sequence: counter runs to E, display clamps
        let (mut player, _bus, t0) = player_with_bus(5, 4);
        let mut now = t0;
        for _ in 0..10 {
            now += frame_dur();
            player.update(now);
        }
        assert!(player.current_frame() <= 3);
    }
}
