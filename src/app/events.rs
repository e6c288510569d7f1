//! Event processing for the main loop.
//!
//! Drains the bus queue once per frame. Frame changes drive the station
//! readout; phase changes and intro completion are logged here so the
//! engine modules stay free of UI concerns.

use log::{debug, info};

use crate::app::ScrollaApp;
use crate::core::event_bus::downcast_event;
use crate::core::events::{
    IntroCompleteEvent, PhaseChangedEvent, SetFrameEvent, StationChangedEvent,
};

impl ScrollaApp {
    pub(crate) fn handle_events(&mut self) {
        for event in self.event_bus.poll() {
            if let Some(SetFrameEvent(frame)) = downcast_event::<SetFrameEvent>(&event) {
                self.on_frame_changed(*frame);
            } else if let Some(PhaseChangedEvent(phase)) =
                downcast_event::<PhaseChangedEvent>(&event)
            {
                info!("Playback phase: {:?}", phase);
            } else if downcast_event::<IntroCompleteEvent>(&event).is_some() {
                info!("Intro complete signalled");
            } else if let Some(changed) = downcast_event::<StationChangedEvent>(&event) {
                debug!("Station: {} ({})", changed.name, changed.action);
            }
        }
    }

    /// Track the owning station of the displayed frame; emit a change event
    /// when it differs from the last one.
    fn on_frame_changed(&mut self, frame: i32) {
        let Some(station) = self.stations.locate_or_default(frame) else {
            return;
        };
        if self.current_station.as_deref() != Some(station.name.as_str()) {
            self.current_station = Some(station.name.clone());
            self.event_bus.emit(StationChangedEvent {
                name: station.name.clone(),
                action: station.action.clone(),
            });
        }
    }
}
