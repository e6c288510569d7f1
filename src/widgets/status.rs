//! HUD overlays - loading progress, intro counter, station readout
//!
//! Small corner pills rendered over the canvas. Display-only: everything
//! here is derived state, nothing feeds back into playback.

use eframe::egui;

use crate::core::cache::FrameCache;
use crate::core::player::{PlaybackPhase, SequencePlayer};
use crate::core::stations::StationSet;

const PILL_BG: egui::Color32 = egui::Color32::from_rgba_premultiplied(0, 0, 0, 180);
const ACCENT: egui::Color32 = egui::Color32::from_rgb(80, 200, 255);
const PASSED: egui::Color32 = egui::Color32::from_rgb(90, 220, 130);
const DIM: egui::Color32 = egui::Color32::from_gray(80);

/// Corner overlay renderer.
pub struct StatusHud {
    pub show_stations: bool,
}

impl Default for StatusHud {
    fn default() -> Self {
        Self {
            show_stations: true,
        }
    }
}

impl StatusHud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(
        &self,
        ctx: &egui::Context,
        player: &SequencePlayer,
        cache: &FrameCache,
        stations: &StationSet,
    ) {
        let total = player.total();

        // Loading pill while the cache is still filling
        if total > 0 && (cache.loaded_count() as i32) < total {
            let pct = (cache.loaded_count() * 100) / total.max(1) as usize;
            Self::pill(
                ctx,
                "hud-loading",
                egui::Align2::RIGHT_BOTTOM,
                egui::vec2(-16.0, -16.0),
                |ui| {
                    ui.monospace(format!("Loading {:>3}%", pct));
                },
            );
        }

        match player.phase() {
            PlaybackPhase::Loading => {
                Self::pill(
                    ctx,
                    "hud-catalog",
                    egui::Align2::CENTER_CENTER,
                    egui::vec2(0.0, 0.0),
                    |ui| {
                        ui.monospace("Resolving sequence...");
                    },
                );
            }
            PlaybackPhase::AutoPlaying => {
                let driver = player.autoplay();
                Self::pill(
                    ctx,
                    "hud-intro",
                    egui::Align2::CENTER_TOP,
                    egui::vec2(0.0, 16.0),
                    |ui| {
                        ui.monospace(format!("Intro {}/{}", driver.frame(), driver.end()));
                    },
                );
            }
            PlaybackPhase::ScrollControlled => {
                let frame = player.current_frame();

                Self::pill(
                    ctx,
                    "hud-frame",
                    egui::Align2::LEFT_BOTTOM,
                    egui::vec2(16.0, -16.0),
                    |ui| {
                        ui.monospace(format!("Frame {:>4}/{}", frame, total - 1));
                        if let Some(station) = stations.locate_or_default(frame) {
                            ui.label(
                                egui::RichText::new(format!(
                                    "{} · {}",
                                    station.name,
                                    station.action.replace('_', " ")
                                ))
                                .color(ACCENT)
                                .monospace(),
                            );
                        }
                    },
                );

                if self.show_stations && !stations.is_empty() {
                    Self::pill(
                        ctx,
                        "hud-stations",
                        egui::Align2::CENTER_TOP,
                        egui::vec2(0.0, 16.0),
                        |ui| {
                            ui.horizontal(|ui| {
                                for station in stations.iter() {
                                    let color = if station.contains(frame) {
                                        ACCENT
                                    } else if frame > station.end {
                                        PASSED
                                    } else {
                                        DIM
                                    };
                                    let (rect, _) = ui.allocate_exact_size(
                                        egui::vec2(10.0, 10.0),
                                        egui::Sense::hover(),
                                    );
                                    ui.painter().circle_filled(rect.center(), 4.0, color);
                                }
                            });
                        },
                    );
                }
            }
        }
    }

    fn pill(
        ctx: &egui::Context,
        id: &str,
        anchor: egui::Align2,
        offset: egui::Vec2,
        add_contents: impl FnOnce(&mut egui::Ui),
    ) {
        egui::Area::new(egui::Id::new(id))
            .anchor(anchor, offset)
            .show(ctx, |ui| {
                egui::Frame::NONE
                    .fill(PILL_BG)
                    .inner_margin(10.0)
                    .corner_radius(8.0)
                    .show(ui, add_contents);
            });
    }
}
