//! Main application loop - eframe::App implementation.
//!
//! Each frame:
//! 1. Poll the one-shot catalog resolution
//! 2. Feed wheel input through the spring into the player
//! 3. Advance the intro driver
//! 4. Process queued events
//! 5. Paint canvas + HUD
//! 6. Decide whether another repaint is needed

use std::time::{Duration, Instant};

use eframe::egui;
use log::trace;

use crate::app::ScrollaApp;
use crate::core::player::PlaybackPhase;

impl eframe::App for ScrollaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let dt = self.frame_dt(now);

        self.poll_catalog(now);

        // Dropped directory/manifest can supply the sequence when none was
        // given on the command line
        let dropped: Vec<std::path::PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        for path in dropped {
            self.handle_dropped_path(path);
        }

        // Scroll input -> normalized page progress -> spring -> player.
        // The player ignores scroll until the intro hands control over.
        let (scroll_delta, viewport_height) =
            ctx.input(|i| (i.raw_scroll_delta.y, i.viewport_rect().height()));
        let target = self.apply_scroll_input(scroll_delta, viewport_height.max(1.0));
        self.spring.set_target(target);
        self.spring.tick(dt);
        self.player.on_scroll(self.spring.value(), now);

        // Intro auto-play
        self.player.update(now);

        self.handle_events();
        self.maybe_log_stats(now);

        // Canvas fills the whole window, no margins
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let frame_idx = self.player.current_frame();
                self.canvas.show(ui, &self.cache, frame_idx);
            });

        if self.settings.show_hud {
            self.hud
                .render(ctx, &self.player, &self.cache, &self.stations);
        }

        self.handle_keyboard_input(ctx);

        // Repaint policy: animate while the intro runs or the spring is
        // moving; otherwise poll lazily while the cache is still filling
        let cache_dirty = self.cache.take_dirty();
        let animating =
            self.player.phase() == PlaybackPhase::AutoPlaying || !self.spring.is_settled();
        if animating || cache_dirty {
            ctx.request_repaint();
        } else if (self.cache.loaded_count() as i32) < self.player.total() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }

    /// Save settings to persistent storage.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Ok(json) = serde_json::to_string(&self.settings) {
            storage.set_string(eframe::APP_KEY, json);
            trace!("Settings saved");
        }
    }

    /// Cleanup on application exit.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        // Drop the liveness flag so in-flight decodes become no-ops and the
        // scheduler stops issuing batches
        if let Some(loader) = &self.loader {
            loader.stop();
        }
        trace!("Cancelled pending frame loads for fast shutdown");
    }
}

impl ScrollaApp {
    /// Minimal hotkeys: H toggles the HUD, F toggles fullscreen.
    fn handle_keyboard_input(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::H)) {
            self.settings.show_hud = !self.settings.show_hud;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::F)) {
            self.is_fullscreen = !self.is_fullscreen;
            ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(self.is_fullscreen));
        }
    }
}
