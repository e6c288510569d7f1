//! Canvas widget - cover-fit frame painting
//!
//! Paints the best-available frame for the current index onto the full
//! panel. If the frame is not cached yet the previous texture stays on
//! screen - missing-frame is a silent hold-last-frame, never a clear to
//! black. The cover fit is recomputed only when the panel or image size
//! changes, not on every paint.

use eframe::egui::{self, Color32, ColorImage, Rect, TextureHandle, TextureOptions, Vec2};
use log::trace;

use crate::core::cache::FrameCache;

/// Cover-fit placement: scale the image so it fills the canvas completely
/// (ratio = max of the two axis ratios), centered, overflow cropped.
///
/// Returned rect is in canvas-local coordinates and may extend outside
/// `[0, canvas]` on one axis.
pub fn cover_fit(canvas: Vec2, image: Vec2) -> Rect {
    if image.x <= 0.0 || image.y <= 0.0 {
        return Rect::from_min_size(egui::pos2(0.0, 0.0), canvas);
    }
    let ratio = (canvas.x / image.x).max(canvas.y / image.y);
    let size = image * ratio;
    let offset = (canvas - size) * 0.5;
    Rect::from_min_size(egui::pos2(offset.x, offset.y), size)
}

/// Paints cached frames with a cover fit, holding the last good frame on
/// cache misses.
pub struct CanvasRenderer {
    texture: Option<TextureHandle>,
    /// Frame index currently on the texture
    painted_frame: Option<i32>,
    image_size: Vec2,
    /// Cached placement, invalidated on panel or image size change
    canvas_size: Vec2,
    fit: Rect,
}

impl Default for CanvasRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasRenderer {
    pub fn new() -> Self {
        Self {
            texture: None,
            painted_frame: None,
            image_size: Vec2::ZERO,
            canvas_size: Vec2::ZERO,
            fit: Rect::NOTHING,
        }
    }

    /// Index of the frame currently displayed, if any.
    pub fn painted_frame(&self) -> Option<i32> {
        self.painted_frame
    }

    /// Paint into the full available panel.
    ///
    /// Re-queries the cache whenever the wanted frame differs from the
    /// painted one, so a frame that arrives later is picked up on the next
    /// repaint after the cache goes dirty.
    pub fn show(&mut self, ui: &mut egui::Ui, cache: &FrameCache, current_frame: i32) {
        let (rect, _response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::BLACK);

        if self.painted_frame != Some(current_frame) {
            if let Some(frame) = cache.get(current_frame) {
                let image = ColorImage::from_rgba_unmultiplied(
                    [frame.width(), frame.height()],
                    frame.pixels(),
                );
                match &mut self.texture {
                    Some(texture) => texture.set(image, TextureOptions::LINEAR),
                    None => {
                        self.texture = Some(ui.ctx().load_texture(
                            "sequence-frame",
                            image,
                            TextureOptions::LINEAR,
                        ));
                    }
                }
                self.painted_frame = Some(current_frame);
                let new_size = Vec2::new(frame.width() as f32, frame.height() as f32);
                if new_size != self.image_size {
                    self.image_size = new_size;
                    self.canvas_size = Vec2::ZERO; // force fit recompute
                }
            } else {
                trace!("Frame {} not cached yet, holding last paint", current_frame);
            }
        }

        let Some(texture) = &self.texture else {
            return; // nothing decoded yet, leave the canvas black
        };

        if rect.size() != self.canvas_size {
            self.canvas_size = rect.size();
            self.fit = cover_fit(self.canvas_size, self.image_size);
            trace!(
                "Cover fit recomputed: canvas {:?}, image {:?}",
                self.canvas_size, self.image_size
            );
        }

        let dest = self.fit.translate(rect.min.to_vec2());
        let uv = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
        painter.image(texture.id(), dest, uv, Color32::WHITE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: wide canvas, square image - width fills, height overflows
    /// symmetrically
    #[test]
    fn test_cover_fit_wide_canvas() {
        let fit = cover_fit(Vec2::new(200.0, 100.0), Vec2::new(100.0, 100.0));
        assert_eq!(fit.size(), Vec2::new(200.0, 200.0));
        assert_eq!(fit.min.x, 0.0);
        assert_eq!(fit.min.y, -50.0);
    }

    /// Test: tall canvas, square image - height fills, width overflows
    #[test]
    fn test_cover_fit_tall_canvas() {
        let fit = cover_fit(Vec2::new(100.0, 300.0), Vec2::new(50.0, 50.0));
        assert_eq!(fit.size(), Vec2::new(300.0, 300.0));
        assert_eq!(fit.min.x, -100.0);
        assert_eq!(fit.min.y, 0.0);
    }

    /// Test: matching aspect fills exactly
    #[test]
    fn test_cover_fit_exact() {
        let fit = cover_fit(Vec2::new(1920.0, 1080.0), Vec2::new(960.0, 540.0));
        assert_eq!(fit.min, egui::pos2(0.0, 0.0));
        assert_eq!(fit.size(), Vec2::new(1920.0, 1080.0));
    }

    /// Test: the scaled image always covers the whole canvas
    #[test]
    fn test_cover_fit_covers() {
        for (cw, ch, iw, ih) in [
            (1280.0, 720.0, 1999.0, 1125.0),
            (720.0, 1280.0, 1920.0, 1080.0),
            (333.0, 777.0, 1024.0, 768.0),
        ] {
            let fit = cover_fit(Vec2::new(cw, ch), Vec2::new(iw, ih));
            assert!(fit.min.x <= 0.001 && fit.min.y <= 0.001);
            assert!(fit.max.x >= cw - 0.001 && fit.max.y >= ch - 0.001);
        }
    }

    /// Test: degenerate image size falls back to the canvas rect, no NaN
    #[test]
    fn test_cover_fit_degenerate() {
        let fit = cover_fit(Vec2::new(100.0, 100.0), Vec2::ZERO);
        assert_eq!(fit.size(), Vec2::new(100.0, 100.0));
    }
}
