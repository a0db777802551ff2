//! Main application loop - eframe::App implementation.
//!
//! Per frame:
//! 1. Translate viewport signals (focus, minimize, close request) into
//!    bus events for the backdrop
//! 2. Warm the preload cache for the current page
//! 3. Tick and paint the backdrop (background layer)
//! 4. Render the sidebar and the current page (with fade)
//! 5. Paint the gradient frame border and the watermark (foreground layer)

use std::time::{Duration, Instant};

use eframe::egui;
use glam::Vec2;
use log::{debug, trace};

use super::{FolioApp, nav, pages_ui};
use crate::core::event_bus::downcast_event;
use crate::core::nav_events::{NavSettled, NavStarted, PreloadSettled, VisibilityChanged};

impl eframe::App for FolioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let screen = ctx.input(|i| i.viewport_rect());
        let viewport = Vec2::new(screen.width(), screen.height());

        // Theme and base font size.
        ctx.set_visuals(egui::Visuals::dark());
        let mut style = (*ctx.style()).clone();
        for (_, font_id) in style.text_styles.iter_mut() {
            font_id.size = self.settings.font_size;
        }
        ctx.set_style(style);

        // Window lifecycle -> transition signals for the backdrop.
        let (hidden, closing) = ctx.input(|i| {
            let v = i.viewport();
            (
                v.minimized.unwrap_or(false) || !v.focused.unwrap_or(true),
                v.close_requested(),
            )
        });
        if hidden != self.was_hidden {
            self.was_hidden = hidden;
            self.bus.emit(VisibilityChanged { hidden });
        }
        if closing && !self.close_signalled {
            self.close_signalled = true;
            self.bus.emit(NavStarted { to: None });
        }

        // Fade completion closes the transition window.
        if self.fade.tick(now) {
            self.bus.emit(NavSettled);
        }

        // Background cache warmup for the page being shown.
        self.warm_preloads();

        // Drain deferred events; settled preloads are only logged, the nav
        // entries read the preloader directly.
        for event in self.bus.poll() {
            if let Some(settled) = downcast_event::<PreloadSettled>(&event) {
                trace!("Preload settled: {:?} ok={}", settled.page, settled.ok);
            }
        }

        // Backdrop: mount lazily (needs a real viewport), hit-test pointer
        // presses outside the navigation region, then advance one frame.
        self.ensure_backdrop(viewport, now);
        if let Some(pos) = ctx.input(|i| {
            (i.pointer.any_pressed()).then(|| i.pointer.press_origin()).flatten()
        }) && !self.nav_rect.contains(pos)
            && let Some(backdrop) = self.backdrop.as_mut()
            && backdrop.pointer_down(Vec2::new(pos.x, pos.y), now)
        {
            debug!("Backdrop pause toggled: paused={}", backdrop.is_paused());
        }
        let (drag_pos, released) = ctx.input(|i| {
            (
                i.pointer.primary_down().then(|| i.pointer.latest_pos()).flatten(),
                i.pointer.any_released(),
            )
        });
        if let Some(backdrop) = self.backdrop.as_mut() {
            if let Some(pos) = drag_pos
                && !self.nav_rect.contains(pos)
            {
                backdrop.pointer_dragged(Vec2::new(pos.x, pos.y));
            }
            if released {
                backdrop.pointer_released();
            }
            backdrop.tick(now, viewport);
        }
        self.paint_backdrop(ctx, screen);

        // Gradient border follows the pointer direction.
        if let Some(pos) = ctx.input(|i| i.pointer.latest_pos()) {
            self.border
                .point_at(Vec2::new(pos.x, pos.y), Vec2::new(screen.center().x, screen.center().y));
        }
        self.border.step();

        nav::draw_sidebar(self, ctx, now);

        let opacity = self.fade.opacity(now);
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.inner_margin(egui::Margin::same(28)))
            .show(ctx, |ui| {
                ui.scope(|ui| {
                    ui.set_opacity(opacity);
                    if let Some(bundle) = self.bundle(self.current_page) {
                        pages_ui::draw_page(ui, &bundle);
                    }
                });
            });

        // Foreground chrome.
        let fg = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("chrome"),
        ));
        nav::draw_frame_border(&fg, screen, self.border.current);
        if self.settings.show_watermark {
            nav::draw_watermark(&fg, screen);
        }

        // The backdrop and the border animate continuously; the frame-rate
        // throttling happens inside Backdrop::tick.
        ctx.request_repaint_after(Duration::from_millis(16));
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Ok(json) = serde_json::to_string(self) {
            storage.set_string(eframe::APP_KEY, json);
            trace!(
                "App state saved: page={:?}, backdrop={}",
                self.current_page, self.settings.backdrop_enabled
            );
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(backdrop) = self.backdrop.as_mut() {
            backdrop.dispose();
        }
        trace!("Folio shutting down");
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        let bg = nav::BG;
        [
            bg.r() as f32 / 255.0,
            bg.g() as f32 / 255.0,
            bg.b() as f32 / 255.0,
            1.0,
        ]
    }
}

impl FolioApp {
    /// Paint the latest ASCII frame across the whole window, behind the
    /// panels.
    fn paint_backdrop(&self, ctx: &egui::Context, screen: egui::Rect) {
        let Some(frame) = self.backdrop.as_ref().and_then(|b| b.frame()) else {
            return;
        };

        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Background,
            egui::Id::new("backdrop"),
        ));

        let [r, g, b] = frame.params.color;
        let color = egui::Color32::from_rgba_unmultiplied(
            r,
            g,
            b,
            (frame.params.opacity * 255.0) as u8,
        );
        let font = egui::FontId::monospace(frame.params.font_px);
        let row_step = screen.height() / frame.rows as f32;

        for (row, line) in frame.lines.iter().enumerate() {
            painter.text(
                egui::Pos2::new(screen.left(), screen.top() + row as f32 * row_step),
                egui::Align2::LEFT_TOP,
                line,
                font.clone(),
                color,
            );
        }
    }
}
