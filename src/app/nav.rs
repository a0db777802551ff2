//! Sidebar navigation, the gradient frame border and the watermark.
//!
//! The sidebar is the "navigation region": clicks here start page
//! transitions, and hover/press/focus on an entry force-preloads its page.

use eframe::egui::{self, Color32, Pos2, Rect};
use std::time::Instant;

use super::FolioApp;
use crate::pages::{PageId, content};

/// Site palette.
pub const BG: Color32 = Color32::from_rgb(0x18, 0x17, 0x17);
pub const TEXT: Color32 = Color32::from_rgb(0xff, 0xff, 0xff);
pub const TEXT_DIM: Color32 = Color32::from_rgb(0xaa, 0xaa, 0xaa);
pub const ACCENT: Color32 = Color32::from_rgb(0xa4, 0x45, 0x3f);
pub const ACCENT_BRIGHT: Color32 = Color32::from_rgb(0xd8, 0x6d, 0x73);
const GRADIENT_DARK: Color32 = Color32::from_rgb(0x5c, 0x2c, 0x23);

const BORDER_THICKNESS: f32 = 2.0;
const BORDER_INSET: f32 = 10.0;

/// Sidebar: logo, subtitle and the nav list. Returns the clicked page.
pub fn draw_sidebar(app: &mut FolioApp, ctx: &egui::Context, now: Instant) -> Option<PageId> {
    let mut clicked = None;
    let mut force_target = None;

    let panel = egui::SidePanel::left("sidebar")
        .frame(
            egui::Frame::NONE
                .inner_margin(egui::Margin::symmetric(28, 36)),
        )
        .exact_width(240.0)
        .resizable(false)
        .show_separator_line(false)
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(content::OWNER)
                    .size(30.0)
                    .color(TEXT),
            );
            ui.label(
                egui::RichText::new(content::SUBTITLE)
                    .size(11.0)
                    .color(TEXT_DIM),
            );
            ui.add_space(36.0);

            for page in PageId::ALL {
                let active = page == app.current_page;
                let color = if active { ACCENT } else { TEXT_DIM };

                let resp = ui.add(
                    egui::Button::new(
                        egui::RichText::new(page.label()).size(15.0).color(color),
                    )
                    .frame(false),
                );

                if active {
                    let r = resp.rect;
                    let marker = Rect::from_min_max(
                        Pos2::new(r.left() - 14.0, r.center().y - 9.0),
                        Pos2::new(r.left() - 10.0, r.center().y + 9.0),
                    );
                    ui.painter().rect_filled(marker, 2.0, ACCENT);
                }

                if resp.hovered() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                }

                // High-confidence navigation signals warm the page now.
                let wants_force =
                    resp.hovered() || resp.gained_focus() || resp.is_pointer_button_down_on();
                if wants_force {
                    force_target = Some(page);
                    if app.forced_hover != Some(page)
                        && !app.preloader.is_loaded(page)
                        && let Some(loader) = app.routes.loader(page)
                    {
                        app.preloader.force_preload(page, loader);
                    }
                }

                if resp.clicked() {
                    clicked = Some(page);
                }
                ui.add_space(4.0);
            }
        });

    // Re-arm hover forcing once the pointer leaves the nav list.
    app.forced_hover = force_target;
    app.nav_rect = panel.response.rect;

    if let Some(page) = clicked {
        app.navigate(page, now);
    }
    clicked
}

/// Owner watermark, top-right.
pub fn draw_watermark(painter: &egui::Painter, screen: Rect) {
    painter.text(
        Pos2::new(screen.right() - 12.0, screen.top() + 6.0),
        egui::Align2::RIGHT_TOP,
        format!("@{}", content::OWNER).to_uppercase(),
        egui::FontId::monospace(9.0),
        TEXT_DIM.gamma_multiply(0.6),
    );
}

/// Color of the three-stop gradient at `t` in [0, 1].
fn gradient_color(t: f32) -> Color32 {
    let lerp = |a: Color32, b: Color32, t: f32| {
        Color32::from_rgb(
            (a.r() as f32 + (b.r() as f32 - a.r() as f32) * t) as u8,
            (a.g() as f32 + (b.g() as f32 - a.g() as f32) * t) as u8,
            (a.b() as f32 + (b.b() as f32 - a.b() as f32) * t) as u8,
        )
    };
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        lerp(GRADIENT_DARK, ACCENT, t * 2.0)
    } else {
        lerp(ACCENT, ACCENT_BRIGHT, (t - 0.5) * 2.0)
    }
}

/// Gradient position of a point for a given angle (CSS convention:
/// 0 degrees points up, increasing clockwise).
fn gradient_t(pos: Pos2, rect: Rect, angle_deg: f32) -> f32 {
    let a = angle_deg.to_radians();
    // Screen space has +y down.
    let dir = egui::Vec2::new(a.sin(), -a.cos());
    let half = dir.x.abs() * rect.width() * 0.5 + dir.y.abs() * rect.height() * 0.5;
    if half <= f32::EPSILON {
        return 0.5;
    }
    let rel = pos - rect.center();
    (rel.dot(dir) / half) * 0.5 + 0.5
}

/// Inset frame border stroked with the angled gradient.
pub fn draw_frame_border(painter: &egui::Painter, screen: Rect, angle_deg: f32) {
    let rect = screen.shrink(BORDER_INSET);
    let t = BORDER_THICKNESS;

    let edges = [
        // (outer corner a, outer corner b) clockwise from top-left
        (rect.left_top(), rect.right_top(), egui::Vec2::new(0.0, t)),
        (rect.right_top(), rect.right_bottom(), egui::Vec2::new(-t, 0.0)),
        (rect.right_bottom(), rect.left_bottom(), egui::Vec2::new(0.0, -t)),
        (rect.left_bottom(), rect.left_top(), egui::Vec2::new(t, 0.0)),
    ];

    let mut mesh = egui::Mesh::default();
    for (a, b, inward) in edges {
        let base = mesh.vertices.len() as u32;
        for corner in [a, b, b + inward, a + inward] {
            mesh.vertices.push(egui::epaint::Vertex {
                pos: corner,
                uv: egui::epaint::WHITE_UV,
                color: gradient_color(gradient_t(corner, rect, angle_deg)),
            });
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    painter.add(egui::Shape::mesh(mesh));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_endpoints() {
        assert_eq!(gradient_color(0.0), GRADIENT_DARK);
        assert_eq!(gradient_color(0.5), ACCENT);
        assert_eq!(gradient_color(1.0), ACCENT_BRIGHT);
    }

    #[test]
    fn test_gradient_t_spans_rect_along_angle() {
        let rect = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(100.0, 100.0));

        // 180 degrees points down: top edge is 0, bottom edge is 1.
        let top = gradient_t(Pos2::new(50.0, 0.0), rect, 180.0);
        let bottom = gradient_t(Pos2::new(50.0, 100.0), rect, 180.0);
        assert!(top.abs() < 1e-4);
        assert!((bottom - 1.0).abs() < 1e-4);

        // 90 degrees points right.
        let left = gradient_t(Pos2::new(0.0, 50.0), rect, 90.0);
        let right = gradient_t(Pos2::new(100.0, 50.0), rect, 90.0);
        assert!(left.abs() < 1e-4);
        assert!((right - 1.0).abs() < 1e-4);
    }
}
