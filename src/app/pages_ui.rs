//! Rendering of the four page bodies.
//!
//! Pure presentation over `PageBundle` data; the shell applies the fade
//! opacity around these calls.

use eframe::egui::{self, RichText};

use super::nav::{ACCENT_BRIGHT, TEXT, TEXT_DIM};
use crate::pages::{PageBody, PageBundle};

/// Amber highlight for the award line.
const AWARD: egui::Color32 = egui::Color32::from_rgb(0xf5, 0x9e, 0x0b);

pub fn draw_page(ui: &mut egui::Ui, bundle: &PageBundle) {
    match &bundle.body {
        PageBody::Home { bio_lines } => draw_home(ui, bio_lines),
        PageBody::Projects(projects) => draw_projects(ui, projects),
        PageBody::Experience(roles) => draw_experience(ui, roles),
        PageBody::Contact {
            heading,
            tagline,
            links,
        } => draw_contact(ui, heading, tagline, links),
    }
}

fn draw_home(ui: &mut egui::Ui, bio_lines: &[&'static str]) {
    // Bio sits bottom-right so the sphere stays visible.
    ui.with_layout(egui::Layout::bottom_up(egui::Align::Max), |ui| {
        ui.add_space(24.0);
        for line in bio_lines.iter().rev() {
            ui.label(RichText::new(*line).size(14.0).color(TEXT));
        }
    });
}

fn draw_projects(ui: &mut egui::Ui, projects: &[crate::pages::ProjectEntry]) {
    ui.with_layout(egui::Layout::top_down(egui::Align::Max), |ui| {
        ui.set_max_width(700.0);
        egui::ScrollArea::vertical().show(ui, |ui| {
            for project in projects {
                let resp = ui
                    .scope(|ui| {
                        ui.label(RichText::new(project.title).size(24.0).color(TEXT));
                        ui.horizontal(|ui| {
                            ui.label(RichText::new(project.date).size(11.0).color(TEXT_DIM));
                            ui.label(RichText::new(project.role).size(11.0).color(TEXT_DIM));
                        });
                    })
                    .response
                    .interact(egui::Sense::click());

                if resp.hovered() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                }
                if resp.clicked()
                    && let Some(link) = project.link
                {
                    ui.ctx().open_url(egui::OpenUrl::new_tab(link));
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);
            }
        });
    });
}

fn draw_experience(ui: &mut egui::Ui, roles: &[crate::pages::ExperienceRole]) {
    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.set_max_width(760.0);
        for role in roles {
            ui.horizontal_top(|ui| {
                ui.allocate_ui(egui::vec2(170.0, 0.0), |ui| {
                    ui.label(RichText::new(role.date).size(12.0).color(ACCENT_BRIGHT));
                });
                ui.vertical(|ui| {
                    ui.label(RichText::new(role.title).size(18.0).color(TEXT));
                    ui.label(RichText::new(role.company).size(12.0).color(TEXT_DIM));
                    if let Some(award) = role.award {
                        ui.label(RichText::new(award).size(12.0).color(AWARD));
                    }
                    ui.add_space(2.0);
                    ui.label(RichText::new(role.description).size(13.0).color(TEXT_DIM));
                });
            });
            ui.add_space(18.0);
        }
    });
}

fn draw_contact(
    ui: &mut egui::Ui,
    heading: &str,
    tagline: &str,
    links: &[crate::pages::ContactLink],
) {
    ui.vertical(|ui| {
        ui.add_space(24.0);
        ui.label(RichText::new(heading).size(28.0).color(TEXT));
        ui.label(RichText::new(tagline).size(13.0).color(TEXT_DIM));
        ui.add_space(20.0);

        for link in links {
            let resp = ui.add(
                egui::Button::new(RichText::new(link.title).size(16.0).color(TEXT))
                    .frame(false),
            );
            if resp.hovered() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            }
            if resp.clicked() {
                ui.ctx().open_url(egui::OpenUrl::new_tab(link.href));
            }
            ui.add_space(6.0);
        }
    });
}
