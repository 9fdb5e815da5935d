use egui::Context;

use crate::controller::Hud;

/// Lays out the overlay for one frame: status window, optional banner, controls and,
/// while the pointer is captured, a crosshair.
pub fn build_hud(ctx: &Context, hud: &Hud, fps: f32, pointer_locked: bool) {
    draw_status_window(ctx, hud, fps);
    if let Some(banner) = &hud.banner {
        draw_banner(ctx, banner);
    }
    if !hud.controls.is_empty() {
        draw_controls_window(ctx, &hud.controls);
    }
    if pointer_locked {
        draw_crosshair(ctx);
    }
}

pub fn fps_label(fps: f32) -> String {
    format!("FPS: {:.0}", fps.max(0.0))
}

fn draw_status_window(ctx: &Context, hud: &Hud, fps: f32) {
    egui::Window::new(hud.heading.as_str())
        .id(egui::Id::new("status"))
        .default_pos([8.0, 8.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(fps_label(fps)).small());
            for line in &hud.lines {
                ui.label(egui::RichText::new(line).small());
            }
        });
}

fn draw_banner(ctx: &Context, text: &str) {
    egui::Area::new(egui::Id::new("banner"))
        .anchor(egui::Align2::CENTER_TOP, [0.0, 48.0])
        .show(ctx, |ui| {
            egui::Frame::NONE
                .fill(egui::Color32::from_black_alpha(160))
                .inner_margin(12.0)
                .corner_radius(6.0)
                .show(ui, |ui| {
                    ui.label(
                        egui::RichText::new(text)
                            .size(28.0)
                            .strong()
                            .color(egui::Color32::from_rgb(255, 220, 120)),
                    );
                });
        });
}

fn draw_controls_window(ctx: &Context, controls: &[(&'static str, &'static str)]) {
    egui::Window::new("Controls")
        .anchor(egui::Align2::RIGHT_TOP, [-8.0, 8.0])
        .default_open(true)
        .resizable(false)
        .show(ctx, |ui| {
            egui::Grid::new("controls_grid").num_columns(2).show(ui, |ui| {
                for (key, action) in controls {
                    ui.label(egui::RichText::new(*key).small().strong());
                    ui.label(egui::RichText::new(*action).small());
                    ui.end_row();
                }
            });
        });
}

fn draw_crosshair(ctx: &Context) {
    let painter = ctx.layer_painter(egui::LayerId::new(egui::Order::Foreground, egui::Id::new("crosshair")));
    let center = ctx.available_rect().center();
    let size = 8.0;
    let stroke = egui::Stroke::new(1.0, egui::Color32::WHITE);
    painter.line_segment(
        [egui::pos2(center.x - size, center.y), egui::pos2(center.x + size, center.y)],
        stroke,
    );
    painter.line_segment(
        [egui::pos2(center.x, center.y - size), egui::pos2(center.x, center.y + size)],
        stroke,
    );
}
