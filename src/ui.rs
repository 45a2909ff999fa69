use egui::Context;

use crate::model::Camera;
use crate::view::LightRig;

/// Directional light controls, mirroring the classic color / intensity /
/// target sliders.
pub fn draw_light_window(ctx: &Context, rig: &mut LightRig) {
    egui::Window::new("Light")
        .default_pos([8.0, 8.0])
        .default_size([180.0, 160.0])
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("color").small());
                ui.color_edit_button_rgb(&mut rig.sun_color);
            });
            ui.add(egui::Slider::new(&mut rig.sun_intensity, 0.0..=5.0).text("intensity"));
            ui.add(egui::Slider::new(&mut rig.sun_target.x, -10.0..=10.0).text("x"));
            ui.add(egui::Slider::new(&mut rig.sun_target.z, -10.0..=10.0).text("z"));
            ui.add(egui::Slider::new(&mut rig.sun_target.y, 0.0..=10.0).text("y"));
        });
}

pub fn draw_debug_window(ctx: &Context, camera: &Camera, model_status: &str) {
    egui::Window::new("Debug")
        .default_pos([8.0, 200.0])
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(format!(
                    "Eye: {:.2}, {:.2}, {:.2}",
                    camera.eye.x, camera.eye.y, camera.eye.z
                ))
                .small(),
            );
            ui.label(egui::RichText::new(format!("Model: {model_status}")).small());
            ui.separator();
            ui.label(egui::RichText::new("WASD - Move camera").small());
        });
}
