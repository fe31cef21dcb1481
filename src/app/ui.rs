use std::time::Instant;

use crate::viewer::{PLAY_ALL_LABEL, ViewerLayout, ViewerShell};

/// Draws the control bar and the viewport captions.
///
/// `layout` is in logical points. Returns `true` when the play-all button
/// was clicked this frame.
pub fn draw(ctx: &egui::Context, shell: &ViewerShell, layout: &ViewerLayout, now: Instant) -> bool {
    let mut clicked = false;

    egui::Area::new(egui::Id::new("molview_controls"))
        .fixed_pos([layout.top_bar.x + 8.0, layout.top_bar.y + 6.0])
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                let enabled = shell.is_play_all_enabled(now);
                if ui
                    .add_enabled(enabled, egui::Button::new(PLAY_ALL_LABEL))
                    .clicked()
                {
                    clicked = true;
                }
                if shell.is_loading() {
                    ui.spinner();
                }
            });
        });

    for (index, (viewport, rect)) in shell.viewports().iter().zip(&layout.viewports).enumerate() {
        egui::Area::new(egui::Id::new(("molview_caption", index)))
            .fixed_pos([rect.x + 8.0, rect.y + 6.0])
            .interactable(false)
            .show(ctx, |ui| {
                let label = &viewport.config().label;
                if viewport.is_pending() {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(format!("{label}: loading"));
                    });
                } else if let Some(reason) = viewport.failure() {
                    ui.colored_label(egui::Color32::RED, format!("{label}: {reason}"));
                } else {
                    ui.label(label.as_str());
                }
            });
    }

    clicked
}
