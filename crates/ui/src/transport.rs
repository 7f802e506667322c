use wizard_state::playback::PlayIcon;

use crate::constants::{TRANSPORT_BTN_SIZE, ZOOM_BAR_WIDTH};
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportAction {
    TogglePlay,
    Rewind,
    Previous,
    Next,
}

pub fn play_button_text(icon: PlayIcon) -> &'static str {
    match icon {
        PlayIcon::Play => "\u{25B6}",
        PlayIcon::Pause => "\u{23F8}",
    }
}

pub fn play_button_hover(icon: PlayIcon) -> &'static str {
    match icon {
        PlayIcon::Play => "Play",
        PlayIcon::Pause => "Pause",
    }
}

/// Rewind / previous / play-pause / next, followed by the time label.
/// `seek_enabled` greys out the seek buttons, e.g. while playing.
pub fn transport_bar(
    ui: &mut egui::Ui,
    icon: PlayIcon,
    time_label: &str,
    seek_enabled: bool,
) -> Option<TransportAction> {
    let mut action = None;
    let btn = TRANSPORT_BTN_SIZE;
    ui.horizontal(|ui| {
        let seek_buttons = [
            ("\u{23EE}", "Rewind", TransportAction::Rewind),
            ("\u{23EA}", "Previous item", TransportAction::Previous),
        ];
        for (label, hover, kind) in seek_buttons {
            if ui
                .add_enabled(seek_enabled, egui::Button::new(label).min_size(btn))
                .on_hover_text(hover)
                .clicked()
            {
                action = Some(kind);
            }
        }

        if ui
            .add_sized(btn, egui::Button::new(play_button_text(icon)))
            .on_hover_text(play_button_hover(icon))
            .clicked()
        {
            action = Some(TransportAction::TogglePlay);
        }

        if ui
            .add_enabled(seek_enabled, egui::Button::new("\u{23E9}").min_size(btn))
            .on_hover_text("Next item")
            .clicked()
        {
            action = Some(TransportAction::Next);
        }

        ui.add_space(8.0);
        ui.label(
            egui::RichText::new(time_label)
                .font(egui::FontId::monospace(12.0))
                .color(theme::TEXT_PRIMARY),
        );
    });
    action
}

/// Zoom slider. Returns the new level when the user moved it this frame.
pub fn zoom_bar(ui: &mut egui::Ui, level: u32, max_zoom: u32) -> Option<u32> {
    let mut value = level;
    let response = ui
        .scope(|ui| {
            ui.spacing_mut().slider_width = ZOOM_BAR_WIDTH;
            ui.add(
                egui::Slider::new(&mut value, 1..=max_zoom.max(1))
                    .show_value(false)
                    .text(egui::RichText::new("Zoom").color(theme::TEXT_DIM)),
            )
        })
        .inner;
    (response.changed() && value != level).then_some(value)
}
