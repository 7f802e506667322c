use egui::vec2;

pub const TRANSPORT_BTN_SIZE: egui::Vec2 = vec2(32.0, 26.0);
pub const ZOOM_BAR_WIDTH: f32 = 160.0;

/// Frames without scroll input before a scroll gesture counts as finished.
pub const SCROLL_END_FRAMES: u32 = 6;
/// Smaller per-frame scroll deltas are treated as no input.
pub const SCROLL_DEAD_ZONE: f32 = 0.1;
