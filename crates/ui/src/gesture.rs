use wizard_state::gesture::{ScalePhase, ScaleSample, ScrollPhase, ScrollSample};

use crate::constants::{SCROLL_DEAD_ZONE, SCROLL_END_FRAMES};

/// Folds per-frame scroll deltas into Begin/Progress/End samples.
///
/// egui has no explicit end-of-fling event, so a gesture ends after
/// [`SCROLL_END_FRAMES`] quiet frames, or as soon as a pointer drag is released.
#[derive(Debug, Default)]
pub struct ScrollTracker {
    offset_px: f32,
    active: bool,
    quiet_frames: u32,
}

impl ScrollTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset_px(&self) -> i64 {
        self.offset_px.round() as i64
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// `delta_px` is how far the content moved this frame, positive to the left.
    pub fn feed(&mut self, delta_px: f32) -> Vec<ScrollSample> {
        let mut samples = Vec::new();
        if delta_px.abs() > SCROLL_DEAD_ZONE {
            if !self.active {
                self.active = true;
                samples.push(ScrollSample::user(self.offset_px(), ScrollPhase::Begin));
            }
            self.quiet_frames = 0;
            self.offset_px += delta_px;
            samples.push(ScrollSample::user(self.offset_px(), ScrollPhase::Progress));
        } else if self.active {
            self.quiet_frames += 1;
            if self.quiet_frames >= SCROLL_END_FRAMES {
                samples.extend(self.release());
            }
        }
        samples
    }

    pub fn release(&mut self) -> Option<ScrollSample> {
        if !self.active {
            return None;
        }
        self.active = false;
        self.quiet_frames = 0;
        Some(ScrollSample::user(self.offset_px(), ScrollPhase::End))
    }

    /// Scroll issued by the engine. Returned as an app-origin sample so it can
    /// be forwarded without being mistaken for the user scrubbing.
    pub fn app_scroll_to(&mut self, offset_px: i64) -> ScrollSample {
        self.offset_px = offset_px as f32;
        ScrollSample::app(offset_px, ScrollPhase::Progress)
    }

    pub fn app_scroll_by(&mut self, delta_px: i64) -> ScrollSample {
        self.app_scroll_to(self.offset_px() + delta_px)
    }
}

/// Turns egui's per-frame `zoom_delta` into pinch samples. egui already
/// reports each frame's span relative to the previous one.
#[derive(Debug, Default)]
pub struct ScaleTracker {
    active: bool,
    quiet_frames: u32,
}

impl ScaleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, zoom_delta: f32) -> Vec<ScaleSample> {
        let mut samples = Vec::new();
        if zoom_delta != 1.0 {
            if !self.active {
                self.active = true;
                samples.push(ScaleSample::new(1.0, ScalePhase::Begin));
            }
            self.quiet_frames = 0;
            samples.push(ScaleSample::new(zoom_delta, ScalePhase::Scale));
        } else if self.active {
            self.quiet_frames += 1;
            if self.quiet_frames >= SCROLL_END_FRAMES {
                self.active = false;
                self.quiet_frames = 0;
                samples.push(ScaleSample::new(1.0, ScalePhase::End));
            }
        }
        samples
    }
}

#[derive(Debug, Default)]
pub struct GestureSamples {
    pub scroll: Vec<ScrollSample>,
    pub scale: Vec<ScaleSample>,
}

/// Reads this frame's input over the timeline strip behind `response`.
/// Pinch and ctrl+wheel feed the scale tracker; wheel and drag feed scrolling.
pub fn timeline_gestures(
    ui: &egui::Ui,
    response: &egui::Response,
    scroll: &mut ScrollTracker,
    scale: &mut ScaleTracker,
) -> GestureSamples {
    let mut out = GestureSamples::default();
    let (wheel, zoom_delta) = ui.input(|i| (i.smooth_scroll_delta, i.zoom_delta()));
    let zoom_delta = if response.hovered() { zoom_delta } else { 1.0 };
    out.scale = scale.feed(zoom_delta);

    if response.drag_stopped() {
        out.scroll.extend(scroll.release());
        return out;
    }
    let delta = if response.dragged() {
        -response.drag_delta().x
    } else if response.hovered() && zoom_delta == 1.0 {
        let wheel = if wheel.x.abs() > SCROLL_DEAD_ZONE {
            wheel.x
        } else {
            wheel.y
        };
        -wheel
    } else {
        0.0
    };
    out.scroll = scroll.feed(delta);
    out
}

/// Allocates the rest of `ui` as a draggable timeline strip and reads its gestures.
pub fn timeline_strip(
    ui: &mut egui::Ui,
    scroll: &mut ScrollTracker,
    scale: &mut ScaleTracker,
) -> GestureSamples {
    let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
    timeline_gestures(ui, &response, scroll, scale)
}
