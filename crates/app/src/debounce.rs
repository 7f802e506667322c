use wizard_state::gesture::{ScalePhase, ScaleSample, ScrollOrigin, ScrollPhase, ScrollSample};
use wizard_state::TimeMs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDecision {
    Ignore,
    /// Moving too fast to be worth a render.
    Suppressed,
    Preview { time_ms: TimeMs },
    /// The drag ended. Always rendered, regardless of speed.
    Settle { time_ms: TimeMs },
}

#[derive(Debug, Clone, Copy)]
struct ActiveDrag {
    extent_px: i64,
    duration_ms: TimeMs,
}

/// Turns a drag over the timeline into preview requests, skipping renders
/// while the drag outruns `threshold_px` per sample.
#[derive(Debug)]
pub struct ScrollDebouncer {
    threshold_px: i64,
    drag: Option<ActiveDrag>,
    last_offset_px: i64,
}

impl ScrollDebouncer {
    pub fn new(threshold_px: i64) -> Self {
        Self {
            threshold_px,
            drag: None,
            last_offset_px: 0,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// `extent_px` and `duration_ms` are captured at `Begin` and used for the whole drag.
    pub fn on_sample(
        &mut self,
        sample: ScrollSample,
        extent_px: i64,
        duration_ms: TimeMs,
    ) -> ScrollDecision {
        let user = sample.origin == ScrollOrigin::User;
        match sample.phase {
            ScrollPhase::Begin => {
                self.drag = (user && extent_px > 0).then_some(ActiveDrag {
                    extent_px,
                    duration_ms,
                });
                self.last_offset_px = sample.offset_px;
                ScrollDecision::Ignore
            }
            ScrollPhase::Progress => {
                let Some(drag) = self.drag.filter(|_| user) else {
                    return ScrollDecision::Ignore;
                };
                let delta = (self.last_offset_px - sample.offset_px).abs();
                if delta >= self.threshold_px {
                    return ScrollDecision::Suppressed;
                }
                self.last_offset_px = sample.offset_px;
                ScrollDecision::Preview {
                    time_ms: drag.time_at(sample.offset_px),
                }
            }
            ScrollPhase::End => {
                if !user {
                    return ScrollDecision::Ignore;
                }
                let Some(drag) = self.drag.take() else {
                    return ScrollDecision::Ignore;
                };
                self.last_offset_px = sample.offset_px;
                ScrollDecision::Settle {
                    time_ms: drag.time_at(sample.offset_px),
                }
            }
        }
    }

    pub fn cancel(&mut self) {
        self.drag = None;
    }
}

impl ActiveDrag {
    fn time_at(&self, offset_px: i64) -> TimeMs {
        let time = offset_px as i128 * self.duration_ms as i128 / self.extent_px as i128;
        (time as TimeMs).max(0)
    }
}

/// Saturating direction counter in `[-tolerance, tolerance]`. A zoom step only
/// fires while the counter has not swung to the opposite side, so a single
/// noisy sample cannot reverse a sustained pinch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleHysteresis {
    sign: i32,
    tolerance: i32,
}

impl ScaleHysteresis {
    pub fn new(tolerance: u32) -> Self {
        Self {
            sign: 0,
            tolerance: tolerance.max(1) as i32,
        }
    }

    pub fn sign(&self) -> i32 {
        self.sign
    }

    pub fn reset(&mut self) {
        self.sign = 0;
    }

    /// Records an inward sample. Returns whether it should zoom in.
    pub fn zoom_in(&mut self) -> bool {
        let fire = self.sign >= 0;
        if self.sign < self.tolerance {
            self.sign += 1;
        }
        fire
    }

    /// Records an outward sample. Returns whether it should zoom out.
    pub fn zoom_out(&mut self) -> bool {
        let fire = self.sign <= 0;
        if self.sign > -self.tolerance {
            self.sign -= 1;
        }
        fire
    }
}

#[derive(Debug)]
pub struct ScaleDebouncer {
    hysteresis: ScaleHysteresis,
    last_factor: f32,
    epsilon: f32,
    zoom_step: u32,
}

impl ScaleDebouncer {
    pub fn new(tolerance: u32, epsilon: f32, zoom_step: u32) -> Self {
        Self {
            hysteresis: ScaleHysteresis::new(tolerance),
            last_factor: 1.0,
            epsilon,
            zoom_step,
        }
    }

    pub fn hysteresis(&self) -> ScaleHysteresis {
        self.hysteresis
    }

    /// Returns the signed zoom-level change to apply, if any.
    pub fn on_sample(&mut self, sample: ScaleSample) -> Option<i64> {
        match sample.phase {
            ScalePhase::Begin => {
                self.hysteresis.reset();
                self.last_factor = 1.0;
                None
            }
            ScalePhase::End => None,
            ScalePhase::Scale => {
                let factor = sample.factor;
                let delta = factor - self.last_factor;
                self.last_factor = factor;
                if delta.abs() <= self.epsilon {
                    return None;
                }
                let step = self.zoom_step as i64;
                if factor < 1.0 {
                    self.hysteresis.zoom_out().then_some(-step)
                } else if factor > 1.0 {
                    self.hysteresis.zoom_in().then_some(step)
                } else {
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(offset: i64, phase: ScrollPhase) -> ScrollSample {
        ScrollSample::user(offset, phase)
    }

    #[test]
    fn slow_drag_previews_each_sample() {
        let mut scroll = ScrollDebouncer::new(100);
        assert_eq!(
            scroll.on_sample(user(0, ScrollPhase::Begin), 1200, 10_000),
            ScrollDecision::Ignore
        );
        assert_eq!(
            scroll.on_sample(user(60, ScrollPhase::Progress), 1200, 10_000),
            ScrollDecision::Preview { time_ms: 500 }
        );
        assert_eq!(
            scroll.on_sample(user(120, ScrollPhase::Progress), 1200, 10_000),
            ScrollDecision::Preview { time_ms: 1000 }
        );
    }

    #[test]
    fn fast_drag_is_measured_from_last_delivered_sample() {
        let mut scroll = ScrollDebouncer::new(100);
        scroll.on_sample(user(0, ScrollPhase::Begin), 1200, 10_000);
        assert_eq!(
            scroll.on_sample(user(150, ScrollPhase::Progress), 1200, 10_000),
            ScrollDecision::Suppressed
        );
        // Still 150px away from the last delivered offset (0).
        assert_eq!(
            scroll.on_sample(user(150, ScrollPhase::Progress), 1200, 10_000),
            ScrollDecision::Suppressed
        );
        assert_eq!(
            scroll.on_sample(user(60, ScrollPhase::Progress), 1200, 10_000),
            ScrollDecision::Preview { time_ms: 500 }
        );
    }

    #[test]
    fn end_always_settles() {
        let mut scroll = ScrollDebouncer::new(100);
        scroll.on_sample(user(0, ScrollPhase::Begin), 1200, 10_000);
        scroll.on_sample(user(500, ScrollPhase::Progress), 1200, 10_000);
        assert_eq!(
            scroll.on_sample(user(900, ScrollPhase::End), 1200, 10_000),
            ScrollDecision::Settle { time_ms: 7500 }
        );
        assert!(!scroll.is_dragging());
    }

    #[test]
    fn app_scrolls_are_ignored() {
        let mut scroll = ScrollDebouncer::new(100);
        let app_begin = ScrollSample::app(0, ScrollPhase::Begin);
        assert_eq!(
            scroll.on_sample(app_begin, 1200, 10_000),
            ScrollDecision::Ignore
        );
        assert_eq!(
            scroll.on_sample(ScrollSample::app(40, ScrollPhase::Progress), 1200, 10_000),
            ScrollDecision::Ignore
        );
        assert_eq!(
            scroll.on_sample(ScrollSample::app(80, ScrollPhase::End), 1200, 10_000),
            ScrollDecision::Ignore
        );
    }

    #[test]
    fn empty_timeline_never_previews() {
        let mut scroll = ScrollDebouncer::new(100);
        scroll.on_sample(user(0, ScrollPhase::Begin), 0, 0);
        assert_eq!(
            scroll.on_sample(user(10, ScrollPhase::Progress), 0, 0),
            ScrollDecision::Ignore
        );
        assert_eq!(
            scroll.on_sample(user(10, ScrollPhase::End), 0, 0),
            ScrollDecision::Ignore
        );
    }

    #[test]
    fn over_scroll_clamps_to_zero() {
        let mut scroll = ScrollDebouncer::new(100);
        scroll.on_sample(user(0, ScrollPhase::Begin), 1200, 10_000);
        assert_eq!(
            scroll.on_sample(user(-30, ScrollPhase::Progress), 1200, 10_000),
            ScrollDecision::Preview { time_ms: 0 }
        );
    }

    #[test]
    fn hysteresis_saturates_at_tolerance() {
        let mut h = ScaleHysteresis::new(3);
        for _ in 0..10 {
            assert!(h.zoom_in());
        }
        assert_eq!(h.sign(), 3);
        // Three opposite samples are absorbed, the fourth flips direction.
        assert!(!h.zoom_out());
        assert!(!h.zoom_out());
        assert!(!h.zoom_out());
        assert_eq!(h.sign(), 0);
        assert!(h.zoom_out());
        assert_eq!(h.sign(), -1);
    }

    #[test]
    fn alternating_noise_does_not_jitter() {
        let mut scale = ScaleDebouncer::new(3, 0.01, 2);
        scale.on_sample(ScaleSample::new(1.0, ScalePhase::Begin));
        let mut steps = Vec::new();
        for factor in [1.05, 1.10, 1.15, 1.20, 0.97, 1.22, 0.96, 1.25] {
            if let Some(step) = scale.on_sample(ScaleSample::new(factor, ScalePhase::Scale)) {
                steps.push(step);
            }
        }
        assert!(steps.iter().all(|&s| s == 2));
        assert_eq!(steps.len(), 6);
    }

    #[test]
    fn tiny_factor_changes_are_ignored() {
        let mut scale = ScaleDebouncer::new(3, 0.01, 2);
        scale.on_sample(ScaleSample::new(1.0, ScalePhase::Begin));
        assert_eq!(
            scale.on_sample(ScaleSample::new(1.005, ScalePhase::Scale)),
            None
        );
        assert_eq!(
            scale.on_sample(ScaleSample::new(0.9, ScalePhase::Scale)),
            Some(-2)
        );
    }

    #[test]
    fn begin_resets_direction() {
        let mut scale = ScaleDebouncer::new(3, 0.01, 2);
        scale.on_sample(ScaleSample::new(1.0, ScalePhase::Begin));
        for factor in [1.05, 1.10, 1.15, 1.20] {
            scale.on_sample(ScaleSample::new(factor, ScalePhase::Scale));
        }
        assert_eq!(scale.hysteresis().sign(), 3);
        scale.on_sample(ScaleSample::new(1.0, ScalePhase::End));
        scale.on_sample(ScaleSample::new(1.0, ScalePhase::Begin));
        assert_eq!(scale.hysteresis().sign(), 0);
        assert_eq!(
            scale.on_sample(ScaleSample::new(0.9, ScalePhase::Scale)),
            Some(-2)
        );
    }
}
