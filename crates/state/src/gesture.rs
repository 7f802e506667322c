/// Who moved the timeline. App scrolls come from the engine's own scroll
/// requests and never feed back into the playhead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOrigin {
    User,
    App,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPhase {
    Begin,
    Progress,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollSample {
    pub offset_px: i64,
    pub phase: ScrollPhase,
    pub origin: ScrollOrigin,
}

impl ScrollSample {
    pub fn user(offset_px: i64, phase: ScrollPhase) -> Self {
        Self {
            offset_px,
            phase,
            origin: ScrollOrigin::User,
        }
    }

    pub fn app(offset_px: i64, phase: ScrollPhase) -> Self {
        Self {
            offset_px,
            phase,
            origin: ScrollOrigin::App,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalePhase {
    Begin,
    Scale,
    End,
}

/// One pinch sample. `factor` is the current finger span over the span of the
/// previous sample: below 1.0 zooms out, above 1.0 zooms in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleSample {
    pub factor: f32,
    pub phase: ScalePhase,
}

impl ScaleSample {
    pub fn new(factor: f32, phase: ScalePhase) -> Self {
        Self { factor, phase }
    }
}
