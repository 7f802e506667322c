use crate::TimeMs;

pub const MIN_ZOOM: u32 = 1;
pub const DEFAULT_MAX_ZOOM: u32 = 60;

/// Pixel offset of `time_ms` on a timeline whose full duration spans
/// `viewport_width_px * zoom_level` pixels.
pub fn time_to_offset(
    time_ms: TimeMs,
    zoom_level: u32,
    viewport_width_px: i64,
    total_duration_ms: TimeMs,
) -> i64 {
    if total_duration_ms <= 0 || viewport_width_px <= 0 {
        return 0;
    }
    let scaled = time_ms as i128 * viewport_width_px as i128 * zoom_level as i128;
    (scaled / total_duration_ms as i128) as i64
}

pub fn offset_to_time(
    offset_px: i64,
    zoom_level: u32,
    viewport_width_px: i64,
    total_duration_ms: TimeMs,
) -> TimeMs {
    let extent = viewport_width_px as i128 * zoom_level as i128;
    if extent <= 0 || total_duration_ms <= 0 {
        return 0;
    }
    (offset_px as i128 * total_duration_ms as i128 / extent) as TimeMs
}

/// Holds the current zoom level and maps between time and pixels at that level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeMapper {
    zoom_level: u32,
    max_zoom: u32,
}

impl Default for TimeMapper {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ZOOM)
    }
}

impl TimeMapper {
    pub fn new(max_zoom: u32) -> Self {
        Self {
            zoom_level: MIN_ZOOM,
            max_zoom: max_zoom.max(MIN_ZOOM),
        }
    }

    pub fn zoom_level(&self) -> u32 {
        self.zoom_level
    }

    pub fn max_zoom(&self) -> u32 {
        self.max_zoom
    }

    pub fn is_valid_zoom(&self, level: i64) -> bool {
        level >= MIN_ZOOM as i64 && level <= self.max_zoom as i64
    }

    /// Applies `level` if it lies in `[MIN_ZOOM, max_zoom]`. Returns the level in
    /// effect afterwards, which is the previous one when `level` is rejected.
    pub fn set_zoom_level(&mut self, level: i64) -> u32 {
        if self.is_valid_zoom(level) {
            self.zoom_level = level as u32;
        }
        self.zoom_level
    }

    pub fn time_to_offset(
        &self,
        time_ms: TimeMs,
        viewport_width_px: i64,
        total_duration_ms: TimeMs,
    ) -> i64 {
        time_to_offset(time_ms, self.zoom_level, viewport_width_px, total_duration_ms)
    }

    pub fn offset_to_time(
        &self,
        offset_px: i64,
        viewport_width_px: i64,
        total_duration_ms: TimeMs,
    ) -> TimeMs {
        offset_to_time(offset_px, self.zoom_level, viewport_width_px, total_duration_ms)
    }

    /// Scrollable width of the timeline content, excluding the viewport padding.
    pub fn extent(&self, viewport_width_px: i64, total_duration_ms: TimeMs) -> i64 {
        self.time_to_offset(total_duration_ms, viewport_width_px, total_duration_ms)
    }
}
