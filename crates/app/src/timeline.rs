use tracing::{debug, trace};
use wizard_state::gesture::{ScaleSample, ScrollOrigin, ScrollSample};

use crate::debounce::ScrollDecision;
use crate::playhead::PlayheadSource;
use crate::{PreviewEngine, ScrollRequest};

impl PreviewEngine {
    /// Feeds one scroll sample from the timeline scroller.
    pub fn on_scroll(&mut self, sample: ScrollSample) -> ScrollDecision {
        let Some(project) = self.project.clone() else {
            return ScrollDecision::Ignore;
        };
        if sample.origin == ScrollOrigin::User && !self.feedback.user_scrolling_enabled {
            return ScrollDecision::Ignore;
        }

        let duration_ms = project.compute_duration();
        let extent_px = self
            .mapper
            .extent(self.config.viewport_width_px, duration_ms);
        let decision = self.scroll.on_sample(sample, extent_px, duration_ms);
        match decision {
            ScrollDecision::Preview { time_ms } => {
                if self.try_set_playhead(time_ms, PlayheadSource::UserScroll) {
                    self.show_preview_frame();
                }
            }
            ScrollDecision::Settle { time_ms } => {
                self.try_set_playhead(time_ms, PlayheadSource::UserScroll);
                self.show_preview_frame();
            }
            ScrollDecision::Suppressed => trace!("fast scroll, preview skipped"),
            ScrollDecision::Ignore => {}
        }
        decision
    }

    /// Feeds one pinch sample. Returns the zoom level in effect afterwards.
    pub fn on_scale(&mut self, sample: ScaleSample) -> u32 {
        if self.project.is_none() {
            return self.mapper.zoom_level();
        }
        match self.scale.on_sample(sample) {
            Some(step) => self.zoom_timeline(self.mapper.zoom_level() as i64 + step, true),
            None => self.mapper.zoom_level(),
        }
    }

    pub fn on_zoom_bar(&mut self, level: u32) -> u32 {
        self.zoom_timeline(level as i64, false)
    }

    /// Applies `level` when it is within `[1, max_zoom]`; otherwise returns the
    /// current level unchanged. `sync_bar` moves the zoom bar to match.
    pub fn zoom_timeline(&mut self, level: i64, sync_bar: bool) -> u32 {
        let Some(project) = self.project.clone() else {
            return self.mapper.zoom_level();
        };
        if !self.mapper.is_valid_zoom(level) {
            return self.mapper.zoom_level();
        }
        let applied = self.mapper.set_zoom_level(level);
        project.set_zoom_level(applied);
        debug!(
            "zoom level {applied} -> {} px/s",
            self.time_to_offset(1000, project.compute_duration())
        );

        self.update_timeline_duration();
        if sync_bar {
            self.feedback.zoom_bar_level = applied;
        }
        applied
    }

    /// Resizes the timeline for the current duration and zoom, pulls the
    /// playhead back if the timeline got shorter, and recenters on it.
    pub fn update_timeline_duration(&mut self) {
        let Some(project) = self.project.clone() else {
            return;
        };
        let duration_ms = project.compute_duration();
        let viewport_px = self.config.viewport_width_px;
        self.feedback.timeline_width_px = viewport_px + self.mapper.extent(viewport_px, duration_ms);

        if project.playhead_pos() > duration_ms {
            self.move_playhead(duration_ms);
        }
        self.feedback.scroll_request = Some(ScrollRequest::To {
            offset_px: self.time_to_offset(project.playhead_pos(), duration_ms),
            smooth: true,
        });
    }

    /// Scroll issued by the timeline layout itself, e.g. to follow playback.
    pub fn request_scroll_by(&mut self, delta_px: i64, smooth: bool) {
        self.feedback.scroll_request = Some(ScrollRequest::By { delta_px, smooth });
    }
}
