//! Seams to the timeline model and the rendering backend behind it.
//!
//! The engine never decodes or composites anything itself. It decides *what*
//! to render and calls into [`ProjectModel`] from the preview worker; state
//! reads and playhead writes happen from the controlling thread.

use std::sync::Arc;

use wizard_state::media_item::{MediaItemId, MediaItemInfo};
use wizard_state::project::ProjectId;
use wizard_state::TimeMs;

use crate::error::BackendError;

/// Called by the backend from its own thread while playback runs.
/// Arguments are the current time and whether playback reached its end.
pub type ProgressCallback = Arc<dyn Fn(TimeMs, bool) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    Rendered,
    /// The backend had nothing to show at that time (negative status).
    NoFrame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewParams {
    pub from_ms: TimeMs,
    /// `None` plays to the end of the timeline.
    pub duration_ms: Option<TimeMs>,
    pub looping: bool,
    pub progress_interval_frames: u32,
}

/// Drawable surface owned by the preview worker.
pub trait OutputTarget: Send + Sync {
    fn is_valid(&self) -> bool;

    /// Puts the surface into its blank (black) state.
    fn clear(&self);
}

pub trait ProjectModel: Send + Sync {
    fn id(&self) -> ProjectId;

    fn compute_duration(&self) -> TimeMs;

    fn media_item_count(&self) -> usize;

    fn media_item(&self, id: MediaItemId) -> Option<MediaItemInfo>;

    /// First item starting strictly after `time_ms`.
    fn next_media_item(&self, time_ms: TimeMs) -> Option<MediaItemInfo>;

    /// Last item starting strictly before `time_ms`.
    fn previous_media_item(&self, time_ms: TimeMs) -> Option<MediaItemInfo>;

    fn playhead_pos(&self) -> TimeMs;

    fn set_playhead_pos(&self, time_ms: TimeMs);

    fn zoom_level(&self) -> u32;

    fn set_zoom_level(&self, level: u32);

    fn render_preview_frame(
        &self,
        target: &dyn OutputTarget,
        time_ms: TimeMs,
    ) -> Result<RenderStatus, BackendError>;

    fn render_media_item_frame(
        &self,
        target: &dyn OutputTarget,
        media_item: MediaItemId,
        local_time_ms: TimeMs,
    ) -> Result<RenderStatus, BackendError>;

    fn start_preview(
        &self,
        target: &dyn OutputTarget,
        params: PreviewParams,
        progress: ProgressCallback,
    ) -> Result<(), BackendError>;

    /// Stops continuous playback and returns where it actually stopped.
    fn stop_preview(&self) -> TimeMs;
}
