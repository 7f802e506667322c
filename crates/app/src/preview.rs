use tracing::{debug, trace};
use wizard_state::media_item::MediaItemId;
use wizard_state::TimeMs;

use crate::request_queue::RenderRequest;
use crate::PreviewEngine;

impl PreviewEngine {
    /// Asks for a single frame of the loaded project at `time_ms`. Supersedes
    /// any request still pending and stops playback first if it is running.
    pub fn submit_frame_preview(&mut self, time_ms: TimeMs) -> bool {
        let Some(project) = self.project.clone() else {
            return false;
        };
        if self.machine.is_playing() {
            self.stop_playback();
        }
        let seq = self.machine.begin_frame_preview();
        let clear_output = project.media_item_count() == 0;
        trace!("preview frame {seq} at {time_ms}ms (clear: {clear_output})");
        self.queue.submit(RenderRequest::PreviewFrame {
            project,
            at_time_ms: time_ms,
            clear_output,
            seq,
        });
        true
    }

    /// Like [`submit_frame_preview`](Self::submit_frame_preview), but renders
    /// one item in isolation at a time local to that item.
    pub fn submit_media_item_frame(&mut self, media_item: MediaItemId, local_time_ms: TimeMs) -> bool {
        let Some(project) = self.project.clone() else {
            return false;
        };
        if self.machine.is_playing() {
            self.stop_playback();
        }
        let seq = self.machine.begin_frame_preview();
        trace!("media item frame {seq} at {local_time_ms}ms");
        self.queue.submit(RenderRequest::MediaItemFrame {
            project,
            media_item,
            local_time_ms,
            seq,
        });
        true
    }

    /// Re-renders the frame under the playhead. Returns false when there is no
    /// running worker to render it.
    pub fn show_preview_frame(&mut self) -> bool {
        if !self.worker.is_running() {
            return false;
        }
        if self.project.is_some() && !self.machine.is_playing() {
            self.submit_frame_preview(self.playhead.current());
        }
        true
    }

    /// Live feedback while an item edge is dragged.
    pub fn on_trim_media_item(&mut self, media_item: MediaItemId, local_time_ms: TimeMs) {
        self.update_timeline_duration();
        let Some(project) = self.project.clone() else {
            return;
        };
        if !self.worker.is_running() || self.machine.is_playing() {
            return;
        }
        let Some(item) = project.media_item(media_item) else {
            debug!("trimmed media item is not in the project");
            return;
        };
        if item.is_video_clip() {
            if local_time_ms >= 0 {
                self.submit_media_item_frame(media_item, local_time_ms);
            }
        } else {
            self.submit_frame_preview(item.begin_ms + local_time_ms);
        }
    }

    pub fn on_trim_media_item_complete(&mut self) {
        self.show_preview_frame();
    }
}
