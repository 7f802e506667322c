use tracing::{debug, info};
use wizard_state::TimeMs;

use crate::backend::PreviewParams;
use crate::request_queue::RenderRequest;
use crate::PreviewEngine;

impl PreviewEngine {
    /// Starts continuous playback of the loaded project from `from_ms`.
    ///
    /// Returns false when nothing was submitted: no project, no running worker,
    /// or the same project is already playing.
    pub fn submit_playback(&mut self, from_ms: TimeMs) -> bool {
        let Some(project) = self.project.clone() else {
            return false;
        };
        if !self.worker.is_running() {
            return false;
        }
        match self.machine.playing_project() {
            Some(id) if id == project.id() => {
                debug!("project {id} already playing");
                return false;
            }
            Some(_) => {
                self.stop_playback();
            }
            None => {}
        }

        let session = self.machine.start_session(project.clone(), from_ms);
        self.queue.playback_gate().open(session);
        self.sync_playback_flags();
        let params = PreviewParams {
            from_ms,
            duration_ms: None,
            looping: false,
            progress_interval_frames: self.config.progress_interval_frames,
        };
        let dropped = self.queue.submit(RenderRequest::StartPlayback {
            project,
            session,
            params,
        });
        info!("playback {session} requested from {from_ms}ms ({dropped} pending dropped)");
        true
    }

    /// Ends the current session and moves the playhead to where the backend
    /// actually stopped. Returns false when nothing was playing.
    ///
    /// A session the backend is still starting is left to the worker, which
    /// stops it as soon as `start_preview` returns.
    pub fn stop_playback(&mut self) -> bool {
        let Some(session) = self.machine.end_session() else {
            return false;
        };
        let cancelled = self.queue.cancel_pending_playback();
        if self.queue.playback_gate().close(session.id) {
            let stopped_at = session.project.stop_preview();
            info!("playback {} stopped at {stopped_at}ms", session.id);
            if self.is_loaded(&session.project) {
                self.move_playhead(stopped_at);
            }
        } else if cancelled {
            debug!("playback {} cancelled before it reached the backend", session.id);
        } else {
            debug!("playback {} stopped while the backend was starting it", session.id);
        }
        self.sync_playback_flags();
        true
    }

    /// Play/pause button. Playback only starts when there is something to play.
    pub fn toggle_playback(&mut self) -> bool {
        if self.machine.is_playing() {
            return self.stop_playback();
        }
        let Some(project) = self.project.clone() else {
            return false;
        };
        if project.media_item_count() == 0 {
            return false;
        }
        self.submit_playback(project.playhead_pos())
    }

    pub fn rewind(&mut self) {
        self.stop_playback();
        self.move_playhead(0);
        self.show_preview_frame();
    }

    /// Jumps to the start of the next media item, or to the end of the timeline.
    pub fn next_item(&mut self) {
        let Some(project) = self.project.clone() else {
            return;
        };
        self.stop_playback();
        let playhead = project.playhead_pos();
        let target = match project.next_media_item(playhead) {
            Some(item) => item.begin_ms,
            None => project.compute_duration(),
        };
        self.move_playhead(target);
        self.show_preview_frame();
    }

    /// Jumps to the start of the previous media item, or to 0.
    pub fn previous_item(&mut self) {
        let Some(project) = self.project.clone() else {
            return;
        };
        self.stop_playback();
        let playhead = project.playhead_pos();
        let target = project
            .previous_media_item(playhead)
            .map(|item| item.begin_ms)
            .unwrap_or(0);
        self.move_playhead(target);
        self.show_preview_frame();
    }
}
