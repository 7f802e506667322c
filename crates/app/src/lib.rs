pub mod backend;
pub mod channel_polling;
pub mod config;
pub mod debounce;
pub mod error;
pub mod logging;
mod playback;
pub mod playhead;
mod preview;
pub mod request_queue;
pub mod session;
#[cfg(any(test, feature = "sim"))]
pub mod sim;
mod timeline;
pub mod workers;

use std::sync::Arc;

use tracing::{error, info};
use wizard_state::playback::{PlayIcon, PlaybackState};
use wizard_state::timestamp::format_timestamp;
use wizard_state::zoom::TimeMapper;
use wizard_state::TimeMs;

use crate::backend::{OutputTarget, ProjectModel};
use crate::channel_polling::{Inbox, Waker};
use crate::config::EngineConfig;
use crate::debounce::{ScaleDebouncer, ScrollDebouncer};
use crate::error::Result;
use crate::playhead::{PlayheadSource, PlayheadSync};
use crate::request_queue::RequestQueue;
use crate::session::PlaybackMachine;
use crate::workers::preview_worker::{PreviewWorker, WorkerLifecycle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollRequest {
    To { offset_px: i64, smooth: bool },
    By { delta_px: i64, smooth: bool },
}

/// Everything the timeline widgets need to redraw. The UI reads it after
/// [`PreviewEngine::poll`] and applies `scroll_request` as an app scroll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineFeedback {
    pub time_label: String,
    pub play_icon: PlayIcon,
    pub user_scrolling_enabled: bool,
    pub playback_in_progress: bool,
    pub timeline_width_px: i64,
    pub zoom_bar_level: u32,
    pub scroll_request: Option<ScrollRequest>,
}

impl Default for TimelineFeedback {
    fn default() -> Self {
        Self {
            time_label: format_timestamp(0),
            play_icon: PlayIcon::Play,
            user_scrolling_enabled: true,
            playback_in_progress: false,
            timeline_width_px: 0,
            zoom_bar_level: 1,
            scroll_request: None,
        }
    }
}

/// Decides which frame or playback session gets rendered, and keeps the
/// playhead and timeline feedback in step with it.
///
/// Lives on the controlling (UI) thread. Rendering happens on the preview
/// worker; results and playback progress come back through [`poll`](Self::poll).
pub struct PreviewEngine {
    config: EngineConfig,
    project: Option<Arc<dyn ProjectModel>>,
    queue: Arc<RequestQueue>,
    inbox: Inbox,
    worker: PreviewWorker,
    machine: PlaybackMachine,
    playhead: PlayheadSync,
    mapper: TimeMapper,
    scroll: ScrollDebouncer,
    scale: ScaleDebouncer,
    feedback: TimelineFeedback,
}

impl PreviewEngine {
    pub fn new(config: EngineConfig) -> Self {
        let queue = Arc::new(RequestQueue::new());
        let inbox = Inbox::new();
        let worker = PreviewWorker::new(queue.clone(), inbox.sender(), config.stop_timeout());
        Self {
            mapper: TimeMapper::new(config.max_zoom),
            scroll: ScrollDebouncer::new(config.fast_scroll_threshold_px),
            scale: ScaleDebouncer::new(
                config.scale_tolerance,
                config.scale_delta_epsilon,
                config.zoom_step,
            ),
            config,
            project: None,
            queue,
            inbox,
            worker,
            machine: PlaybackMachine::new(),
            playhead: PlayheadSync::new(),
            feedback: TimelineFeedback::default(),
        }
    }

    /// Called after each message posted to the engine, from the posting thread.
    /// An egui host passes `ctx.request_repaint()` here.
    pub fn set_waker(&self, waker: Option<Waker>) {
        self.inbox.set_waker(waker);
    }

    /// Starts rendering into `target`. After [`request_stop`](Self::request_stop)
    /// a fresh worker is created for the new target.
    pub fn start(&mut self, target: Arc<dyn OutputTarget>) -> Result<()> {
        if self.worker.lifecycle() == WorkerLifecycle::Stopped {
            self.worker = PreviewWorker::new(
                self.queue.clone(),
                self.inbox.sender(),
                self.config.stop_timeout(),
            );
        }
        self.worker.start(target)
    }

    /// Stops playback, then the worker. Blocks until no render call is in flight,
    /// bounded by the configured stop timeout.
    pub fn request_stop(&mut self) -> Result<()> {
        self.stop_playback();
        self.machine.reset();
        self.worker.request_stop()
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_running()
    }

    pub fn worker_lifecycle(&self) -> WorkerLifecycle {
        self.worker.lifecycle()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn project(&self) -> Option<&Arc<dyn ProjectModel>> {
        self.project.as_ref()
    }

    /// Makes `project` the one previewed. A session playing another project keeps
    /// running until the next playback request supersedes it.
    pub fn load_project(&mut self, project: Arc<dyn ProjectModel>) {
        info!("loading project {}", project.id());
        let level = self.mapper.set_zoom_level(project.zoom_level() as i64);
        project.set_zoom_level(level);
        self.feedback.zoom_bar_level = level;
        self.project = Some(project.clone());
        self.playhead.reset();

        self.update_timeline_duration();
        self.move_playhead(project.playhead_pos());
        self.show_preview_frame();
    }

    pub fn close_project(&mut self) {
        self.stop_playback();
        self.queue.clear();
        self.machine.reset();
        self.scroll.cancel();
        self.project = None;
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.machine.state()
    }

    pub fn is_playing(&self) -> bool {
        self.machine.is_playing()
    }

    pub fn playhead(&self) -> TimeMs {
        self.playhead.current()
    }

    pub fn zoom_level(&self) -> u32 {
        self.mapper.zoom_level()
    }

    pub fn feedback(&self) -> &TimelineFeedback {
        &self.feedback
    }

    pub fn take_scroll_request(&mut self) -> Option<ScrollRequest> {
        self.feedback.scroll_request.take()
    }

    pub fn pending_requests(&self) -> usize {
        self.queue.len()
    }

    /// The single way the playhead changes. Returns false, touching nothing,
    /// when the value is unchanged or outside `[0, duration]`.
    pub fn try_set_playhead(&mut self, time_ms: TimeMs, source: PlayheadSource) -> bool {
        let Some(project) = self.project.clone() else {
            return false;
        };
        let duration_ms = project.compute_duration();
        if !self.playhead.try_set(time_ms, duration_ms) {
            return false;
        }
        project.set_playhead_pos(time_ms);
        self.feedback.time_label = format_timestamp(time_ms);
        if source.recenters_viewport() {
            self.feedback.scroll_request = Some(ScrollRequest::To {
                offset_px: self.time_to_offset(time_ms, duration_ms),
                smooth: source == PlayheadSource::Seek,
            });
        }
        true
    }

    /// Programmatic seek: moves the playhead and recenters the timeline on it.
    pub fn move_playhead(&mut self, time_ms: TimeMs) -> bool {
        self.try_set_playhead(time_ms, PlayheadSource::Seek)
    }

    /// Where the playhead sits on the scrollable timeline at the current zoom.
    pub fn playhead_offset_px(&self) -> i64 {
        let duration_ms = self
            .project
            .as_ref()
            .map_or(0, |project| project.compute_duration());
        self.time_to_offset(self.playhead.current(), duration_ms)
    }

    fn is_loaded(&self, project: &Arc<dyn ProjectModel>) -> bool {
        self.project
            .as_ref()
            .is_some_and(|loaded| loaded.id() == project.id())
    }

    fn time_to_offset(&self, time_ms: TimeMs, duration_ms: TimeMs) -> i64 {
        self.mapper
            .time_to_offset(time_ms, self.config.viewport_width_px, duration_ms)
    }

    fn sync_playback_flags(&mut self) {
        let playing = self.machine.is_playing();
        self.feedback.play_icon = PlayIcon::for_state(self.machine.state());
        self.feedback.user_scrolling_enabled = !playing;
        self.feedback.playback_in_progress = playing;
        if playing {
            self.scroll.cancel();
        }
    }
}

impl Drop for PreviewEngine {
    fn drop(&mut self) {
        if self.worker.is_running() {
            if let Err(e) = self.request_stop() {
                error!("stopping preview engine on drop: {e}");
            }
        }
    }
}
