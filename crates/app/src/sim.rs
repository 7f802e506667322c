//! In-process stand-in for the timeline model and rendering backend.
//!
//! Used by the `wizard-preview` binary and by tests. Playback progress is
//! either driven by a ticker thread (like a real backend) or pushed by hand
//! through [`SimulatedProject::emit_progress`] from any thread.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;
use wizard_state::media_item::{MediaItemId, MediaItemInfo, MediaItemKind};
use wizard_state::project::ProjectId;
use wizard_state::TimeMs;

use crate::backend::{OutputTarget, PreviewParams, ProgressCallback, ProjectModel, RenderStatus};
use crate::error::BackendError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCall {
    RenderFrame { time_ms: TimeMs },
    RenderMediaItemFrame { media_item: MediaItemId, local_time_ms: TimeMs },
    StartPreview { from_ms: TimeMs },
    StopPreview { stopped_at: TimeMs },
}

#[derive(Debug, Default)]
pub struct SimulatedSurface {
    invalid: AtomicBool,
    clears: AtomicUsize,
}

impl SimulatedSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&self) {
        self.invalid.store(true, Ordering::SeqCst);
    }

    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl OutputTarget for SimulatedSurface {
    fn is_valid(&self) -> bool {
        !self.invalid.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
struct Faults {
    fail_renders: bool,
    no_frame: bool,
    fail_next_start: bool,
    render_delay: Duration,
    start_delay: Duration,
    stop_time: Option<TimeMs>,
}

struct ActivePlayback {
    callback: ProgressCallback,
    ticker_stop: Option<Arc<AtomicBool>>,
}

pub struct SimulatedProject {
    id: ProjectId,
    duration_ms: AtomicI64,
    items: Mutex<Vec<MediaItemInfo>>,
    playhead_ms: AtomicI64,
    zoom_level: AtomicU32,
    position_ms: Arc<AtomicI64>,
    calls: Mutex<Vec<BackendCall>>,
    calls_changed: Condvar,
    faults: Mutex<Faults>,
    playback: Mutex<Option<ActivePlayback>>,
    renders_in_flight: AtomicUsize,
    auto_tick: Option<(Duration, TimeMs)>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SimulatedProject {
    pub fn new(duration_ms: TimeMs) -> Self {
        Self {
            id: ProjectId::new(),
            duration_ms: AtomicI64::new(duration_ms.max(0)),
            items: Mutex::new(Vec::new()),
            playhead_ms: AtomicI64::new(0),
            zoom_level: AtomicU32::new(1),
            position_ms: Arc::new(AtomicI64::new(0)),
            calls: Mutex::new(Vec::new()),
            calls_changed: Condvar::new(),
            faults: Mutex::new(Faults::default()),
            playback: Mutex::new(None),
            renders_in_flight: AtomicUsize::new(0),
            auto_tick: None,
        }
    }

    /// Emits a progress tick every `interval`, advancing by `step_ms`, until the end.
    pub fn with_auto_playback(mut self, interval: Duration, step_ms: TimeMs) -> Self {
        self.auto_tick = Some((interval, step_ms.max(1)));
        self
    }

    /// Appends an item at the current end of the timeline.
    pub fn add_item(&self, kind: MediaItemKind, duration_ms: TimeMs) -> MediaItemId {
        let mut items = lock(&self.items);
        let begin_ms = items.last().map(MediaItemInfo::end_ms).unwrap_or(0);
        let info = MediaItemInfo {
            id: MediaItemId::new(),
            kind,
            begin_ms,
            duration_ms,
        };
        items.push(info);
        self.duration_ms.store(info.end_ms(), Ordering::SeqCst);
        info.id
    }

    pub fn set_duration(&self, duration_ms: TimeMs) {
        self.duration_ms.store(duration_ms.max(0), Ordering::SeqCst);
    }

    pub fn fail_renders(&self, fail: bool) {
        lock(&self.faults).fail_renders = fail;
    }

    pub fn report_no_frame(&self, no_frame: bool) {
        lock(&self.faults).no_frame = no_frame;
    }

    pub fn fail_next_start(&self) {
        lock(&self.faults).fail_next_start = true;
    }

    pub fn set_render_delay(&self, delay: Duration) {
        lock(&self.faults).render_delay = delay;
    }

    /// Makes `start_preview` block this long before it takes effect.
    pub fn set_start_delay(&self, delay: Duration) {
        lock(&self.faults).start_delay = delay;
    }

    /// Forces the time reported by the next `stop_preview`.
    pub fn set_stop_time(&self, stop_time: Option<TimeMs>) {
        lock(&self.faults).stop_time = stop_time;
    }

    pub fn is_backend_playing(&self) -> bool {
        lock(&self.playback).is_some()
    }

    pub fn renders_in_flight(&self) -> usize {
        self.renders_in_flight.load(Ordering::SeqCst)
    }

    /// Delivers a progress tick on the calling thread, as a backend would.
    /// Returns false when nothing is playing.
    pub fn emit_progress(&self, time_ms: TimeMs, end: bool) -> bool {
        let callback = match lock(&self.playback).as_ref() {
            Some(active) => active.callback.clone(),
            None => return false,
        };
        self.position_ms.store(time_ms, Ordering::SeqCst);
        callback(time_ms, end);
        true
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        lock(&self.calls).clone()
    }

    pub fn frame_renders(&self) -> Vec<TimeMs> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                BackendCall::RenderFrame { time_ms } => Some(*time_ms),
                _ => None,
            })
            .collect()
    }

    /// Blocks until `pred` holds for the recorded calls or `timeout` passes.
    pub fn wait_for_calls(
        &self,
        timeout: Duration,
        pred: impl Fn(&[BackendCall]) -> bool,
    ) -> bool {
        let deadline = Instant::now() + timeout;
        let mut calls = lock(&self.calls);
        loop {
            if pred(&calls) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            calls = self
                .calls_changed
                .wait_timeout(calls, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    fn record(&self, call: BackendCall) {
        lock(&self.calls).push(call);
        self.calls_changed.notify_all();
    }

    fn render_common(
        &self,
        target: &dyn OutputTarget,
        call: BackendCall,
    ) -> Result<RenderStatus, BackendError> {
        self.renders_in_flight.fetch_add(1, Ordering::SeqCst);
        self.record(call);
        let (delay, fail, no_frame) = {
            let faults = lock(&self.faults);
            (faults.render_delay, faults.fail_renders, faults.no_frame)
        };
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        self.renders_in_flight.fetch_sub(1, Ordering::SeqCst);

        if fail {
            return Err(BackendError::Render("injected failure".into()));
        }
        if !target.is_valid() {
            return Err(BackendError::Render("surface is gone".into()));
        }
        if no_frame {
            return Ok(RenderStatus::NoFrame);
        }
        Ok(RenderStatus::Rendered)
    }

    fn spawn_ticker(&self, from_ms: TimeMs, callback: ProgressCallback) -> Option<Arc<AtomicBool>> {
        let (interval, step_ms) = self.auto_tick?;
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let position = self.position_ms.clone();
        let duration_ms = self.compute_duration();
        let spawned = std::thread::Builder::new()
            .name("sim_playback".into())
            .spawn(move || {
                let mut time_ms = from_ms;
                loop {
                    std::thread::sleep(interval);
                    if stop_flag.load(Ordering::SeqCst) {
                        return;
                    }
                    time_ms = (time_ms + step_ms).min(duration_ms);
                    position.store(time_ms, Ordering::SeqCst);
                    let end = time_ms >= duration_ms;
                    callback(time_ms, end);
                    if end {
                        return;
                    }
                }
            });
        match spawned {
            Ok(_) => Some(stop),
            Err(e) => {
                debug!("sim ticker not started: {e}");
                None
            }
        }
    }
}

impl ProjectModel for SimulatedProject {
    fn id(&self) -> ProjectId {
        self.id
    }

    fn compute_duration(&self) -> TimeMs {
        self.duration_ms.load(Ordering::SeqCst)
    }

    fn media_item_count(&self) -> usize {
        lock(&self.items).len()
    }

    fn media_item(&self, id: MediaItemId) -> Option<MediaItemInfo> {
        lock(&self.items).iter().find(|item| item.id == id).copied()
    }

    fn next_media_item(&self, time_ms: TimeMs) -> Option<MediaItemInfo> {
        lock(&self.items)
            .iter()
            .find(|item| item.begin_ms > time_ms)
            .copied()
    }

    fn previous_media_item(&self, time_ms: TimeMs) -> Option<MediaItemInfo> {
        lock(&self.items)
            .iter()
            .rev()
            .find(|item| item.begin_ms < time_ms)
            .copied()
    }

    fn playhead_pos(&self) -> TimeMs {
        self.playhead_ms.load(Ordering::SeqCst)
    }

    fn set_playhead_pos(&self, time_ms: TimeMs) {
        self.playhead_ms.store(time_ms, Ordering::SeqCst);
    }

    fn zoom_level(&self) -> u32 {
        self.zoom_level.load(Ordering::SeqCst)
    }

    fn set_zoom_level(&self, level: u32) {
        self.zoom_level.store(level, Ordering::SeqCst);
    }

    fn render_preview_frame(
        &self,
        target: &dyn OutputTarget,
        time_ms: TimeMs,
    ) -> Result<RenderStatus, BackendError> {
        self.render_common(target, BackendCall::RenderFrame { time_ms })
    }

    fn render_media_item_frame(
        &self,
        target: &dyn OutputTarget,
        media_item: MediaItemId,
        local_time_ms: TimeMs,
    ) -> Result<RenderStatus, BackendError> {
        self.render_common(
            target,
            BackendCall::RenderMediaItemFrame {
                media_item,
                local_time_ms,
            },
        )
    }

    fn start_preview(
        &self,
        _target: &dyn OutputTarget,
        params: PreviewParams,
        progress: ProgressCallback,
    ) -> Result<(), BackendError> {
        self.record(BackendCall::StartPreview {
            from_ms: params.from_ms,
        });
        let delay = {
            let mut faults = lock(&self.faults);
            if faults.fail_next_start {
                faults.fail_next_start = false;
                return Err(BackendError::StartPlayback("injected failure".into()));
            }
            faults.start_delay
        };
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        let duration_ms = self.compute_duration();
        if params.from_ms < 0 || (duration_ms > 0 && params.from_ms >= duration_ms) {
            return Err(BackendError::OutOfRange {
                time_ms: params.from_ms,
            });
        }

        self.position_ms.store(params.from_ms, Ordering::SeqCst);
        let ticker_stop = self.spawn_ticker(params.from_ms, progress.clone());
        *lock(&self.playback) = Some(ActivePlayback {
            callback: progress,
            ticker_stop,
        });
        Ok(())
    }

    fn stop_preview(&self) -> TimeMs {
        if let Some(active) = lock(&self.playback).take() {
            if let Some(stop) = active.ticker_stop {
                stop.store(true, Ordering::SeqCst);
            }
        }
        let stopped_at = lock(&self.faults)
            .stop_time
            .take()
            .unwrap_or_else(|| self.position_ms.load(Ordering::SeqCst));
        self.record(BackendCall::StopPreview { stopped_at });
        stopped_at
    }
}
