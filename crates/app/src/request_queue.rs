use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossbeam_channel::{bounded, Receiver, Sender};
use wizard_state::media_item::MediaItemId;
use wizard_state::TimeMs;

use crate::backend::{PreviewParams, ProjectModel};
use crate::session::SessionId;

pub enum RenderRequest {
    PreviewFrame {
        project: Arc<dyn ProjectModel>,
        at_time_ms: TimeMs,
        clear_output: bool,
        seq: u64,
    },
    MediaItemFrame {
        project: Arc<dyn ProjectModel>,
        media_item: MediaItemId,
        local_time_ms: TimeMs,
        seq: u64,
    },
    StartPlayback {
        project: Arc<dyn ProjectModel>,
        session: SessionId,
        params: PreviewParams,
    },
}

impl RenderRequest {
    pub fn is_playback(&self) -> bool {
        matches!(self, RenderRequest::StartPlayback { .. })
    }
}

impl std::fmt::Debug for RenderRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderRequest::PreviewFrame {
                project,
                at_time_ms,
                clear_output,
                seq,
            } => f
                .debug_struct("PreviewFrame")
                .field("project", &project.id())
                .field("at_time_ms", at_time_ms)
                .field("clear_output", clear_output)
                .field("seq", seq)
                .finish(),
            RenderRequest::MediaItemFrame {
                project,
                media_item,
                local_time_ms,
                seq,
            } => f
                .debug_struct("MediaItemFrame")
                .field("project", &project.id())
                .field("media_item", media_item)
                .field("local_time_ms", local_time_ms)
                .field("seq", seq)
                .finish(),
            RenderRequest::StartPlayback {
                project,
                session,
                params,
            } => f
                .debug_struct("StartPlayback")
                .field("project", &project.id())
                .field("session", session)
                .field("params", params)
                .finish(),
        }
    }
}

#[derive(Debug, Default)]
struct GateState {
    wanted: Option<SessionId>,
    started: bool,
}

/// The playback session the controlling thread still wants, shared with the
/// worker. Whoever sees a started session closed is the one that stops it:
/// the controlling thread when the start was confirmed first, otherwise the
/// worker right after `start_preview` returns.
#[derive(Debug, Default)]
pub struct PlaybackGate {
    state: Mutex<GateState>,
}

impl PlaybackGate {
    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn open(&self, session: SessionId) {
        *self.lock() = GateState {
            wanted: Some(session),
            started: false,
        };
    }

    /// Called by the worker once the backend accepted `session`. False when the
    /// session was closed meanwhile; the backend must then be stopped by the caller.
    pub fn confirm(&self, session: SessionId) -> bool {
        let mut state = self.lock();
        if state.wanted == Some(session) {
            state.started = true;
            true
        } else {
            false
        }
    }

    /// Closes `session`. True when the backend is already playing it and the
    /// caller has to stop it; other sessions are left alone.
    pub fn close(&self, session: SessionId) -> bool {
        let mut state = self.lock();
        if state.wanted != Some(session) {
            return false;
        }
        let started = state.started;
        *state = GateState::default();
        started
    }

    pub fn wanted(&self) -> Option<SessionId> {
        self.lock().wanted
    }
}

/// Latest-wins queue between the controlling thread and the preview worker.
///
/// Every submission drops whatever is still pending, so a burst of scrub
/// requests collapses to the newest one. The lock is only held for the
/// clear/push or the drain itself, never across a render call.
pub struct RequestQueue {
    pending: Mutex<VecDeque<RenderRequest>>,
    playback: PlaybackGate,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
}

impl Default for RequestQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestQueue {
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = bounded(1);
        Self {
            pending: Mutex::new(VecDeque::new()),
            playback: PlaybackGate::default(),
            wake_tx,
            wake_rx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<RenderRequest>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces all pending requests with `request`. Returns how many were dropped.
    pub fn submit(&self, request: RenderRequest) -> usize {
        let dropped = {
            let mut pending = self.lock();
            let dropped = pending.len();
            pending.clear();
            pending.push_back(request);
            dropped
        };
        // A full wake slot already guarantees the worker will drain again.
        let _ = self.wake_tx.try_send(());
        dropped
    }

    /// Takes every pending request in submission order.
    pub fn drain_all(&self) -> Vec<RenderRequest> {
        self.lock().drain(..).collect()
    }

    pub fn clear(&self) -> usize {
        let mut pending = self.lock();
        let dropped = pending.len();
        pending.clear();
        dropped
    }

    /// Drops a pending `StartPlayback`, leaving frame requests alone.
    pub fn cancel_pending_playback(&self) -> bool {
        let mut pending = self.lock();
        let before = pending.len();
        pending.retain(|req| !req.is_playback());
        pending.len() != before
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn playback_gate(&self) -> &PlaybackGate {
        &self.playback
    }

    pub(crate) fn wake_signal(&self) -> &Receiver<()> {
        &self.wake_rx
    }
}
