use std::sync::{Arc, Mutex, PoisonError};

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{info, warn};
use wizard_state::TimeMs;

use crate::playhead::PlayheadSource;
use crate::session::SessionId;
use crate::PreviewEngine;

/// Messages posted to the controlling thread from the worker or from the
/// backend's progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    FrameRendered { seq: u64 },
    PlaybackStarted { session: SessionId },
    PlaybackFailed { session: SessionId },
    Progress {
        session: SessionId,
        time_ms: TimeMs,
        end: bool,
    },
}

pub type Waker = Arc<dyn Fn() + Send + Sync>;

/// Sending half of the controlling thread's inbox. Cheap to clone and safe to
/// call from any thread.
#[derive(Clone)]
pub struct InboxSender {
    tx: Sender<ControlMessage>,
    waker: Arc<Mutex<Option<Waker>>>,
}

impl InboxSender {
    pub fn post(&self, message: ControlMessage) {
        if self.tx.send(message).is_err() {
            return;
        }
        let waker = self
            .waker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(wake) = waker {
            wake();
        }
    }
}

pub struct Inbox {
    sender: InboxSender,
    rx: Receiver<ControlMessage>,
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Inbox {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            sender: InboxSender {
                tx,
                waker: Arc::new(Mutex::new(None)),
            },
            rx,
        }
    }

    pub fn sender(&self) -> InboxSender {
        self.sender.clone()
    }

    pub fn set_waker(&self, waker: Option<Waker>) {
        *self
            .sender
            .waker
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = waker;
    }

    pub fn try_recv(&self) -> Option<ControlMessage> {
        self.rx.try_recv().ok()
    }
}

impl PreviewEngine {
    /// Applies everything the worker and backend posted since the last call.
    /// Call from the UI frame loop; returns true when feedback may have changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Some(message) = self.inbox.try_recv() {
            changed |= self.apply_message(message);
        }
        changed
    }

    fn apply_message(&mut self, message: ControlMessage) -> bool {
        match message {
            ControlMessage::FrameRendered { seq } => self.machine.frame_rendered(seq),
            ControlMessage::PlaybackStarted { session } => {
                if self.machine.is_current(session) {
                    info!("playback {session} started");
                }
                false
            }
            ControlMessage::PlaybackFailed { session } => {
                self.queue.playback_gate().close(session);
                let Some(aborted) = self.machine.abort_session(session) else {
                    return false;
                };
                warn!(
                    "playback {session} failed to start at {}ms; back to idle",
                    aborted.from_ms
                );
                self.sync_playback_flags();
                true
            }
            ControlMessage::Progress {
                session,
                time_ms,
                end,
            } => {
                if !self.machine.is_current(session) {
                    return false;
                }
                if end {
                    return self.stop_playback();
                }
                let loaded = self
                    .machine
                    .session()
                    .is_some_and(|s| self.is_loaded(&s.project));
                loaded && self.try_set_playhead(time_ms, PlayheadSource::PlaybackTick)
            }
        }
    }
}
