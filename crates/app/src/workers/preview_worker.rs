use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, select, Receiver, RecvTimeoutError, Sender, TryRecvError};
use tracing::{debug, error, info, info_span, warn};

use crate::backend::{OutputTarget, ProgressCallback, RenderStatus};
use crate::channel_polling::{ControlMessage, InboxSender};
use crate::error::{EngineError, Result};
use crate::request_queue::{RenderRequest, RequestQueue};

/// One-way lifecycle; a stopped worker is never restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerLifecycle {
    NotStarted,
    Running,
    Stopping,
    Stopped,
}

pub struct PreviewWorker {
    queue: Arc<RequestQueue>,
    inbox: InboxSender,
    stop_timeout: Duration,
    lifecycle: WorkerLifecycle,
    stop_tx: Option<Sender<()>>,
    exit_rx: Option<Receiver<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PreviewWorker {
    pub fn new(queue: Arc<RequestQueue>, inbox: InboxSender, stop_timeout: Duration) -> Self {
        Self {
            queue,
            inbox,
            stop_timeout,
            lifecycle: WorkerLifecycle::NotStarted,
            stop_tx: None,
            exit_rx: None,
            handle: None,
        }
    }

    pub fn lifecycle(&self) -> WorkerLifecycle {
        self.lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == WorkerLifecycle::Running
    }

    pub fn start(&mut self, target: Arc<dyn OutputTarget>) -> Result<()> {
        match self.lifecycle {
            WorkerLifecycle::NotStarted => {}
            WorkerLifecycle::Running => return Err(EngineError::AlreadyStarted),
            WorkerLifecycle::Stopping | WorkerLifecycle::Stopped => {
                return Err(EngineError::WorkerStopped)
            }
        }
        if !target.is_valid() {
            return Err(EngineError::InvalidOutputTarget);
        }

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let (exit_tx, exit_rx) = bounded::<()>(1);
        let queue = self.queue.clone();
        let inbox = self.inbox.clone();

        let handle = std::thread::Builder::new()
            .name("preview_worker".into())
            .spawn(move || {
                run_loop(&queue, target.as_ref(), &inbox, &stop_rx);
                drop(exit_tx);
            })?;

        self.stop_tx = Some(stop_tx);
        self.exit_rx = Some(exit_rx);
        self.handle = Some(handle);
        self.lifecycle = WorkerLifecycle::Running;
        info!("preview worker started");
        Ok(())
    }

    /// Signals the run loop, waits up to the stop timeout for it to exit, then
    /// drops anything still queued. Calling it again is a no-op.
    pub fn request_stop(&mut self) -> Result<()> {
        match self.lifecycle {
            WorkerLifecycle::Stopping | WorkerLifecycle::Stopped => return Ok(()),
            WorkerLifecycle::NotStarted => {
                self.lifecycle = WorkerLifecycle::Stopped;
                self.queue.clear();
                return Ok(());
            }
            WorkerLifecycle::Running => {}
        }

        self.lifecycle = WorkerLifecycle::Stopping;
        // Disconnecting the stop channel is the stop signal.
        self.stop_tx.take();

        let exited = match self.exit_rx.take() {
            Some(exit_rx) => match exit_rx.recv_timeout(self.stop_timeout) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
                Err(RecvTimeoutError::Timeout) => false,
            },
            None => true,
        };

        let result = if exited {
            match self.handle.take().map(JoinHandle::join) {
                Some(Err(_)) => {
                    error!("preview worker panicked");
                    Err(EngineError::WorkerPanicked)
                }
                _ => Ok(()),
            }
        } else {
            // The output target stays owned by the stuck thread.
            error!(
                "preview worker did not exit within {:?}; detaching it",
                self.stop_timeout
            );
            self.handle.take();
            Err(EngineError::WorkerUnresponsive {
                timeout: self.stop_timeout,
            })
        };

        let dropped = self.queue.clear();
        if dropped > 0 {
            debug!("dropped {dropped} queued request(s) on stop");
        }
        self.lifecycle = WorkerLifecycle::Stopped;
        info!("preview worker stopped");
        result
    }
}

impl Drop for PreviewWorker {
    fn drop(&mut self) {
        if self.lifecycle == WorkerLifecycle::Running {
            if let Err(e) = self.request_stop() {
                error!("stopping preview worker on drop: {e}");
            }
        }
    }
}

fn stop_requested(stop_rx: &Receiver<()>) -> bool {
    !matches!(stop_rx.try_recv(), Err(TryRecvError::Empty))
}

fn run_loop(
    queue: &RequestQueue,
    target: &dyn OutputTarget,
    inbox: &InboxSender,
    stop_rx: &Receiver<()>,
) {
    let _span = info_span!("preview_worker").entered();
    loop {
        select! {
            recv(stop_rx) -> _ => break,
            recv(queue.wake_signal()) -> woke => {
                if woke.is_err() {
                    break;
                }
            }
        }

        for request in queue.drain_all() {
            if stop_requested(stop_rx) {
                return;
            }
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                execute(request, queue, target, inbox);
            }));
            if outcome.is_err() {
                error!("render call panicked; clearing output");
                target.clear();
            }
        }
    }
}

fn execute(
    request: RenderRequest,
    queue: &RequestQueue,
    target: &dyn OutputTarget,
    inbox: &InboxSender,
) {
    match request {
        RenderRequest::PreviewFrame {
            project,
            at_time_ms,
            clear_output,
            seq,
        } => {
            debug!("preview frame at {at_time_ms} clear={clear_output}");
            let duration_ms = project.compute_duration();
            if clear_output {
                target.clear();
            } else if at_time_ms < 0 || at_time_ms > duration_ms {
                debug!("clear frame at {at_time_ms}: outside 0..={duration_ms}");
                target.clear();
            } else {
                match project.render_preview_frame(target, at_time_ms) {
                    Ok(RenderStatus::Rendered) => {}
                    Ok(RenderStatus::NoFrame) => {
                        debug!("clear frame at {at_time_ms} of {duration_ms}");
                        target.clear();
                    }
                    Err(e) => {
                        warn!("preview frame at {at_time_ms}: {e}");
                        target.clear();
                    }
                }
            }
            inbox.post(ControlMessage::FrameRendered { seq });
        }
        RenderRequest::MediaItemFrame {
            project,
            media_item,
            local_time_ms,
            seq,
        } => {
            debug!("render media item frame at {local_time_ms}");
            if local_time_ms < 0 {
                target.clear();
            } else {
                match project.render_media_item_frame(target, media_item, local_time_ms) {
                    Ok(RenderStatus::Rendered) => {}
                    Ok(RenderStatus::NoFrame) => target.clear(),
                    Err(e) => {
                        warn!("media item frame at {local_time_ms}: {e}");
                        target.clear();
                    }
                }
            }
            inbox.post(ControlMessage::FrameRendered { seq });
        }
        RenderRequest::StartPlayback {
            project,
            session,
            params,
        } => {
            let progress: ProgressCallback = {
                let inbox = inbox.clone();
                Arc::new(move |time_ms, end| {
                    inbox.post(ControlMessage::Progress {
                        session,
                        time_ms,
                        end,
                    })
                })
            };
            match project.start_preview(target, params, progress) {
                Ok(()) if queue.playback_gate().confirm(session) => {
                    inbox.post(ControlMessage::PlaybackStarted { session })
                }
                Ok(()) => {
                    // Stopped while the backend was still starting it.
                    let stopped_at = project.stop_preview();
                    debug!("playback {session} superseded; backend stopped at {stopped_at}ms");
                }
                Err(e) => {
                    // Common when starting at the very end of the timeline.
                    warn!("cannot start preview at {}: {e}", params.from_ms);
                    inbox.post(ControlMessage::PlaybackFailed { session });
                }
            }
        }
    }
}
