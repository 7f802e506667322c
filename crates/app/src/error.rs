use std::time::Duration;

use thiserror::Error;
use wizard_state::TimeMs;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("preview worker already started")]
    AlreadyStarted,

    #[error("preview worker was stopped and cannot be restarted")]
    WorkerStopped,

    #[error("output target is not valid")]
    InvalidOutputTarget,

    #[error("failed to spawn preview worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),

    #[error("preview worker did not exit within {timeout:?}")]
    WorkerUnresponsive { timeout: Duration },

    #[error("preview worker panicked")]
    WorkerPanicked,

    #[error("configuration error: {0}")]
    Config(String),
}

/// Failures reported by the rendering backend. These never reach UI callers;
/// the engine converts them into a cleared output or a reverted playback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("render failed: {0}")]
    Render(String),

    #[error("cannot start playback: {0}")]
    StartPlayback(String),

    #[error("time {time_ms}ms is outside the timeline")]
    OutOfRange { time_ms: TimeMs },
}

pub type Result<T> = std::result::Result<T, EngineError>;
