//! Shared setup for engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use wizard_app::config::EngineConfig;
use wizard_app::sim::{BackendCall, SimulatedProject, SimulatedSurface};
use wizard_app::PreviewEngine;
use wizard_state::media_item::MediaItemKind;
use wizard_state::playback::PlaybackState;

pub const WAIT: Duration = Duration::from_secs(2);

/// A 10 s project made of one video clip.
pub fn ten_second_project() -> Arc<SimulatedProject> {
    let project = Arc::new(SimulatedProject::new(0));
    project.add_item(MediaItemKind::VideoClip, 10_000);
    project
}

pub fn config() -> EngineConfig {
    EngineConfig {
        stop_timeout_ms: 1000,
        ..EngineConfig::default()
    }
}

/// Running engine with `project` loaded and its first frame rendered.
pub fn running_engine(project: &Arc<SimulatedProject>) -> PreviewEngine {
    let mut engine = PreviewEngine::new(config());
    engine
        .start(Arc::new(SimulatedSurface::new()))
        .expect("worker starts");
    engine.load_project(project.clone());
    assert!(
        poll_until(&mut engine, |e| e.playback_state() == PlaybackState::Idle),
        "initial frame never rendered"
    );
    engine
}

/// Polls the engine until `pred` holds or the wait runs out.
pub fn poll_until(engine: &mut PreviewEngine, pred: impl Fn(&PreviewEngine) -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    loop {
        engine.poll();
        if pred(engine) {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
}

/// Gives the worker a moment, then applies whatever it posted.
pub fn settle(engine: &mut PreviewEngine) {
    std::thread::sleep(Duration::from_millis(30));
    engine.poll();
}

/// Starts playback from `from_ms` and waits until the backend is playing.
pub fn start_playing(engine: &mut PreviewEngine, project: &SimulatedProject, from_ms: i64) {
    assert!(engine.submit_playback(from_ms));
    assert!(
        project.wait_for_calls(WAIT, |calls| calls
            .iter()
            .any(|c| matches!(c, BackendCall::StartPreview { .. }))),
        "backend never asked to start"
    );
    let deadline = Instant::now() + WAIT;
    while !project.is_backend_playing() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(1));
    }
    assert!(project.is_backend_playing());
    settle(engine);
}

pub fn count(calls: &[BackendCall], pred: impl Fn(&BackendCall) -> bool) -> usize {
    calls.iter().filter(|c| pred(c)).count()
}
