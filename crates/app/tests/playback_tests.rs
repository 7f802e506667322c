//! Playback sessions end to end: start, progress, stop, failure.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::{
    count, poll_until, running_engine, settle, start_playing, ten_second_project, WAIT,
};
use wizard_app::backend::ProjectModel;
use wizard_app::sim::{BackendCall, SimulatedProject};
use wizard_state::playback::{PlayIcon, PlaybackState};

#[test]
fn playback_runs_to_the_end_and_lands_on_backend_stop_time() {
    let project = ten_second_project();
    let mut engine = running_engine(&project);

    start_playing(&mut engine, &project, 0);
    assert!(engine.is_playing());
    assert_eq!(engine.feedback().play_icon, PlayIcon::Pause);
    assert!(!engine.feedback().user_scrolling_enabled);

    for t in (100..10_000).step_by(100) {
        assert!(project.emit_progress(t, false));
    }
    assert!(project.emit_progress(9950, false));
    assert!(poll_until(&mut engine, |e| e.playhead() == 9950));

    assert!(project.emit_progress(10_000, true));
    assert!(poll_until(&mut engine, |e| !e.is_playing()));

    assert_eq!(engine.playhead(), 10_000);
    assert_eq!(engine.playback_state(), PlaybackState::Idle);
    assert_eq!(engine.feedback().play_icon, PlayIcon::Play);
    assert!(engine.feedback().user_scrolling_enabled);
    assert_eq!(engine.feedback().time_label, "0:10");
    assert!(!project.is_backend_playing());
}

#[test]
fn stop_uses_the_backend_time_not_the_last_tick() {
    let project = ten_second_project();
    let mut engine = running_engine(&project);
    start_playing(&mut engine, &project, 1000);

    project.emit_progress(3000, false);
    assert!(poll_until(&mut engine, |e| e.playhead() == 3000));

    project.set_stop_time(Some(3120));
    assert!(engine.stop_playback());
    assert_eq!(engine.playhead(), 3120);
    assert!(!engine.is_playing());
    assert!(project
        .calls()
        .contains(&BackendCall::StopPreview { stopped_at: 3120 }));

    // Nothing left to stop.
    assert!(!engine.stop_playback());
}

#[test]
fn starting_the_same_project_twice_is_a_no_op() {
    let project = ten_second_project();
    let mut engine = running_engine(&project);

    start_playing(&mut engine, &project, 0);
    assert!(!engine.submit_playback(0));
    assert!(!engine.submit_playback(500));
    settle(&mut engine);

    let starts = count(&project.calls(), |c| {
        matches!(c, BackendCall::StartPreview { .. })
    });
    assert_eq!(starts, 1);
    assert!(engine.is_playing());
}

#[test]
fn failed_start_rolls_back_to_idle() {
    let project = ten_second_project();
    let mut engine = running_engine(&project);

    project.fail_next_start();
    assert!(engine.submit_playback(0));
    assert!(engine.is_playing());

    assert!(poll_until(&mut engine, |e| !e.is_playing()));
    assert_eq!(engine.playback_state(), PlaybackState::Idle);
    assert_eq!(engine.feedback().play_icon, PlayIcon::Play);
    assert!(!engine.feedback().playback_in_progress);
    assert!(!project.is_backend_playing());

    // A later attempt goes through normally.
    start_playing(&mut engine, &project, 0);
    assert!(engine.is_playing());
}

#[test]
fn starting_at_the_very_end_fails_quietly() {
    let project = ten_second_project();
    let mut engine = running_engine(&project);

    assert!(engine.submit_playback(10_000));
    assert!(poll_until(&mut engine, |e| !e.is_playing()));
    assert_eq!(engine.playback_state(), PlaybackState::Idle);
}

#[test]
fn progress_ticks_do_not_recenter_the_timeline() {
    let project = ten_second_project();
    let mut engine = running_engine(&project);
    start_playing(&mut engine, &project, 0);
    engine.take_scroll_request();

    project.emit_progress(500, false);
    assert!(poll_until(&mut engine, |e| e.playhead() == 500));
    assert_eq!(engine.take_scroll_request(), None);
    assert_eq!(project.playhead_pos(), 500);
}

#[test]
fn frame_preview_while_playing_stops_playback_first() {
    let project = ten_second_project();
    let mut engine = running_engine(&project);
    start_playing(&mut engine, &project, 0);

    assert!(engine.submit_frame_preview(2000));
    assert!(!engine.is_playing());

    let calls_before_render = project.calls();
    assert!(calls_before_render
        .iter()
        .any(|c| matches!(c, BackendCall::StopPreview { .. })));
    assert!(project.wait_for_calls(Duration::from_secs(2), |calls| calls
        .contains(&BackendCall::RenderFrame { time_ms: 2000 })));
}

#[test]
fn stop_before_the_worker_picks_up_the_start_never_reaches_the_backend() {
    let project = ten_second_project();
    let mut engine = running_engine(&project);

    // Keep the worker busy so the start request stays queued.
    project.set_render_delay(Duration::from_millis(200));
    assert!(engine.submit_frame_preview(1000));
    assert!(project.wait_for_calls(Duration::from_secs(2), |calls| calls
        .contains(&BackendCall::RenderFrame { time_ms: 1000 })));
    assert!(engine.submit_playback(1000));
    assert!(engine.stop_playback());
    assert_eq!(engine.pending_requests(), 0);

    std::thread::sleep(Duration::from_millis(300));
    engine.poll();
    let calls = project.calls();
    assert_eq!(
        count(&calls, |c| matches!(c, BackendCall::StartPreview { .. })),
        0
    );
    assert_eq!(
        count(&calls, |c| matches!(c, BackendCall::StopPreview { .. })),
        0
    );
}

#[test]
fn toggle_needs_media_items() {
    let empty = Arc::new(SimulatedProject::new(5000));
    let mut engine = running_engine(&empty);
    assert!(!engine.toggle_playback());
    assert!(!engine.is_playing());

    let project = ten_second_project();
    engine.load_project(project.clone());
    assert!(engine.toggle_playback());
    assert!(engine.is_playing());
    assert!(engine.toggle_playback());
    assert!(!engine.is_playing());
}

#[test]
fn pausing_during_a_slow_start_leaves_the_next_session_playing() {
    let project = ten_second_project();
    project.set_start_delay(Duration::from_millis(150));
    let mut engine = running_engine(&project);

    assert!(engine.submit_playback(0));
    assert!(project.wait_for_calls(WAIT, |calls| calls
        .contains(&BackendCall::StartPreview { from_ms: 0 })));
    assert!(engine.stop_playback());
    assert!(engine.submit_playback(0));

    assert!(project.wait_for_calls(WAIT, |calls| {
        count(calls, |c| matches!(c, BackendCall::StartPreview { .. })) == 2
    }));
    assert!(poll_until(&mut engine, |_| project.is_backend_playing()));
    settle(&mut engine);
    assert!(engine.is_playing());

    let calls = project.calls();
    assert_eq!(
        &calls[calls.len() - 3..],
        &[
            BackendCall::StartPreview { from_ms: 0 },
            BackendCall::StopPreview { stopped_at: 0 },
            BackendCall::StartPreview { from_ms: 0 },
        ]
    );

    // Ticks from the second session still reach the playhead.
    assert!(project.emit_progress(700, false));
    assert!(poll_until(&mut engine, |e| e.playhead() == 700));
}

#[test]
fn shutting_down_during_a_slow_start_stops_the_backend() {
    let project = ten_second_project();
    project.set_start_delay(Duration::from_millis(150));
    let mut engine = running_engine(&project);

    assert!(engine.submit_playback(0));
    assert!(project.wait_for_calls(WAIT, |calls| calls
        .contains(&BackendCall::StartPreview { from_ms: 0 })));
    engine.request_stop().expect("stop");

    assert!(!engine.is_running());
    assert!(!engine.is_playing());
    assert!(!project.is_backend_playing());
    assert_eq!(
        project.calls().last(),
        Some(&BackendCall::StopPreview { stopped_at: 0 })
    );
}
