use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use wizard_app::config::EngineConfig;
use wizard_app::sim::{SimulatedProject, SimulatedSurface};
use wizard_app::{PreviewEngine, ScrollRequest};
use wizard_state::media_item::MediaItemKind;
use wizard_ui::constants::SCROLL_END_FRAMES;
use wizard_ui::gesture::{timeline_strip, GestureSamples, ScaleTracker, ScrollTracker};
use wizard_ui::transport::{transport_bar, zoom_bar, TransportAction};

/// Drives the preview engine against a simulated backend: scrub, pinch, play.
#[derive(Parser, Debug)]
#[command(name = "wizard-preview")]
#[command(version)]
struct Args {
    /// TOML file with engine settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, default_value = "wizard_app=debug")]
    log: String,

    /// Length of each of the three simulated clips
    #[arg(long, default_value_t = 4000)]
    clip_ms: i64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    wizard_app::logging::init(Some(&args.log));

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let project = Arc::new(
        SimulatedProject::new(0).with_auto_playback(Duration::from_millis(40), 250),
    );
    project.add_item(MediaItemKind::VideoClip, args.clip_ms);
    project.add_item(MediaItemKind::Image, args.clip_ms);
    project.add_item(MediaItemKind::VideoClip, args.clip_ms);

    let mut engine = PreviewEngine::new(config);
    engine
        .start(Arc::new(SimulatedSurface::new()))
        .context("starting preview worker")?;
    engine.load_project(project.clone());

    let mut scroll = ScrollTracker::new();
    info!("scrubbing");
    for delta in std::iter::repeat(40.0).take(15).chain([300.0]) {
        for sample in scroll.feed(delta) {
            engine.on_scroll(sample);
        }
        frame(&mut engine, &mut scroll, Duration::from_millis(16));
    }
    if let Some(end) = scroll.release() {
        engine.on_scroll(end);
    }
    frame(&mut engine, &mut scroll, Duration::from_millis(200));

    info!("pinching");
    let ctx = egui::Context::default();
    let mut scale = ScaleTracker::new();
    let hover = vec![egui::Event::PointerMoved(egui::pos2(400.0, 60.0))];
    let pinch = [1.05, 1.08, 0.99, 1.06].map(|factor| vec![egui::Event::Zoom(factor)]);
    let quiet = std::iter::repeat_with(Vec::new).take(SCROLL_END_FRAMES as usize);
    for events in std::iter::once(hover).chain(pinch).chain(quiet) {
        let samples = gesture_frame(&ctx, events, &mut scroll, &mut scale);
        for sample in samples.scale {
            engine.on_scale(sample);
        }
        for sample in samples.scroll {
            engine.on_scroll(sample);
        }
    }
    info!("zoom level now {}", engine.zoom_level());
    if let Some(action) = draw_transport(&engine) {
        info!("transport action {action:?}");
    }

    info!("playing");
    engine.previous_item();
    engine.toggle_playback();
    let deadline = Instant::now() + Duration::from_secs(30);
    while engine.is_playing() && Instant::now() < deadline {
        // Follow playback the way the timeline layout does, by relative scrolls.
        let behind = engine.playhead_offset_px() - scroll.offset_px();
        if behind != 0 {
            engine.request_scroll_by(behind, false);
        }
        frame(&mut engine, &mut scroll, Duration::from_millis(50));
    }
    info!(
        "playback finished at {} ({} backend calls)",
        engine.feedback().time_label,
        project.calls().len()
    );

    engine.request_stop().context("stopping preview worker")?;
    Ok(())
}

/// One host frame: apply what the worker posted, then any scroll the engine asked for.
fn frame(engine: &mut PreviewEngine, scroll: &mut ScrollTracker, wait: Duration) {
    std::thread::sleep(wait);
    engine.poll();
    let sample = match engine.take_scroll_request() {
        Some(ScrollRequest::To { offset_px, .. }) => scroll.app_scroll_to(offset_px),
        Some(ScrollRequest::By { delta_px, .. }) => scroll.app_scroll_by(delta_px),
        None => return,
    };
    engine.on_scroll(sample);
}

/// Runs one egui frame without a window over a full-width timeline strip.
fn gesture_frame(
    ctx: &egui::Context,
    events: Vec<egui::Event>,
    scroll: &mut ScrollTracker,
    scale: &mut ScaleTracker,
) -> GestureSamples {
    let input = egui::RawInput {
        screen_rect: Some(egui::Rect::from_min_size(
            egui::Pos2::ZERO,
            egui::vec2(1200.0, 120.0),
        )),
        events,
        ..Default::default()
    };
    let mut samples = GestureSamples::default();
    let _ = ctx.run(input, |ctx| {
        egui::CentralPanel::default().show(ctx, |ui| {
            samples = timeline_strip(ui, scroll, scale);
        });
    });
    samples
}

/// Lays out the transport bar once without a window, as a host would each frame.
fn draw_transport(engine: &PreviewEngine) -> Option<TransportAction> {
    let feedback = engine.feedback();
    let ctx = egui::Context::default();
    let mut action = None;
    let _ = ctx.run(egui::RawInput::default(), |ctx| {
        egui::CentralPanel::default().show(ctx, |ui| {
            action = transport_bar(
                ui,
                feedback.play_icon,
                &feedback.time_label,
                feedback.user_scrolling_enabled,
            );
            zoom_bar(ui, feedback.zoom_bar_level, engine.config().max_zoom);
        });
    });
    action
}
