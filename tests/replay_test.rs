//! Integration tests for the trace replay pipeline
//!
//! Trace text -> schedule -> channel -> headless tracker -> report lines

use scroll_velocity::app::event::{schedule, spawn_replay, AppEvent, ReplayPlan};
use scroll_velocity::app::runtime::Replay;
use scroll_velocity::app::trace::parse_trace;
use scroll_velocity::config::TrackerOptions;

const FLICK: &str = include_str!("../demos/flick.trace");

fn plan() -> ReplayPlan {
    ReplayPlan {
        frame_ms: 16.7,
        settle_ms: 1500.0,
        realtime: false,
    }
}

#[tokio::test]
async fn flick_settles_to_zero_and_reports() {
    let samples = parse_trace(FLICK).unwrap();
    let first = samples[0];
    let replay = Replay::new(&TrackerOptions::default(), false, first.y, first.time_ms);
    let rx = spawn_replay(samples.clone(), plan());

    let mut out = Vec::new();
    let summary = replay.run(rx, &mut out).await.unwrap();
    let text = String::from_utf8(out).unwrap();
    let last = text.lines().last().unwrap();

    assert_eq!(summary.samples, samples.len() as u64);
    assert!(summary.peak_velocity > 0.0);
    assert!(summary.peak_velocity <= 200.0);
    assert_eq!(summary.publishes, text.lines().count() as u64);
    assert!(last.contains("--scroll-velocity: 0.0000;"));
    assert!(last.contains("--scroll-velocity-raw: 0.00;"));
    // The loop went quiet well before the settle window closed.
    assert!(summary.ticks_fired < summary.frames);
}

#[tokio::test]
async fn reduced_motion_replay_never_moves() {
    let samples = parse_trace(FLICK).unwrap();
    let replay = Replay::new(&TrackerOptions::default(), true, 0.0, 0.0);
    let rx = spawn_replay(samples, plan());

    let mut out = Vec::new();
    let summary = replay.run(rx, &mut out).await.unwrap();
    assert_eq!(summary.peak_velocity, 0.0);
    let text = String::from_utf8(out).unwrap();
    assert!(text
        .lines()
        .all(|l| l.contains("--scroll-velocity-raw: 0.00;")));
}

#[test]
fn manual_replay_matches_scheduled_events() {
    let samples = parse_trace(FLICK).unwrap();
    let mut replay = Replay::new(&TrackerOptions::default(), false, 0.0, 0.0);
    let mut moving_frames = 0;
    for event in schedule(&samples, &plan()) {
        replay.handle(event);
        if matches!(event, AppEvent::Frame { .. }) && replay.tracker().velocity() != 0.0 {
            moving_frames += 1;
        }
    }
    assert!(moving_frames > 0);
    assert!(!replay.tracker().is_running());
    assert_eq!(replay.tracker().velocity(), 0.0);
}
