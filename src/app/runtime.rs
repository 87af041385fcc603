//! Replay runtime — a tracker over the headless host, driven by
//! [`AppEvent`]s.

use std::io::Write;
use std::rc::Rc;

use tokio::sync::mpsc;

use super::event::AppEvent;
use super::report::PublishReport;
use crate::config::TrackerOptions;
use crate::core::tracker::{Host, VelocityTracker};
use crate::host::headless::{
    FrameScheduler, ManualClock, RecordingSurface, ScrollBus, StaticPreference,
};
use crate::host::OutputSurface;

/// What a finished replay looked like.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReplaySummary {
    pub samples: u64,
    pub frames: u64,
    pub ticks_fired: u64,
    pub publishes: u64,
    pub peak_velocity: f64,
}

pub struct Replay {
    clock: Rc<ManualClock>,
    frames: Rc<FrameScheduler>,
    bus: Rc<ScrollBus>,
    surface: Rc<RecordingSurface>,
    tracker: VelocityTracker,
    report: PublishReport,
    summary: ReplaySummary,
}

impl Replay {
    /// A started tracker at scroll position `initial_y` and time `start_ms`.
    pub fn new(options: &TrackerOptions, reduced_motion: bool, initial_y: f64, start_ms: f64) -> Self {
        let clock = Rc::new(ManualClock::new(start_ms));
        let frames = Rc::new(FrameScheduler::new());
        let bus = Rc::new(ScrollBus::new(initial_y));
        let surface = Rc::new(RecordingSurface::new());
        let host = Host {
            clock: clock.clone(),
            reduced_motion: Rc::new(StaticPreference::new(reduced_motion)),
            scheduler: frames.clone(),
            scroll: bus.clone(),
            events: bus.clone(),
        };
        let target: Rc<dyn OutputSurface> = surface.clone();
        let tracker = VelocityTracker::new(host, Some(target), options);
        tracker.start();
        Self {
            clock,
            frames,
            bus,
            surface,
            tracker,
            report: PublishReport::new(),
            summary: ReplaySummary::default(),
        }
    }

    pub fn tracker(&self) -> &VelocityTracker {
        &self.tracker
    }

    /// Apply one event; returns a report line when something was published.
    pub fn handle(&mut self, event: AppEvent) -> Option<String> {
        self.clock.set(event.at_ms());
        match event {
            AppEvent::Scroll { y, .. } => {
                self.summary.samples += 1;
                self.bus.scroll_to(y);
            }
            AppEvent::Frame { .. } => {
                self.summary.frames += 1;
                self.frames.run_frame();
            }
            AppEvent::End { .. } => self.tracker.stop(),
        }
        let velocity = self.tracker.velocity();
        if velocity.abs() > self.summary.peak_velocity.abs() {
            self.summary.peak_velocity = velocity;
        }
        self.report.observe(event.at_ms(), velocity, &self.surface)
    }

    pub fn summary(&self) -> ReplaySummary {
        ReplaySummary {
            ticks_fired: self.frames.fired(),
            publishes: self.report.lines(),
            ..self.summary
        }
    }

    /// Drain `rx`, writing a line per publish to `out`.
    pub async fn run(
        mut self,
        mut rx: mpsc::UnboundedReceiver<AppEvent>,
        out: &mut impl Write,
    ) -> anyhow::Result<ReplaySummary> {
        while let Some(event) = rx.recv().await {
            if let Some(line) = self.handle(event) {
                writeln!(out, "{line}")?;
            }
            if matches!(event, AppEvent::End { .. }) {
                break;
            }
        }
        let summary = self.summary();
        tracing::debug!(?summary, "replay finished");
        Ok(summary)
    }
}
