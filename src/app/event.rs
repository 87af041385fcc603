//! Replay event stream.
//!
//! Interleaves trace samples with display-refresh frames and runs a
//! background task that forwards them over a channel, optionally paced in
//! real time, so the main loop only ever reacts to events.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use super::trace::TraceSample;
use crate::core::sampling::FALLBACK_FRAME_MS;

/// Events consumed by the replay loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// The scroll position changed to `y`.
    Scroll { at_ms: f64, y: f64 },
    /// One display refresh.
    Frame { at_ms: f64 },
    /// Replay finished.
    End { at_ms: f64 },
}

impl AppEvent {
    pub fn at_ms(&self) -> f64 {
        match *self {
            AppEvent::Scroll { at_ms, .. } | AppEvent::Frame { at_ms } | AppEvent::End { at_ms } => {
                at_ms
            }
        }
    }
}

/// Replay timing.
#[derive(Debug, Clone, Copy)]
pub struct ReplayPlan {
    /// Interval between frames.
    pub frame_ms: f64,
    /// How long frames keep running after the last sample.
    pub settle_ms: f64,
    /// Pace events against the wall clock instead of firing them at once.
    pub realtime: bool,
}

impl Default for ReplayPlan {
    fn default() -> Self {
        Self {
            frame_ms: FALLBACK_FRAME_MS,
            settle_ms: 1000.0,
            realtime: false,
        }
    }
}

/// Merge samples and frames into one time-ordered list ending in
/// [`AppEvent::End`].  A scroll sample due at the same instant as a frame is
/// delivered first, as browsers dispatch scroll events before paint.
pub fn schedule(samples: &[TraceSample], plan: &ReplayPlan) -> Vec<AppEvent> {
    let frame_ms = if plan.frame_ms > 0.0 {
        plan.frame_ms
    } else {
        FALLBACK_FRAME_MS
    };
    let start = samples.first().map_or(0.0, |s| s.time_ms);
    let end = samples.last().map_or(0.0, |s| s.time_ms) + plan.settle_ms.max(0.0);

    let mut events = Vec::new();
    let mut pending = samples.iter().peekable();
    let mut k = 1u64;
    loop {
        let frame_at = start + k as f64 * frame_ms;
        if frame_at > end {
            break;
        }
        while let Some(sample) = pending.next_if(|s| s.time_ms <= frame_at) {
            events.push(AppEvent::Scroll {
                at_ms: sample.time_ms,
                y: sample.y,
            });
        }
        events.push(AppEvent::Frame { at_ms: frame_at });
        k += 1;
    }
    for sample in pending {
        events.push(AppEvent::Scroll {
            at_ms: sample.time_ms,
            y: sample.y,
        });
    }
    events.push(AppEvent::End { at_ms: end });
    events
}

/// Spawns a background task that sends the scheduled events through the
/// returned channel.
pub fn spawn_replay(
    samples: Vec<TraceSample>,
    plan: ReplayPlan,
) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    let events = schedule(&samples, &plan);
    let origin = samples.first().map_or(0.0, |s| s.time_ms);

    tokio::spawn(async move {
        let wall_start = Instant::now();
        for event in events {
            if plan.realtime {
                let offset = (event.at_ms() - origin).max(0.0);
                tokio::time::sleep_until(wall_start + Duration::from_secs_f64(offset / 1000.0))
                    .await;
            }
            if tx.send(event).is_err() {
                break; // receiver dropped
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(points: &[(f64, f64)]) -> Vec<TraceSample> {
        points
            .iter()
            .map(|&(time_ms, y)| TraceSample { time_ms, y })
            .collect()
    }

    #[test]
    fn scroll_precedes_frame_at_same_instant() {
        let plan = ReplayPlan {
            frame_ms: 10.0,
            settle_ms: 0.0,
            realtime: false,
        };
        let events = schedule(&samples(&[(0.0, 0.0), (10.0, 5.0)]), &plan);
        assert_eq!(
            events,
            vec![
                AppEvent::Scroll { at_ms: 0.0, y: 0.0 },
                AppEvent::Scroll { at_ms: 10.0, y: 5.0 },
                AppEvent::Frame { at_ms: 10.0 },
                AppEvent::End { at_ms: 10.0 },
            ]
        );
    }

    #[test]
    fn frames_continue_through_settle_window() {
        let plan = ReplayPlan {
            frame_ms: 10.0,
            settle_ms: 35.0,
            realtime: false,
        };
        let events = schedule(&samples(&[(100.0, 0.0)]), &plan);
        let frames = events
            .iter()
            .filter(|e| matches!(e, AppEvent::Frame { .. }))
            .count();
        assert_eq!(frames, 3);
        assert_eq!(events.last(), Some(&AppEvent::End { at_ms: 135.0 }));
    }

    #[test]
    fn non_positive_frame_interval_uses_fallback() {
        let plan = ReplayPlan {
            frame_ms: 0.0,
            settle_ms: 20.0,
            realtime: false,
        };
        let events = schedule(&samples(&[(0.0, 0.0)]), &plan);
        assert!(events.contains(&AppEvent::Frame {
            at_ms: FALLBACK_FRAME_MS
        }));
    }

    #[test]
    fn empty_trace_still_ends() {
        let events = schedule(&[], &ReplayPlan::default());
        assert_eq!(events.last(), Some(&AppEvent::End { at_ms: 1000.0 }));
    }

    #[tokio::test]
    async fn replay_channel_delivers_schedule_in_order() {
        let plan = ReplayPlan {
            frame_ms: 10.0,
            settle_ms: 20.0,
            realtime: false,
        };
        let input = samples(&[(0.0, 0.0), (5.0, 3.0)]);
        let expected = schedule(&input, &plan);
        let mut rx = spawn_replay(input, plan);
        let mut got = Vec::new();
        while let Some(event) = rx.recv().await {
            got.push(event);
        }
        assert_eq!(got, expected);
    }
}
