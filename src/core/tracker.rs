//! The velocity tracker — sampling, blending and decay wired to the host.
//!
//! Two handlers drive every state change: the scroll handler (one per
//! position-change notification) and the tick handler (one per display
//! refresh).  Both run to completion on the host's single event loop, so
//! they never interleave.  At most one tick is pending at a time; the tick
//! handler re-arms itself while velocity is non-zero and the scroll handler
//! re-arms it when nothing is pending, so the loop stops on its own once
//! velocity reaches exactly zero.
//!
//! Handlers hold a [`Weak`] reference to the shared state: a dropped tracker
//! turns any late callback into a no-op.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::physics::{self, VelocityFrame};
use super::sampling;
use crate::config::{ConfigError, TrackerConfig, TrackerOptions};
use crate::host::{
    Clock, OutputSurface, ReducedMotionPreference, ScrollEvents, ScrollSource, SubscriptionId,
    TickHandle, TickScheduler,
};
use crate::output;

// ───────────────────────────────────────── host bundle ───────

/// The capabilities a tracker needs from its environment.
#[derive(Clone)]
pub struct Host {
    pub clock: Rc<dyn Clock>,
    pub reduced_motion: Rc<dyn ReducedMotionPreference>,
    pub scheduler: Rc<dyn TickScheduler>,
    pub scroll: Rc<dyn ScrollSource>,
    pub events: Rc<dyn ScrollEvents>,
}

// ───────────────────────────────────────── state ─────────────

#[derive(Debug, Clone, Copy)]
struct TrackerState {
    velocity: f64,
    last_position: f64,
    last_timestamp: f64,
    running: bool,
    config: TrackerConfig,
    pending_tick: Option<TickHandle>,
    subscription: Option<SubscriptionId>,
}

struct Shared {
    host: Host,
    /// Resolved at construction; `None` means publishing is skipped.
    target: Option<Rc<dyn OutputSurface>>,
    state: RefCell<TrackerState>,
}

/// Scroll velocity tracker.
///
/// Single-threaded (`!Send`); create and drive it on the host's event loop.
pub struct VelocityTracker {
    shared: Rc<Shared>,
}

impl VelocityTracker {
    /// Build a stopped tracker with `options` layered over the defaults.
    pub fn new(
        host: Host,
        target: Option<Rc<dyn OutputSurface>>,
        options: &TrackerOptions,
    ) -> Self {
        let config = TrackerConfig::default().merged(options);
        let state = TrackerState {
            velocity: 0.0,
            last_position: host.scroll.scroll_y(),
            last_timestamp: host.clock.now(),
            running: false,
            config,
            pending_tick: None,
            subscription: None,
        };
        Self {
            shared: Rc::new(Shared {
                host,
                target,
                state: RefCell::new(state),
            }),
        }
    }

    /// Subscribe to scroll changes and arm the tick loop.  No-op when
    /// already running.
    pub fn start(&self) {
        let shared = &self.shared;
        {
            let mut st = shared.state.borrow_mut();
            if st.running {
                return;
            }
            st.running = true;
            st.last_position = shared.host.scroll.scroll_y();
            st.last_timestamp = shared.host.clock.now();
        }

        let weak = Rc::downgrade(shared);
        let id = shared.host.events.subscribe(Rc::new(move || {
            if let Some(shared) = weak.upgrade() {
                on_scroll(&shared);
            }
        }));
        shared.state.borrow_mut().subscription = Some(id);
        ensure_tick(shared);
        tracing::debug!(config = ?shared.state.borrow().config, "velocity tracker started");
    }

    /// Unsubscribe, cancel any pending tick, reset velocity and publish
    /// zeros once.  No-op when not running.
    pub fn stop(&self) {
        let shared = &self.shared;
        let (subscription, pending) = {
            let mut st = shared.state.borrow_mut();
            if !st.running {
                return;
            }
            st.running = false;
            st.velocity = 0.0;
            (st.subscription.take(), st.pending_tick.take())
        };
        if let Some(id) = subscription {
            shared.host.events.unsubscribe(id);
        }
        if let Some(handle) = pending {
            shared.host.scheduler.cancel(handle);
        }
        publish(shared);
        tracing::debug!("velocity tracker stopped");
    }

    pub fn is_running(&self) -> bool {
        self.shared.state.borrow().running
    }

    /// Current raw velocity.
    pub fn velocity(&self) -> f64 {
        self.shared.state.borrow().velocity
    }

    /// Velocity divided by `max_velocity`, bounded to `[-1, 1]`.
    pub fn normalized_velocity(&self) -> f64 {
        let st = self.shared.state.borrow();
        physics::normalize(st.velocity, st.config.max_velocity)
    }

    /// The values the next publish would write.
    pub fn frame(&self) -> VelocityFrame {
        let st = self.shared.state.borrow();
        VelocityFrame::from_velocity(st.velocity, &st.config)
    }

    pub fn config(&self) -> TrackerConfig {
        self.shared.state.borrow().config
    }

    /// Replace the config with `options` merged over it.  Velocity is kept;
    /// the new values apply from the next sample or tick.
    pub fn set_options(&self, options: &TrackerOptions) {
        let mut st = self.shared.state.borrow_mut();
        st.config = st.config.merged(options);
        tracing::debug!(config = ?st.config, "tracker config replaced");
    }

    /// Like [`set_options`](Self::set_options), but the merged config must
    /// pass [`TrackerConfig::validate`]; on error nothing changes.
    pub fn try_set_options(&self, options: &TrackerOptions) -> Result<(), ConfigError> {
        let mut st = self.shared.state.borrow_mut();
        let next = st.config.merged(options);
        next.validate()?;
        st.config = next;
        tracing::debug!(config = ?st.config, "tracker config replaced (validated)");
        Ok(())
    }
}

impl Drop for VelocityTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

// ───────────────────────────────────────── handlers ──────────

fn reduced_motion(shared: &Shared, config: &TrackerConfig) -> bool {
    config.respect_reduced_motion && shared.host.reduced_motion.is_active()
}

fn on_scroll(shared: &Rc<Shared>) {
    let now = shared.host.clock.now();
    let y = shared.host.scroll.scroll_y();
    {
        let mut st = shared.state.borrow_mut();
        if !st.running {
            return;
        }
        let delta_position = y - st.last_position;
        let delta_time = sampling::effective_delta_time(now, st.last_timestamp);
        st.last_position = y;
        st.last_timestamp = now;

        if reduced_motion(shared, &st.config) {
            st.velocity = 0.0;
        } else {
            let instantaneous =
                sampling::instantaneous(st.config.sample_mode, delta_position, delta_time);
            st.velocity = physics::blend(
                st.velocity,
                instantaneous,
                st.config.responsiveness,
                st.config.max_velocity,
            );
            tracing::trace!(
                delta_position,
                delta_time,
                instantaneous,
                velocity = st.velocity,
                "scroll sample"
            );
        }
    }
    publish(shared);
    ensure_tick(shared);
}

fn on_tick(shared: &Rc<Shared>) {
    let reschedule = {
        let mut st = shared.state.borrow_mut();
        st.pending_tick = None;
        if !st.running {
            return;
        }
        if !reduced_motion(shared, &st.config) && st.velocity.abs() > 0.0 {
            st.velocity = physics::decay(
                st.velocity,
                st.config.friction,
                st.config.attraction,
                st.config.threshold,
            );
            tracing::trace!(velocity = st.velocity, "decay tick");
        }
        st.velocity != 0.0
    };
    publish(shared);
    if reschedule {
        ensure_tick(shared);
    }
}

/// Request a tick unless one is already pending or the tracker is stopped.
fn ensure_tick(shared: &Rc<Shared>) {
    {
        let st = shared.state.borrow();
        if !st.running || st.pending_tick.is_some() {
            return;
        }
    }
    let weak: Weak<Shared> = Rc::downgrade(shared);
    let handle = shared.host.scheduler.request_tick(Box::new(move || {
        if let Some(shared) = weak.upgrade() {
            on_tick(&shared);
        }
    }));
    shared.state.borrow_mut().pending_tick = Some(handle);
}

fn publish(shared: &Shared) {
    let (enabled, frame) = {
        let st = shared.state.borrow();
        (
            st.config.write_css_variables,
            VelocityFrame::from_velocity(st.velocity, &st.config),
        )
    };
    if !enabled {
        return;
    }
    if let Some(target) = &shared.target {
        output::write_frame(&**target, &frame);
    }
}
