//! In-memory host: a settable clock, a manually pumped frame queue, a scroll
//! bus and a recording style surface.
//!
//! Used by the replay binary and by the tests.  Nothing here touches real
//! time; the driver decides when the clock moves and when a frame fires.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use super::{
    Clock, OutputSurface, ReducedMotionPreference, ScrollEvents, ScrollHandler, ScrollSource,
    SubscriptionId, TickCallback, TickHandle, TickScheduler,
};

// ───────────────────────────────────────── clock ─────────────

#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

// ───────────────────────────────────────── preference ────────

#[derive(Debug, Default)]
pub struct StaticPreference {
    active: Cell<bool>,
}

impl StaticPreference {
    pub fn new(active: bool) -> Self {
        Self {
            active: Cell::new(active),
        }
    }

    pub fn set(&self, active: bool) {
        self.active.set(active);
    }
}

impl ReducedMotionPreference for StaticPreference {
    fn is_active(&self) -> bool {
        self.active.get()
    }
}

// ───────────────────────────────────────── frames ────────────

/// Tick queue pumped by [`FrameScheduler::run_frame`].
#[derive(Default)]
pub struct FrameScheduler {
    next_id: Cell<u64>,
    queue: RefCell<Vec<(TickHandle, TickCallback)>>,
    fired: Cell<u64>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every callback that was pending when the frame started.
    /// Callbacks requested while the frame runs wait for the next one.
    /// Returns how many fired.
    pub fn run_frame(&self) -> usize {
        let batch = std::mem::take(&mut *self.queue.borrow_mut());
        let count = batch.len();
        for (_, callback) in batch {
            self.fired.set(self.fired.get() + 1);
            callback();
        }
        count
    }

    /// Number of requests waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Total callbacks fired so far.
    pub fn fired(&self) -> u64 {
        self.fired.get()
    }
}

impl TickScheduler for FrameScheduler {
    fn request_tick(&self, callback: TickCallback) -> TickHandle {
        let handle = TickHandle(self.next_id.get());
        self.next_id.set(handle.0 + 1);
        self.queue.borrow_mut().push((handle, callback));
        handle
    }

    fn cancel(&self, handle: TickHandle) {
        self.queue.borrow_mut().retain(|(h, _)| *h != handle);
    }
}

// ───────────────────────────────────────── scroll ────────────

/// Scroll position plus the handlers listening to it.
#[derive(Default)]
pub struct ScrollBus {
    y: Cell<f64>,
    next_id: Cell<u64>,
    handlers: RefCell<BTreeMap<SubscriptionId, ScrollHandler>>,
}

impl ScrollBus {
    pub fn new(initial_y: f64) -> Self {
        Self {
            y: Cell::new(initial_y),
            ..Default::default()
        }
    }

    /// Move to `y` and notify every subscriber.
    pub fn scroll_to(&self, y: f64) {
        self.y.set(y);
        // Snapshot so handlers may (un)subscribe while being notified.
        let handlers: Vec<ScrollHandler> = self.handlers.borrow().values().cloned().collect();
        for handler in handlers {
            handler();
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.borrow().len()
    }
}

impl ScrollSource for ScrollBus {
    fn scroll_y(&self) -> f64 {
        self.y.get()
    }
}

impl ScrollEvents for ScrollBus {
    fn subscribe(&self, handler: ScrollHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers.borrow_mut().insert(id, handler);
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.handlers.borrow_mut().remove(&id);
    }
}

// ───────────────────────────────────────── surface ───────────

/// Keeps the last value written per property and counts publishes.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    properties: RefCell<BTreeMap<String, String>>,
    writes: Cell<u64>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.properties.borrow().get(name).cloned()
    }

    /// Total `set_property` calls.
    pub fn writes(&self) -> u64 {
        self.writes.get()
    }

    /// All properties in name order.
    pub fn snapshot(&self) -> Vec<(String, String)> {
        self.properties
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl OutputSurface for RecordingSurface {
    fn set_property(&self, name: &str, value: &str) {
        self.writes.set(self.writes.get() + 1);
        self.properties
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }
}
