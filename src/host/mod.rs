//! Host capabilities the tracker consumes.
//!
//! In a browser these are `performance.now()`, the reduced-motion media
//! query, `requestAnimationFrame`, `window.scrollY`, scroll listeners and a
//! style declaration.  Here each one is a trait taking `&self`: handlers
//! re-enter the host from inside its own callbacks, so implementations use
//! interior mutability.  [`headless`] provides in-memory versions.

pub mod headless;

use std::rc::Rc;

/// Monotonic clock in milliseconds.
pub trait Clock {
    fn now(&self) -> f64;
}

/// The user's "reduce motion" preference.
pub trait ReducedMotionPreference {
    fn is_active(&self) -> bool;
}

/// Callback fired once on the next display refresh.
pub type TickCallback = Box<dyn FnOnce()>;

/// Identifies a pending tick request so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(pub u64);

/// Per-refresh tick source ("next paint").
pub trait TickScheduler {
    fn request_tick(&self, callback: TickCallback) -> TickHandle;
    /// Cancelling an already-fired or unknown handle is a no-op.
    fn cancel(&self, handle: TickHandle);
}

/// Current vertical scroll offset.
pub trait ScrollSource {
    fn scroll_y(&self) -> f64;
}

/// Handler invoked on every position change.
pub type ScrollHandler = Rc<dyn Fn()>;

/// Identifies one registered scroll handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// Subscribe/unsubscribe to position-change notifications.
pub trait ScrollEvents {
    fn subscribe(&self, handler: ScrollHandler) -> SubscriptionId;
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Where the custom style properties are written.
pub trait OutputSurface {
    fn set_property(&self, name: &str, value: &str);
}
