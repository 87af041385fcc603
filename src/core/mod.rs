//! Core engine – sampling strategies, scalar physics, and the tracker state
//! machine.
//!
//! `sampling` and `physics` are pure functions over `f64`.  `tracker` wires
//! them to the host capabilities and owns the only mutable state.

pub mod physics;
pub mod sampling;
pub mod tracker;
