//! Replay application — trace parsing, the event stream, and reporting.

pub mod event;
pub mod report;
pub mod runtime;
pub mod trace;
