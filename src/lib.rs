//! Scroll velocity estimator.
//!
//! Turns raw, irregular scroll position samples into a smoothed, signed
//! velocity signal and publishes it as CSS custom properties.  The browser
//! (or any other host) is reached only through the capability traits in
//! [`host`], so the whole engine runs headless.

pub mod app;
pub mod config;
pub mod core;
pub mod host;
pub mod output;

pub use crate::config::{ConfigError, SampleMode, TrackerConfig, TrackerOptions};
pub use crate::core::tracker::{Host, VelocityTracker};
