//! CSS custom-property output.

use crate::core::physics::VelocityFrame;
use crate::host::OutputSurface;

pub const PROP_NORMALIZED: &str = "--scroll-velocity";
pub const PROP_MAGNITUDE: &str = "--scroll-velocity-abs";
pub const PROP_POW: &str = "--scroll-velocity-pow";
pub const PROP_RAW: &str = "--scroll-velocity-raw";

/// Property name/value pairs for one frame, in publish order.
pub fn declarations(frame: &VelocityFrame) -> [(&'static str, String); 4] {
    [
        (PROP_NORMALIZED, fixed(frame.normalized, 4)),
        (PROP_MAGNITUDE, fixed(frame.magnitude, 4)),
        (PROP_POW, fixed(frame.pow, 4)),
        (PROP_RAW, fixed(frame.raw, 2)),
    ]
}

/// Write all four properties to `surface`.
pub fn write_frame(surface: &dyn OutputSurface, frame: &VelocityFrame) {
    for (name, value) in declarations(frame) {
        surface.set_property(name, &value);
    }
}

/// Fixed-point decimal string, `Number.prototype.toFixed` style: an exact
/// `-0.0` prints unsigned, tiny negatives keep their sign.
fn fixed(value: f64, decimals: usize) -> String {
    // `-0.0 + 0.0` is `+0.0`; every other value is unchanged.
    let value = value + 0.0;
    format!("{value:.decimals$}")
}
