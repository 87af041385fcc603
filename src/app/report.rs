//! Text report of what the tracker published during a replay.

use crate::host::headless::RecordingSurface;

/// Emits one line each time the surface received a new publish.
#[derive(Debug, Default)]
pub struct PublishReport {
    seen_writes: u64,
    lines: u64,
}

impl PublishReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A report line if anything was written since the last call.
    pub fn observe(&mut self, at_ms: f64, velocity: f64, surface: &RecordingSurface) -> Option<String> {
        let writes = surface.writes();
        if writes == self.seen_writes {
            return None;
        }
        self.seen_writes = writes;
        self.lines += 1;
        Some(format_line(at_ms, velocity, surface))
    }

    /// Lines emitted so far.
    pub fn lines(&self) -> u64 {
        self.lines
    }
}

pub fn format_line(at_ms: f64, velocity: f64, surface: &RecordingSurface) -> String {
    let decls: Vec<String> = surface
        .snapshot()
        .into_iter()
        .map(|(name, value)| format!("{name}: {value};"))
        .collect();
    format!("{at_ms:>9.1}ms  v={velocity:>8.3}  {}", decls.join(" "))
}
