//! Scroll traces — recorded `(time, scrollY)` samples to replay.
//!
//! One sample per line: `<time_ms> <scroll_y>`, separated by whitespace or a
//! comma.  Blank lines and `#` comments are ignored.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TraceError {
    #[error("line {line}: expected `<time_ms> <scroll_y>`")]
    Malformed { line: usize },
    #[error("line {line}: `{value}` is not a number")]
    BadNumber { line: usize, value: String },
    #[error("line {line}: time {time_ms} goes backwards (previous {previous_ms})")]
    OutOfOrder {
        line: usize,
        time_ms: f64,
        previous_ms: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceSample {
    pub time_ms: f64,
    pub y: f64,
}

pub fn parse_trace(s: &str) -> Result<Vec<TraceSample>, TraceError> {
    let mut samples: Vec<TraceSample> = Vec::new();
    for (idx, line) in s.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .collect();
        let [time, y] = fields[..] else {
            return Err(TraceError::Malformed { line: line_no });
        };
        let number = |v: &str| match v.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(n),
            _ => Err(TraceError::BadNumber {
                line: line_no,
                value: v.to_string(),
            }),
        };
        let sample = TraceSample {
            time_ms: number(time)?,
            y: number(y)?,
        };
        if let Some(prev) = samples.last() {
            if sample.time_ms < prev.time_ms {
                return Err(TraceError::OutOfOrder {
                    line: line_no,
                    time_ms: sample.time_ms,
                    previous_ms: prev.time_ms,
                });
            }
        }
        samples.push(sample);
    }
    Ok(samples)
}
