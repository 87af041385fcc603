//! Tracker configuration — physics parameters, partial option merging, and
//! persistence.
//!
//! Options are stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/scroll-velocity/config.toml` (default
//! `~/.config/scroll-velocity/config.toml`).

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

// ───────────────────────────────────────── errors ────────────

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown sample mode `{0}` (expected delta, time or hybrid)")]
    UnknownSampleMode(String),
    #[error("unknown option `{0}`")]
    UnknownKey(String),
    #[error("option `{key}`: `{value}` is not a number")]
    BadNumber { key: String, value: String },
    #[error("option `{key}`: `{value}` is not true/false")]
    BadBool { key: String, value: String },
    #[error("line {line}: expected `key = value`")]
    Malformed { line: usize },
    #[error("`{0}`: expected `key=value`")]
    BadAssignment(String),
    #[error("option `{key}` = {value} is outside {domain}")]
    OutOfDomain {
        key: &'static str,
        value: f64,
        domain: &'static str,
    },
}

// ───────────────────────────────────────── sample mode ───────

/// How a raw position delta becomes an instantaneous estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleMode {
    /// Raw per-event displacement.
    Delta,
    /// Position per millisecond, rescaled.
    Time,
    /// Adaptive mix of the two, keyed on the event gap.
    #[default]
    Hybrid,
}

impl SampleMode {
    pub const ALL: &[SampleMode] = &[SampleMode::Delta, SampleMode::Time, SampleMode::Hybrid];

    pub fn label(self) -> &'static str {
        match self {
            SampleMode::Delta => "delta",
            SampleMode::Time => "time",
            SampleMode::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for SampleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SampleMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "delta" => Ok(SampleMode::Delta),
            "time" => Ok(SampleMode::Time),
            "hybrid" => Ok(SampleMode::Hybrid),
            other => Err(ConfigError::UnknownSampleMode(other.to_string())),
        }
    }
}

// ───────────────────────────────────────── config ────────────

/// Active tracker configuration.
///
/// Replaced wholesale by [`TrackerConfig::merged`]; numeric fields are taken
/// at face value.  Values outside their documented domain (e.g. `friction >
/// 1`) are accepted and simply change the feel: the velocity may oscillate
/// or grow until the clamp holds it at `max_velocity`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerConfig {
    pub sample_mode: SampleMode,
    /// Blend weight toward the new estimate, typically `(0, 1]`.
    pub responsiveness: f64,
    /// Per-tick multiplicative decay, `[0, 1]`.
    pub friction: f64,
    /// Per-tick additional pull to zero, `[0, 1]`.
    pub attraction: f64,
    /// Snap-to-zero cutoff on `|velocity|`.
    pub threshold: f64,
    /// Clamp bound and normalization divisor.
    pub max_velocity: f64,
    pub write_css_variables: bool,
    pub respect_reduced_motion: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            sample_mode: SampleMode::Hybrid,
            responsiveness: 0.35,
            friction: 0.92,
            attraction: 0.04,
            threshold: 0.02,
            max_velocity: 200.0,
            write_css_variables: true,
            respect_reduced_motion: true,
        }
    }
}

impl TrackerConfig {
    /// A new config with every field present in `options` replacing ours.
    pub fn merged(&self, options: &TrackerOptions) -> Self {
        Self {
            sample_mode: options.sample_mode.unwrap_or(self.sample_mode),
            responsiveness: options.effective_responsiveness().unwrap_or(self.responsiveness),
            friction: options.friction.unwrap_or(self.friction),
            attraction: options.attraction.unwrap_or(self.attraction),
            threshold: options.threshold.unwrap_or(self.threshold),
            max_velocity: options.max_velocity.unwrap_or(self.max_velocity),
            write_css_variables: options
                .write_css_variables
                .unwrap_or(self.write_css_variables),
            respect_reduced_motion: options
                .respect_reduced_motion
                .unwrap_or(self.respect_reduced_motion),
        }
    }

    /// Opt-in strictness: reject values outside the documented domains.
    /// Nothing on the default path calls this.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks: [(&'static str, f64, bool, &'static str); 5] = [
            (
                "responsiveness",
                self.responsiveness,
                self.responsiveness > 0.0 && self.responsiveness <= 1.0,
                "(0, 1]",
            ),
            (
                "friction",
                self.friction,
                (0.0..=1.0).contains(&self.friction),
                "[0, 1]",
            ),
            (
                "attraction",
                self.attraction,
                (0.0..=1.0).contains(&self.attraction),
                "[0, 1]",
            ),
            ("threshold", self.threshold, self.threshold >= 0.0, "[0, ∞)"),
            (
                "max_velocity",
                self.max_velocity,
                self.max_velocity > 0.0 && self.max_velocity.is_finite(),
                "(0, ∞)",
            ),
        ];
        for (key, value, ok, domain) in checks {
            if !ok {
                return Err(ConfigError::OutOfDomain { key, value, domain });
            }
        }
        Ok(())
    }

    /// Render in config-file format.
    pub fn serialise(&self) -> String {
        let lines = [
            "# scroll-velocity configuration".to_string(),
            String::new(),
            "# Sampling: delta | time | hybrid".to_string(),
            format!("sample_mode = {}", self.sample_mode),
            String::new(),
            "# Physics".to_string(),
            format!("responsiveness = {}", self.responsiveness),
            format!("friction = {}", self.friction),
            format!("attraction = {}", self.attraction),
            format!("threshold = {}", self.threshold),
            format!("max_velocity = {}", self.max_velocity),
            String::new(),
            "# Output".to_string(),
            format!("write_css_variables = {}", self.write_css_variables),
            format!("respect_reduced_motion = {}", self.respect_reduced_motion),
            String::new(),
        ];
        lines.join("\n")
    }
}

// ───────────────────────────────────────── options ───────────

/// Partial configuration: only the fields that are `Some` take effect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerOptions {
    pub sample_mode: Option<SampleMode>,
    pub responsiveness: Option<f64>,
    /// Legacy name for `responsiveness`.  Ignored when `responsiveness` is
    /// also present.
    pub dampening: Option<f64>,
    pub friction: Option<f64>,
    pub attraction: Option<f64>,
    pub threshold: Option<f64>,
    pub max_velocity: Option<f64>,
    pub write_css_variables: Option<bool>,
    pub respect_reduced_motion: Option<bool>,
}

impl TrackerOptions {
    fn effective_responsiveness(&self) -> Option<f64> {
        self.responsiveness.or(self.dampening)
    }

    /// Layer `other` on top of `self`; fields present in `other` win.
    pub fn overlay(mut self, other: TrackerOptions) -> Self {
        macro_rules! take {
            ($($field:ident),*) => {
                $( if other.$field.is_some() { self.$field = other.$field; } )*
            };
        }
        // The two names are one field: a later alias replaces an earlier
        // value under either name.
        if let Some(r) = other.responsiveness.or(other.dampening) {
            self.responsiveness = Some(r);
            self.dampening = None;
        }
        take!(
            sample_mode,
            friction,
            attraction,
            threshold,
            max_velocity,
            write_css_variables,
            respect_reduced_motion
        );
        self
    }

    /// Apply one `key = value` pair.  Accepts both snake_case and the
    /// camelCase names used by the JavaScript API.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim().trim_matches('"');
        match key.trim() {
            "sample_mode" | "sampleMode" => self.sample_mode = Some(value.parse()?),
            "responsiveness" => self.responsiveness = Some(parse_number(key, value)?),
            "dampening" => self.dampening = Some(parse_number(key, value)?),
            "friction" => self.friction = Some(parse_number(key, value)?),
            "attraction" => self.attraction = Some(parse_number(key, value)?),
            "threshold" => self.threshold = Some(parse_number(key, value)?),
            "max_velocity" | "maxVelocity" => {
                self.max_velocity = Some(parse_number(key, value)?)
            }
            "write_css_variables" | "writeCSSVariables" => {
                self.write_css_variables = Some(parse_bool(key, value)?)
            }
            "respect_reduced_motion" | "respectReducedMotion" => {
                self.respect_reduced_motion = Some(parse_bool(key, value)?)
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// Parse a single `key=value` assignment (as given on the command line).
    pub fn parse_assignment(&mut self, assignment: &str) -> Result<(), ConfigError> {
        let Some((key, value)) = assignment.split_once('=') else {
            return Err(ConfigError::BadAssignment(assignment.to_string()));
        };
        self.set(key, value)
    }
}

fn parse_number(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.parse::<f64>().map_err(|_| ConfigError::BadNumber {
        key: key.trim().to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::BadBool {
            key: key.trim().to_string(),
            value: value.to_string(),
        }),
    }
}

// ───────────────────────────────────────── persistence ───────

/// Strict parse: the first bad line is an error.
pub fn parse_options(s: &str) -> Result<TrackerOptions, ConfigError> {
    let mut options = TrackerOptions::default();
    for (idx, line) in s.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(ConfigError::Malformed { line: idx + 1 });
        };
        options.set(key, value)?;
    }
    Ok(options)
}

/// Lenient parse: bad lines are logged and skipped.
pub fn parse_options_lenient(s: &str) -> TrackerOptions {
    let mut options = TrackerOptions::default();
    for (idx, line) in s.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            tracing::warn!("config line {}: expected `key = value`, skipping", idx + 1);
            continue;
        };
        if let Err(err) = options.set(key, value) {
            tracing::warn!("config line {}: {err}, skipping", idx + 1);
        }
    }
    options
}

/// Load options from `path` (or the default location), falling back to no
/// overrides when the file is missing or unreadable.
pub fn load(path: Option<&Path>) -> TrackerOptions {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
    if !path.exists() {
        return TrackerOptions::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => {
            tracing::debug!("loaded config from {}", path.display());
            parse_options_lenient(&contents)
        }
        Err(err) => {
            tracing::warn!("cannot read {}: {err}", path.display());
            TrackerOptions::default()
        }
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/scroll-velocity/config.toml`).
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("scroll-velocity").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = TrackerConfig::default();
        assert_eq!(c.sample_mode, SampleMode::Hybrid);
        assert_eq!(c.responsiveness, 0.35);
        assert_eq!(c.friction, 0.92);
        assert_eq!(c.attraction, 0.04);
        assert_eq!(c.threshold, 0.02);
        assert_eq!(c.max_velocity, 200.0);
        assert!(c.write_css_variables);
        assert!(c.respect_reduced_motion);
    }

    #[test]
    fn merge_keeps_absent_fields() {
        let base = TrackerConfig::default();
        let merged = base.merged(&TrackerOptions {
            friction: Some(0.5),
            ..Default::default()
        });
        assert_eq!(merged.friction, 0.5);
        assert_eq!(merged.responsiveness, base.responsiveness);
        assert_eq!(merged.max_velocity, base.max_velocity);
    }

    #[test]
    fn dampening_is_responsiveness() {
        let base = TrackerConfig::default();
        let a = base.merged(&TrackerOptions {
            dampening: Some(0.5),
            ..Default::default()
        });
        let b = base.merged(&TrackerOptions {
            responsiveness: Some(0.5),
            ..Default::default()
        });
        assert_eq!(a, b);
    }

    #[test]
    fn responsiveness_wins_over_dampening() {
        let merged = TrackerConfig::default().merged(&TrackerOptions {
            responsiveness: Some(0.8),
            dampening: Some(0.1),
            ..Default::default()
        });
        assert_eq!(merged.responsiveness, 0.8);
    }

    #[test]
    fn out_of_domain_values_are_accepted_by_merge() {
        let merged = TrackerConfig::default().merged(&TrackerOptions {
            friction: Some(1.5),
            max_velocity: Some(-1.0),
            ..Default::default()
        });
        assert_eq!(merged.friction, 1.5);
        assert_eq!(merged.max_velocity, -1.0);
        assert!(merged.validate().is_err());
    }

    #[test]
    fn validate_reports_offending_field() {
        let c = TrackerConfig {
            attraction: 2.0,
            ..Default::default()
        };
        assert_eq!(
            c.validate(),
            Err(ConfigError::OutOfDomain {
                key: "attraction",
                value: 2.0,
                domain: "[0, 1]",
            })
        );
        assert!(TrackerConfig::default().validate().is_ok());
    }

    #[test]
    fn sample_mode_parses_case_insensitively() {
        assert_eq!("Delta".parse::<SampleMode>(), Ok(SampleMode::Delta));
        assert_eq!(" time ".parse::<SampleMode>(), Ok(SampleMode::Time));
        assert!(matches!(
            "fast".parse::<SampleMode>(),
            Err(ConfigError::UnknownSampleMode(_))
        ));
        for mode in SampleMode::ALL {
            assert_eq!(mode.label().parse::<SampleMode>(), Ok(*mode));
        }
    }

    #[test]
    fn parse_file_with_comments_and_sections() {
        let text = "# comment\n[tracker]\nsampleMode = \"delta\"\nfriction = 0.8\n\nwrite_css_variables = false\n";
        let opts = parse_options(text).unwrap();
        assert_eq!(opts.sample_mode, Some(SampleMode::Delta));
        assert_eq!(opts.friction, Some(0.8));
        assert_eq!(opts.write_css_variables, Some(false));
        assert_eq!(opts.threshold, None);
    }

    #[test]
    fn strict_parse_reports_first_error() {
        assert_eq!(
            parse_options("friction = fast"),
            Err(ConfigError::BadNumber {
                key: "friction".into(),
                value: "fast".into(),
            })
        );
        assert_eq!(
            parse_options("threshold = 1\njunk"),
            Err(ConfigError::Malformed { line: 2 })
        );
        assert_eq!(
            parse_options("speed = 3"),
            Err(ConfigError::UnknownKey("speed".into()))
        );
    }

    #[test]
    fn lenient_parse_skips_bad_lines() {
        let opts = parse_options_lenient("friction = nope\nattraction = 0.1\nwat\n");
        assert_eq!(opts.friction, None);
        assert_eq!(opts.attraction, Some(0.1));
    }

    #[test]
    fn serialised_config_parses_back() {
        let config = TrackerConfig {
            sample_mode: SampleMode::Time,
            friction: 0.5,
            write_css_variables: false,
            ..Default::default()
        };
        let opts = parse_options(&config.serialise()).unwrap();
        assert_eq!(TrackerConfig::default().merged(&opts), config);
    }

    #[test]
    fn overlay_prefers_later_values() {
        let file = TrackerOptions {
            friction: Some(0.5),
            threshold: Some(0.1),
            ..Default::default()
        };
        let mut cli = TrackerOptions::default();
        cli.parse_assignment("friction=0.7").unwrap();
        assert_eq!(
            cli.parse_assignment("friction"),
            Err(ConfigError::BadAssignment("friction".into()))
        );
        let opts = file.overlay(cli);
        assert_eq!(opts.friction, Some(0.7));
        assert_eq!(opts.threshold, Some(0.1));
    }

    #[test]
    fn overlay_alias_replaces_earlier_responsiveness() {
        let file = parse_options("responsiveness = 0.3").unwrap();
        let mut cli = TrackerOptions::default();
        cli.parse_assignment("dampening=0.9").unwrap();
        let merged = TrackerConfig::default().merged(&file.overlay(cli));
        assert_eq!(merged.responsiveness, 0.9);

        let file = parse_options("dampening = 0.3").unwrap();
        let mut cli = TrackerOptions::default();
        cli.parse_assignment("responsiveness=0.6").unwrap();
        let merged = TrackerConfig::default().merged(&file.overlay(cli));
        assert_eq!(merged.responsiveness, 0.6);

        let file = parse_options("responsiveness = 0.3").unwrap();
        let merged = TrackerConfig::default().merged(&file.overlay(TrackerOptions::default()));
        assert_eq!(merged.responsiveness, 0.3);
    }

    #[test]
    fn load_missing_file_yields_no_overrides() {
        let opts = load(Some(Path::new("/nonexistent/scroll-velocity/config.toml")));
        assert_eq!(opts, TrackerOptions::default());
    }
}
