//! Replay a recorded scroll trace through the velocity tracker.
//!
//! Run with a trace file (`<time_ms> <scroll_y>` per line, `-` for stdin) to
//! print the CSS custom properties the tracker publishes frame by frame.
//! Run with `--print-config` to print the effective configuration.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use scroll_velocity::app::{
    event::{spawn_replay, ReplayPlan},
    runtime::Replay,
    trace::parse_trace,
};
use scroll_velocity::config::{self, TrackerConfig, TrackerOptions};
use scroll_velocity::core::sampling::FALLBACK_FRAME_MS;

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Scroll velocity trace replayer")]
struct Cli {
    /// Trace file to replay (`-` reads stdin).
    #[arg(default_value = "-")]
    trace: PathBuf,

    /// Config file (defaults to `$XDG_CONFIG_HOME/scroll-velocity/config.toml`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override one option, e.g. `--set sample_mode=delta`.  Repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// Behave as if the user prefers reduced motion.
    #[arg(long)]
    reduced_motion: bool,

    /// Disable CSS variable output.
    #[arg(long)]
    no_css: bool,

    /// Interval between display refresh frames, in ms.
    #[arg(long, default_value_t = FALLBACK_FRAME_MS)]
    frame_ms: f64,

    /// Keep ticking this long after the last sample, in ms.
    #[arg(long, default_value_t = 1000.0)]
    settle_ms: f64,

    /// Pace the replay against the wall clock.
    #[arg(long)]
    realtime: bool,

    /// Reject option values outside their documented ranges.
    #[arg(long)]
    strict: bool,

    /// Print the effective configuration and exit.
    #[arg(long)]
    print_config: bool,
}

fn resolve_options(cli: &Cli) -> Result<TrackerOptions> {
    let mut overrides = TrackerOptions::default();
    for assignment in &cli.overrides {
        overrides
            .parse_assignment(assignment)
            .with_context(|| format!("invalid --set `{assignment}`"))?;
    }
    if cli.no_css {
        overrides.write_css_variables = Some(false);
    }
    let options = config::load(cli.config.as_deref()).overlay(overrides);
    if cli.strict {
        TrackerConfig::default()
            .merged(&options)
            .validate()
            .context("configuration rejected by --strict")?;
    }
    Ok(options)
}

fn read_trace(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("reading trace from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays a clean report.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let options = resolve_options(&cli)?;

    if cli.print_config {
        print!("{}", TrackerConfig::default().merged(&options).serialise());
        return Ok(());
    }
    if !(cli.frame_ms > 0.0) {
        bail!("--frame-ms must be positive (got {})", cli.frame_ms);
    }

    let samples = parse_trace(&read_trace(&cli.trace)?).context("parsing trace")?;
    let (initial_y, start_ms) = samples
        .first()
        .map_or((0.0, 0.0), |s| (s.y, s.time_ms));
    tracing::info!(samples = samples.len(), "replaying trace");

    let plan = ReplayPlan {
        frame_ms: cli.frame_ms,
        settle_ms: cli.settle_ms,
        realtime: cli.realtime,
    };
    let replay = Replay::new(&options, cli.reduced_motion, initial_y, start_ms);
    let rx = spawn_replay(samples, plan);

    let mut stdout = io::stdout().lock();
    let summary = replay.run(rx, &mut stdout).await?;
    eprintln!(
        "{} samples, {} frames, {} ticks, {} publishes, peak velocity {:.2}",
        summary.samples, summary.frames, summary.ticks_fired, summary.publishes, summary.peak_velocity
    );
    Ok(())
}
