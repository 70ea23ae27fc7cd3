//! CLI argument parsing for the chime stats writer.
//!
//! One flat command: pick the streams, the rotation policy, and the write
//! cadence; everything else is the engine's business.

use std::path::PathBuf;

use chime_filegen::RotationPolicy;
use clap::Parser;
use thiserror::Error;

/// Default directory for stats files.
pub const DEFAULT_STATS_DIR: &str = "/var/log/chime/";

/// Default seconds between record writes.
pub const DEFAULT_INTERVAL_SEC: u64 = 60;

/// Default seconds between status heartbeats.
pub const DEFAULT_STATUS_INTERVAL_SEC: u64 = 300;

/// Largest accepted value for `--status-interval-sec` and `--duration-sec`;
/// both are added to signed 64-bit Unix timestamps in the run loop.
pub const MAX_SECONDS: u64 = i64::MAX as u64;

/// Errors from CLI argument validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("interval-sec must be at least 1, got {0}")]
    InvalidIntervalSec(u64),

    #[error("status-interval-sec must be between 1 and {max}, got {0}", max = MAX_SECONDS)]
    InvalidStatusIntervalSec(u64),

    #[error("duration-sec must be between 1 and {max} when given, got {0}", max = MAX_SECONDS)]
    InvalidDurationSec(u64),

    #[error("at least one stream name is required")]
    NoStreams,

    #[error("stream names must not be empty")]
    EmptyStreamName,
}

/// Chime stats writer - rotating statistics files on a fixed cadence.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "chime-stats")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory for stats files.
    #[arg(short, long, default_value = DEFAULT_STATS_DIR)]
    pub dir: PathBuf,

    /// Stream names to write, one rotating file series each.
    /// Repeat the flag for multiple streams.
    #[arg(short, long, default_value = "loopstats")]
    pub streams: Vec<String>,

    /// Rotation policy: none, pid, day, week, month, year, or age.
    #[arg(long, default_value = "day", value_parser = parse_policy)]
    pub policy: RotationPolicy,

    /// Do not maintain the bare-name hard link to the live generation.
    #[arg(long)]
    pub no_link: bool,

    /// Seconds between record writes.
    #[arg(long, default_value_t = DEFAULT_INTERVAL_SEC)]
    pub interval_sec: u64,

    /// Seconds between status heartbeats.
    #[arg(long, default_value_t = DEFAULT_STATUS_INTERVAL_SEC)]
    pub status_interval_sec: u64,

    /// Duration to run in seconds. If not specified, runs until SIGINT.
    #[arg(long)]
    pub duration_sec: Option<u64>,

    /// Increase verbosity (-v progress, -vv engine tracing).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Validate the arguments.
    pub fn validate(&self) -> Result<(), CliError> {
        if self.interval_sec == 0 {
            return Err(CliError::InvalidIntervalSec(self.interval_sec));
        }
        if self.status_interval_sec == 0 || self.status_interval_sec > MAX_SECONDS {
            return Err(CliError::InvalidStatusIntervalSec(self.status_interval_sec));
        }
        if let Some(d) = self.duration_sec {
            if d == 0 || d > MAX_SECONDS {
                return Err(CliError::InvalidDurationSec(d));
            }
        }
        if self.streams.is_empty() {
            return Err(CliError::NoStreams);
        }
        if self.streams.iter().any(|s| s.is_empty()) {
            return Err(CliError::EmptyStreamName);
        }
        Ok(())
    }

    /// Whether streams keep the bare-name hard link to the live generation.
    pub fn maintain_link(&self) -> bool {
        !self.no_link
    }
}

/// Parse a rotation policy name.
pub fn parse_policy(s: &str) -> Result<RotationPolicy, String> {
    match s {
        "none" => Ok(RotationPolicy::None),
        "pid" => Ok(RotationPolicy::ByProcessId),
        "day" => Ok(RotationPolicy::ByDay),
        "week" => Ok(RotationPolicy::ByWeek),
        "month" => Ok(RotationPolicy::ByMonth),
        "year" => Ok(RotationPolicy::ByYear),
        "age" => Ok(RotationPolicy::ByAge),
        other => Err(format!(
            "unknown policy {:?} (expected none, pid, day, week, month, year, or age)",
            other
        )),
    }
}

/// Parse CLI arguments from an iterator of strings.
/// Useful for testing.
pub fn parse_from<I, T>(iter: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(iter)
}
