//! Chime stats writer CLI.
//!
//! This crate provides the command-line interface for the chime statistics
//! writer: argument parsing, the write loop driving the rotation engine, and
//! the status heartbeat.

pub mod cli;
pub mod exit;
pub mod run;
pub mod signal;
pub mod sleeper;
pub mod status;

pub use cli::{
    parse_from, parse_policy, Cli, CliError, DEFAULT_INTERVAL_SEC, DEFAULT_STATS_DIR,
    DEFAULT_STATUS_INTERVAL_SEC, MAX_SECONDS,
};
pub use run::{execute_run, CommandError, CommandResult, RunResult};
pub use signal::{AlwaysShutdown, NeverShutdown, ShutdownCheck, ShutdownFlag};
pub use sleeper::{MockSleeper, RealSleeper, Sleeper};
pub use status::{StatusError, StatusLine, StatusWriter};
