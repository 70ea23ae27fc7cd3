//! Chime stats writer binary.
//!
//! Entry point for the `chime-stats` command-line tool.

use std::process::ExitCode;

use chime_clock::SystemClock;
use chime_fs::RealFilesystem;
use chime_log::{Severity, StderrLogger};
use chime_stats::exit::{codes, exit_code};
use chime_stats::{execute_run, Cli, RealSleeper, ShutdownFlag};
use clap::Parser;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up shutdown handler for graceful termination on Ctrl+C
    let shutdown = ShutdownFlag::new();

    let clock = SystemClock;
    let fs = RealFilesystem;
    let sleeper = RealSleeper::new();
    let logger = StderrLogger::new(Severity::from_count(cli.verbose));

    match execute_run(
        &cli,
        std::process::id(),
        &clock,
        &fs,
        &sleeper,
        &shutdown,
        &logger,
    ) {
        Ok(result) => {
            println!(
                "Wrote {} records in {} cycles, opened {} generations",
                result.records_written, result.cycles, result.generations_opened
            );
            ExitCode::from(codes::SUCCESS as u8)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(exit_code(&e) as u8)
        }
    }
}
