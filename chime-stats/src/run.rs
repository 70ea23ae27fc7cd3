//! The write loop: tick the registry, append one record per stream per
//! cycle, heartbeat to status.jsonl.

use std::path::{Path, PathBuf};

use chime_clock::Clock;
use chime_filegen::{FilegenRegistry, GenFlags, RegistryError};
use chime_fs::{Filesystem, FsError};
use chime_log::Logger;
use thiserror::Error;

use crate::cli::{Cli, CliError};
use crate::signal::ShutdownCheck;
use crate::sleeper::Sleeper;
use crate::status::{StatusLine, StatusWriter};

/// Errors from the run command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] CliError),

    #[error("filesystem error: {0}")]
    Filesystem(#[from] FsError),

    #[error("stream configuration error: {0}")]
    Registry(#[from] RegistryError),
}

/// Result type for commands.
pub type CommandResult<T> = Result<T, CommandError>;

/// Counters from a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    /// Write cycles completed.
    pub cycles: u64,

    /// Records appended across all streams.
    pub records_written: u64,

    /// Generation files opened.
    pub generations_opened: u64,
}

/// The stats directory as a file-name prefix: generation paths are built by
/// raw concatenation, so the prefix must end with a separator.
fn dir_prefix(dir: &Path) -> PathBuf {
    let mut s = dir.as_os_str().to_os_string();
    if !s.to_string_lossy().ends_with('/') {
        s.push("/");
    }
    PathBuf::from(s)
}

/// Execute the run command: set up the stream registry and enter the write
/// loop until the duration elapses or shutdown is requested.
pub fn execute_run<C, F, S, H, L>(
    args: &Cli,
    pid: u32,
    clock: &C,
    fs: &F,
    sleeper: &S,
    shutdown: &H,
    logger: &L,
) -> CommandResult<RunResult>
where
    C: Clock,
    F: Filesystem + Clone,
    S: Sleeper,
    H: ShutdownCheck,
    L: Logger,
{
    args.validate()?;

    fs.create_dir_all(&args.dir)?;
    let prefix = dir_prefix(&args.dir);

    logger.info(&format!(
        "starting stats writer: dir={}, streams={:?}, policy={:?}, interval={}s, status_interval={}s",
        args.dir.display(),
        args.streams,
        args.policy,
        args.interval_sec,
        args.status_interval_sec
    ));

    let start = clock.now();
    let flags = GenFlags {
        enabled: true,
        maintain_link: args.maintain_link(),
    };

    let mut registry = FilegenRegistry::new();
    for name in &args.streams {
        registry.register(&prefix, name);
        registry.configure(
            name,
            name,
            args.policy,
            flags,
            start.ntp_sec,
            start.pivot,
            pid,
            fs,
            logger,
        )?;
    }

    for (name, gen) in registry.iter() {
        logger.debug(&format!("stream {} -> {}", name, gen.bare_path().display()));
    }
    // Registry order, not argument order: repeated -s flags collapse to one
    // stream each.
    let stream_names = registry.names();

    let status_writer = StatusWriter::new(fs.clone(), args.dir.join("status.jsonl"));

    run_write_loop(
        &mut registry,
        &stream_names,
        args.interval_sec,
        args.status_interval_sec,
        args.duration_sec,
        start.pivot,
        pid,
        clock,
        fs,
        &status_writer,
        sleeper,
        shutdown,
        logger,
    )
}

#[allow(clippy::too_many_arguments)]
fn run_write_loop<C, F, S, H, L>(
    registry: &mut FilegenRegistry,
    streams: &[String],
    interval_sec: u64,
    status_interval_sec: u64,
    duration_sec: Option<u64>,
    start_ts: i64,
    pid: u32,
    clock: &C,
    fs: &F,
    status_writer: &StatusWriter<F>,
    sleeper: &S,
    shutdown: &H,
    logger: &L,
) -> CommandResult<RunResult>
where
    C: Clock,
    F: Filesystem + Clone,
    S: Sleeper,
    H: ShutdownCheck,
    L: Logger,
{
    // validate() bounds duration-sec and status-interval-sec to i64 range.
    let end_ts = duration_sec.map(|d| start_ts.saturating_add(d as i64));
    let mut last_status_ts = start_ts;

    let mut cycles: u64 = 0;
    let mut records_written: u64 = 0;
    let mut generations_opened: u64 = 0;

    loop {
        if shutdown.should_stop() {
            logger.info("shutdown requested, stopping");
            break;
        }

        let t = clock.now();
        cycles += 1;

        for name in streams {
            let before = registry.get(name).and_then(|g| g.validity());
            registry.tick(name, t.ntp_sec, t.pivot, pid, fs, logger);
            if let Some(gen) = registry.get_mut(name) {
                if gen.is_open() && gen.validity() != before {
                    generations_opened += 1;
                }
                if let Some(writer) = gen.writer() {
                    let line = format!("{} {}\n", t.ntp_sec, cycles);
                    match writer.write_all(line.as_bytes()) {
                        Ok(()) => records_written += 1,
                        Err(e) => logger.warning(&format!("write to {} failed: {}", name, e)),
                    }
                }
            }
        }

        if t.pivot >= last_status_ts.saturating_add(status_interval_sec as i64) {
            let status = StatusLine::new(t.pivot, cycles, records_written, generations_opened);
            if let Err(e) = status_writer.append(&status) {
                logger.warning(&e.to_string());
            }
            logger.info(&format!(
                "cycle={} records={} generations={}",
                cycles, records_written, generations_opened
            ));
            last_status_ts = t.pivot;
        }

        if let Some(end) = end_ts {
            if t.pivot >= end {
                break;
            }
        }

        sleeper.sleep_sec(interval_sec);
    }

    Ok(RunResult {
        cycles,
        records_written,
        generations_opened,
    })
}
