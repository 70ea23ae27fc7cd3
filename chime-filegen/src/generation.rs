//! A single output stream: its naming, rotation settings, and open handle.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Component, Path, PathBuf};

use chime_fs::LogFile;
use thiserror::Error;

use crate::validity::Validity;

/// When to start a new generation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationPolicy {
    /// One file forever, no suffix.
    None,
    /// One file per process: suffix `.#<pid>`.
    ByProcessId,
    /// One file per civil day (UTC): suffix `.YYYYMMDD`.
    ByDay,
    /// One file per ISO week: suffix `.YYYYwWW` with the ISO numbering year.
    ByWeek,
    /// One file per civil month: suffix `.YYYYMM`.
    ByMonth,
    /// One file per civil year: suffix `.YYYY`.
    ByYear,
    /// One file per 24 hours of stamp space: suffix `.a<bucket start>`.
    ByAge,
}

/// Per-stream switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenFlags {
    /// Whether the stream writes at all. A disabled stream holds no file
    /// open.
    pub enabled: bool,
    /// Whether the bare name is kept as a hard link to the current
    /// generation. Meaningless under [`RotationPolicy::None`], where the
    /// bare name is the generation.
    pub maintain_link: bool,
}

impl Default for GenFlags {
    /// Registration defaults: link maintenance on, writing off until the
    /// stream is configured.
    fn default() -> Self {
        Self {
            enabled: false,
            maintain_link: true,
        }
    }
}

/// Errors from stream (re)configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("file name prefix is empty")]
    EmptyPrefix,
    #[error("base file name is empty")]
    EmptyBaseName,
    #[error("base file name {0:?} escapes the prefix directory")]
    ParentTraversal(String),
}

/// Check a prefix and base name before they are allowed to name files.
///
/// The base name may contain subdirectory components but must not climb out
/// of the prefix with `..`.
pub fn validate_file_ref(prefix: &OsStr, base: &str) -> Result<(), ValidationError> {
    if prefix.is_empty() {
        return Err(ValidationError::EmptyPrefix);
    }
    if base.is_empty() {
        return Err(ValidationError::EmptyBaseName);
    }
    if Path::new(base)
        .components()
        .any(|c| c == Component::ParentDir)
    {
        return Err(ValidationError::ParentTraversal(base.to_string()));
    }
    Ok(())
}

/// A live handle together with the validity it was opened under.
///
/// The pairing is deliberate: a handle can only exist alongside the window
/// that justifies it, so a failed rotation can never leave a stale window
/// claiming an absent file.
pub(crate) struct OpenGeneration {
    pub(crate) file: Box<dyn LogFile>,
    pub(crate) validity: Validity,
}

/// One registered output stream.
///
/// The full file name is the raw concatenation of prefix, base name, and
/// generation suffix; no path separator is inserted. A prefix ending in `/`
/// therefore acts as a directory, anything else as a literal name prefix.
pub struct Generation {
    pub(crate) prefix: OsString,
    pub(crate) base_name: String,
    pub(crate) policy: RotationPolicy,
    pub(crate) flags: GenFlags,
    pub(crate) open: Option<OpenGeneration>,
}

impl Generation {
    /// New stream with registration defaults: daily rotation, disabled.
    pub(crate) fn new(prefix: &Path, base_name: &str) -> Self {
        Self {
            prefix: prefix.as_os_str().to_os_string(),
            base_name: base_name.to_string(),
            policy: RotationPolicy::ByDay,
            flags: GenFlags::default(),
            open: None,
        }
    }

    pub fn prefix(&self) -> &OsStr {
        &self.prefix
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn policy(&self) -> RotationPolicy {
        self.policy
    }

    pub fn flags(&self) -> GenFlags {
        self.flags
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Validity the current handle was opened under, if one is open.
    pub fn validity(&self) -> Option<Validity> {
        self.open.as_ref().map(|o| o.validity)
    }

    /// Writer for the current generation file, if one is open.
    pub fn writer(&mut self) -> Option<&mut dyn LogFile> {
        self.open.as_mut().map(|o| &mut *o.file as &mut dyn LogFile)
    }

    /// Path of the bare (unsuffixed) file.
    pub fn bare_path(&self) -> PathBuf {
        self.suffixed_path("")
    }

    pub(crate) fn suffixed_path(&self, suffix: &str) -> PathBuf {
        let mut full = self.prefix.clone();
        full.push(&self.base_name);
        full.push(suffix);
        PathBuf::from(full)
    }

    pub(crate) fn close(&mut self) {
        self.open = None;
    }
}

impl fmt::Debug for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generation")
            .field("prefix", &self.prefix)
            .field("base_name", &self.base_name)
            .field("policy", &self.policy)
            .field("flags", &self.flags)
            .field("open", &self.validity())
            .finish()
    }
}
