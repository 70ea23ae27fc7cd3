//! Classified filesystem errors.
//!
//! The rotation engine never treats a filesystem failure as fatal. It
//! branches on a small closed set of causes: a missing path is sometimes
//! expected, an existing link target is sometimes fine, and everything else
//! is worth a warning. `FsError::kind` collapses the OS error zoo into that
//! set.

use std::io;

use thiserror::Error;

/// Classified cause of a failed filesystem call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsErrorKind {
    /// The path (or a parent directory) does not exist.
    NotFound,
    /// The caller lacks permission for the operation.
    PermissionDenied,
    /// The target of a creating operation already exists.
    AlreadyExists,
    /// Anything else the OS reported.
    Other,
}

/// Errors from filesystem operations.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FsError {
    /// Classify the error for the engine's branching decisions.
    pub fn kind(&self) -> FsErrorKind {
        match self {
            FsError::Io(e) => match e.kind() {
                io::ErrorKind::NotFound => FsErrorKind::NotFound,
                io::ErrorKind::PermissionDenied => FsErrorKind::PermissionDenied,
                io::ErrorKind::AlreadyExists => FsErrorKind::AlreadyExists,
                _ => FsErrorKind::Other,
            },
        }
    }
}
