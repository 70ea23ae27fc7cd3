//! Filesystem abstraction for chime.
//!
//! This crate provides:
//! - `Filesystem` trait covering the calls the rotation engine makes
//! - `FsError` with a classified kind so callers can branch on what went wrong
//! - `RealFilesystem` backed by std::fs
//! - Link-aware `MockFilesystem` for deterministic tests

pub mod error;
pub mod fs;
pub mod mock;

pub use error::{FsError, FsErrorKind};
pub use fs::{FileKind, FileMeta, Filesystem, LogFile, RealFilesystem};
pub use mock::{MockFilesystem, MockOp};
