//! Resolution of name collisions at the bare (unsuffixed) path.
//!
//! Before a fresh generation gets linked to the bare name, whatever already
//! sits there has to move out of the way. The one hard rule: never destroy
//! the sole link to existing data. A file whose data is reachable through
//! another link can simply lose this entry; a sole copy gets renamed to a
//! numbered backup instead.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chime_fs::{FileKind, FsError, FsErrorKind, Filesystem};

use crate::suffix::SUFFIX_SEP;

/// What to do about the current occupant of a bare path.
#[derive(Debug)]
pub enum CollisionAction {
    /// Nothing occupies the path.
    Proceed,
    /// The occupant is the sole link to its data; rename it to this backup
    /// path so the data survives.
    RenameAside(PathBuf),
    /// The occupant has other links; removing this entry loses nothing.
    Unlink,
    /// The occupant was left in place; report why.
    WarnOnly(CollisionWarning),
}

/// Why a collision was left unresolved.
#[derive(Debug)]
pub enum CollisionWarning {
    /// The occupant is not a regular file.
    NotRegular(FileKind),
    /// The occupant could not be examined.
    StatFailed(FsError),
}

/// Decides collision outcomes and numbers the backups it hands out.
///
/// One resolver serves every stream in a registry, so backup names stay
/// unique across repeated rotations within a process lifetime.
#[derive(Debug, Default)]
pub struct CollisionResolver {
    next_seq: u64,
}

impl CollisionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide what to do about whatever currently occupies `bare`.
    pub fn resolve<F: Filesystem>(&mut self, fs: &F, bare: &Path, pid: u32) -> CollisionAction {
        let meta = match fs.stat(bare) {
            Ok(meta) => meta,
            Err(e) if e.kind() == FsErrorKind::NotFound => return CollisionAction::Proceed,
            Err(e) => return CollisionAction::WarnOnly(CollisionWarning::StatFailed(e)),
        };
        if !meta.is_regular() {
            return CollisionAction::WarnOnly(CollisionWarning::NotRegular(meta.kind));
        }
        if meta.nlink <= 1 {
            let seq = self.next_seq;
            self.next_seq += 1;
            CollisionAction::RenameAside(backup_path(bare, pid, seq))
        } else {
            CollisionAction::Unlink
        }
    }
}

/// Backup name for a renamed-aside sole copy: `<bare>.<pid>C<seq>`.
fn backup_path(bare: &Path, pid: u32, seq: u64) -> PathBuf {
    let mut name = OsString::from(bare);
    name.push(format!("{}{}C{}", SUFFIX_SEP, pid, seq));
    PathBuf::from(name)
}
