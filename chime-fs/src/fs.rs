//! Filesystem trait and the real implementation.
//!
//! The engine only needs a handful of calls: append-open, stat with link
//! counts, rename, unlink, hard link, and directory creation. Keeping the
//! trait this narrow is what makes the in-memory mock faithful.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::error::FsError;

/// Append-only write handle for an open generation file.
///
/// Blanket-implemented for anything writable and sendable, so real `File`
/// handles and mock buffers both satisfy it.
pub trait LogFile: Write + Send {}

impl<T: Write + Send> LogFile for T {}

/// What kind of object a path resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Regular,
    Directory,
    Other,
}

/// Subset of stat output the engine cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMeta {
    pub kind: FileKind,
    /// Number of hard links to the underlying inode.
    pub nlink: u64,
}

impl FileMeta {
    pub fn is_regular(&self) -> bool {
        self.kind == FileKind::Regular
    }
}

/// Trait for filesystem operations.
/// Abstracted for testing with mock implementations.
pub trait Filesystem: Send + Sync {
    /// Open a file for appending, creating it if it doesn't exist.
    /// Parent directories are not created.
    fn open_append(&self, path: &Path) -> Result<Box<dyn LogFile>, FsError>;

    /// Stat a path, following symlinks.
    fn stat(&self, path: &Path) -> Result<FileMeta, FsError>;

    /// Rename a file within its filesystem, replacing any existing target.
    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError>;

    /// Remove one directory entry for a file.
    fn unlink(&self, path: &Path) -> Result<(), FsError>;

    /// Create an additional hard link `link` to `original`.
    fn hard_link(&self, original: &Path, link: &Path) -> Result<(), FsError>;

    /// Create directory and parents if needed.
    fn create_dir_all(&self, path: &Path) -> Result<(), FsError>;
}

/// Real filesystem implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFilesystem;

impl Filesystem for RealFilesystem {
    fn open_append(&self, path: &Path) -> Result<Box<dyn LogFile>, FsError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Box::new(file))
    }

    fn stat(&self, path: &Path) -> Result<FileMeta, FsError> {
        let meta = fs::metadata(path)?;
        let kind = if meta.is_file() {
            FileKind::Regular
        } else if meta.is_dir() {
            FileKind::Directory
        } else {
            FileKind::Other
        };
        Ok(FileMeta {
            kind,
            nlink: nlink_of(&meta),
        })
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        fs::rename(from, to)?;
        Ok(())
    }

    fn unlink(&self, path: &Path) -> Result<(), FsError> {
        fs::remove_file(path)?;
        Ok(())
    }

    fn hard_link(&self, original: &Path, link: &Path) -> Result<(), FsError> {
        fs::hard_link(original, link)?;
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), FsError> {
        fs::create_dir_all(path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn nlink_of(meta: &fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    meta.nlink()
}

#[cfg(not(unix))]
fn nlink_of(_meta: &fs::Metadata) -> u64 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FsErrorKind;
    use tempfile::tempdir;

    #[test]
    fn test_real_open_append_creates() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("loopstats");

        let mut f = RealFilesystem.open_append(&path).expect("open");
        f.write_all(b"one\n").expect("write");
        drop(f);

        assert_eq!(fs::read_to_string(&path).expect("read"), "one\n");
    }

    #[test]
    fn test_real_open_append_appends_across_handles() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("loopstats");

        let mut f = RealFilesystem.open_append(&path).expect("open");
        f.write_all(b"one\n").expect("write");
        drop(f);
        let mut f = RealFilesystem.open_append(&path).expect("reopen");
        f.write_all(b"two\n").expect("write");
        drop(f);

        assert_eq!(fs::read_to_string(&path).expect("read"), "one\ntwo\n");
    }

    #[test]
    fn test_real_open_append_missing_dir_is_not_found() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("no-such-dir").join("loopstats");

        let err = RealFilesystem.open_append(&path).err().expect("must fail");
        assert_eq!(err.kind(), FsErrorKind::NotFound);
    }

    #[test]
    fn test_real_stat_regular_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("f");
        fs::write(&path, b"x").expect("write");

        let meta = RealFilesystem.stat(&path).expect("stat");
        assert!(meta.is_regular());
        assert_eq!(meta.nlink, 1);
    }

    #[test]
    fn test_real_stat_directory() {
        let dir = tempdir().expect("tempdir");
        let meta = RealFilesystem.stat(dir.path()).expect("stat");
        assert_eq!(meta.kind, FileKind::Directory);
        assert!(!meta.is_regular());
    }

    #[test]
    fn test_real_stat_missing_is_not_found() {
        let dir = tempdir().expect("tempdir");
        let err = RealFilesystem
            .stat(&dir.path().join("absent"))
            .expect_err("must fail");
        assert_eq!(err.kind(), FsErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_real_hard_link_bumps_nlink() {
        use std::os::unix::fs::MetadataExt;

        let dir = tempdir().expect("tempdir");
        let original = dir.path().join("f");
        let link = dir.path().join("g");
        fs::write(&original, b"x").expect("write");

        RealFilesystem.hard_link(&original, &link).expect("link");

        let meta = RealFilesystem.stat(&original).expect("stat");
        assert_eq!(meta.nlink, 2);
        assert_eq!(
            fs::metadata(&original).expect("meta").ino(),
            fs::metadata(&link).expect("meta").ino()
        );
    }

    #[test]
    fn test_real_hard_link_existing_target() {
        let dir = tempdir().expect("tempdir");
        let original = dir.path().join("f");
        let link = dir.path().join("g");
        fs::write(&original, b"x").expect("write");
        fs::write(&link, b"y").expect("write");

        let err = RealFilesystem
            .hard_link(&original, &link)
            .expect_err("must fail");
        assert_eq!(err.kind(), FsErrorKind::AlreadyExists);
    }

    #[test]
    fn test_real_rename_moves_file() {
        let dir = tempdir().expect("tempdir");
        let from = dir.path().join("a");
        let to = dir.path().join("b");
        fs::write(&from, b"x").expect("write");

        RealFilesystem.rename(&from, &to).expect("rename");

        assert!(!from.exists());
        assert_eq!(fs::read_to_string(&to).expect("read"), "x");
    }

    #[test]
    fn test_real_unlink_removes_entry() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("a");
        fs::write(&path, b"x").expect("write");

        RealFilesystem.unlink(&path).expect("unlink");
        assert!(!path.exists());
    }

    #[test]
    fn test_real_unlink_missing_is_not_found() {
        let dir = tempdir().expect("tempdir");
        let err = RealFilesystem
            .unlink(&dir.path().join("absent"))
            .expect_err("must fail");
        assert_eq!(err.kind(), FsErrorKind::NotFound);
    }

    #[test]
    fn test_real_create_dir_all() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("a").join("b");
        RealFilesystem.create_dir_all(&nested).expect("mkdir");
        assert!(nested.is_dir());
    }
}
