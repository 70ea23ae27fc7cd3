//! In-memory filesystem mock with inode-level link tracking.
//!
//! The collision logic in the rotation engine branches on link counts, so
//! this mock models directory entries and inodes separately: hard links are
//! two entries pointing at one inode, and unlinking one of them leaves the
//! other intact. A one-shot fault injection table covers the failure paths
//! that are awkward to provoke on a real filesystem.

use std::collections::{HashMap, HashSet};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::FsError;
use crate::fs::{FileKind, FileMeta, Filesystem, LogFile};

/// Operations whose next invocation can be made to fail.
///
/// `Rename` and `Unlink` faults are keyed on the source path, `Link` faults
/// on the new link path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    Open,
    Stat,
    Rename,
    Unlink,
    Link,
}

#[derive(Debug, Default)]
struct MockState {
    next_ino: u64,
    /// Directory entries: path -> inode number.
    entries: HashMap<PathBuf, u64>,
    /// Inode contents. An unlinked inode stays writable through open handles.
    inodes: HashMap<u64, Vec<u8>>,
    dirs: HashSet<PathBuf>,
    /// One-shot injected failures.
    failures: HashMap<(MockOp, PathBuf), io::ErrorKind>,
}

impl MockState {
    fn alloc_ino(&mut self) -> u64 {
        self.next_ino += 1;
        self.next_ino
    }

    fn nlink(&self, ino: u64) -> u64 {
        self.entries.values().filter(|&&i| i == ino).count() as u64
    }

    fn take_failure(&mut self, op: MockOp, path: &Path) -> Option<io::Error> {
        self.failures
            .remove(&(op, path.to_path_buf()))
            .map(|kind| io::Error::new(kind, "injected failure"))
    }
}

/// Mock filesystem for testing.
/// Cloning creates a new handle to the same underlying data.
#[derive(Debug, Clone, Default)]
pub struct MockFilesystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with its own inode (for test setup).
    pub fn add_file(&self, path: impl Into<PathBuf>, data: &[u8]) {
        let mut st = self.state.lock().unwrap();
        let ino = st.alloc_ino();
        st.inodes.insert(ino, data.to_vec());
        st.entries.insert(path.into(), ino);
    }

    /// Add a directory (for test setup).
    pub fn add_dir(&self, path: impl Into<PathBuf>) {
        self.state.lock().unwrap().dirs.insert(path.into());
    }

    /// Make the next `op` touching `path` fail with the given error kind.
    pub fn fail_once(&self, op: MockOp, path: impl Into<PathBuf>, kind: io::ErrorKind) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert((op, path.into()), kind);
    }

    /// Content behind a path, if present.
    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        let st = self.state.lock().unwrap();
        let ino = st.entries.get(path)?;
        st.inodes.get(ino).cloned()
    }

    /// Inode number behind a path, if present.
    pub fn inode(&self, path: &Path) -> Option<u64> {
        self.state.lock().unwrap().entries.get(path).copied()
    }

    /// All file paths, sorted for deterministic assertions.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut v: Vec<PathBuf> = self
            .state
            .lock()
            .unwrap()
            .entries
            .keys()
            .cloned()
            .collect();
        v.sort();
        v
    }
}

impl Filesystem for MockFilesystem {
    fn open_append(&self, path: &Path) -> Result<Box<dyn LogFile>, FsError> {
        let mut st = self.state.lock().unwrap();
        if let Some(e) = st.take_failure(MockOp::Open, path) {
            return Err(e.into());
        }
        if st.dirs.contains(path) {
            return Err(FsError::Io(io::Error::new(
                io::ErrorKind::Other,
                format!("is a directory: {}", path.display()),
            )));
        }
        let ino = match st.entries.get(path) {
            Some(&ino) => ino,
            None => {
                let ino = st.alloc_ino();
                st.inodes.insert(ino, Vec::new());
                st.entries.insert(path.to_path_buf(), ino);
                ino
            }
        };
        Ok(Box::new(MockFile {
            state: Arc::clone(&self.state),
            ino,
        }))
    }

    fn stat(&self, path: &Path) -> Result<FileMeta, FsError> {
        let mut st = self.state.lock().unwrap();
        if let Some(e) = st.take_failure(MockOp::Stat, path) {
            return Err(e.into());
        }
        if st.dirs.contains(path) {
            return Ok(FileMeta {
                kind: FileKind::Directory,
                nlink: 1,
            });
        }
        match st.entries.get(path) {
            Some(&ino) => Ok(FileMeta {
                kind: FileKind::Regular,
                nlink: st.nlink(ino),
            }),
            None => Err(not_found(path)),
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        let mut st = self.state.lock().unwrap();
        if let Some(e) = st.take_failure(MockOp::Rename, from) {
            return Err(e.into());
        }
        match st.entries.remove(from) {
            Some(ino) => {
                // Replaces any existing entry, like rename(2)
                st.entries.insert(to.to_path_buf(), ino);
                Ok(())
            }
            None => Err(not_found(from)),
        }
    }

    fn unlink(&self, path: &Path) -> Result<(), FsError> {
        let mut st = self.state.lock().unwrap();
        if let Some(e) = st.take_failure(MockOp::Unlink, path) {
            return Err(e.into());
        }
        match st.entries.remove(path) {
            Some(_) => Ok(()),
            None => Err(not_found(path)),
        }
    }

    fn hard_link(&self, original: &Path, link: &Path) -> Result<(), FsError> {
        let mut st = self.state.lock().unwrap();
        if let Some(e) = st.take_failure(MockOp::Link, link) {
            return Err(e.into());
        }
        if st.entries.contains_key(link) || st.dirs.contains(link) {
            return Err(FsError::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("link target exists: {}", link.display()),
            )));
        }
        match st.entries.get(original).copied() {
            Some(ino) => {
                st.entries.insert(link.to_path_buf(), ino);
                Ok(())
            }
            None => Err(not_found(original)),
        }
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), FsError> {
        self.state.lock().unwrap().dirs.insert(path.to_path_buf());
        Ok(())
    }
}

fn not_found(path: &Path) -> FsError {
    FsError::Io(io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file: {}", path.display()),
    ))
}

/// Write handle into a mock inode.
#[derive(Debug)]
struct MockFile {
    state: Arc<Mutex<MockState>>,
    ino: u64,
}

impl Write for MockFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut st = self.state.lock().unwrap();
        match st.inodes.get_mut(&self.ino) {
            Some(data) => {
                data.extend_from_slice(buf);
                Ok(buf.len())
            }
            None => Err(io::Error::new(io::ErrorKind::Other, "inode dropped")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FsErrorKind;

    #[test]
    fn test_mock_open_creates_file() {
        let fs = MockFilesystem::new();
        let path = PathBuf::from("/stats/loopstats");

        let mut f = fs.open_append(&path).expect("open");
        f.write_all(b"line\n").expect("write");

        assert_eq!(fs.contents(&path), Some(b"line\n".to_vec()));
    }

    #[test]
    fn test_mock_open_appends_to_existing() {
        let fs = MockFilesystem::new();
        let path = PathBuf::from("/stats/loopstats");
        fs.add_file(&path, b"old\n");

        let mut f = fs.open_append(&path).expect("open");
        f.write_all(b"new\n").expect("write");

        assert_eq!(fs.contents(&path), Some(b"old\nnew\n".to_vec()));
    }

    #[test]
    fn test_mock_open_directory_fails() {
        let fs = MockFilesystem::new();
        fs.add_dir("/stats");

        let err = fs.open_append(Path::new("/stats")).err().expect("must fail");
        assert_eq!(err.kind(), FsErrorKind::Other);
    }

    #[test]
    fn test_mock_stat_missing_is_not_found() {
        let fs = MockFilesystem::new();
        let err = fs.stat(Path::new("/absent")).expect_err("must fail");
        assert_eq!(err.kind(), FsErrorKind::NotFound);
    }

    #[test]
    fn test_mock_stat_regular_file() {
        let fs = MockFilesystem::new();
        fs.add_file("/f", b"x");

        let meta = fs.stat(Path::new("/f")).expect("stat");
        assert!(meta.is_regular());
        assert_eq!(meta.nlink, 1);
    }

    #[test]
    fn test_mock_stat_directory() {
        let fs = MockFilesystem::new();
        fs.add_dir("/stats");

        let meta = fs.stat(Path::new("/stats")).expect("stat");
        assert_eq!(meta.kind, FileKind::Directory);
    }

    #[test]
    fn test_mock_hard_link_shares_inode() {
        let fs = MockFilesystem::new();
        fs.add_file("/f", b"x");

        fs.hard_link(Path::new("/f"), Path::new("/g")).expect("link");

        assert_eq!(fs.inode(Path::new("/f")), fs.inode(Path::new("/g")));
        assert_eq!(fs.stat(Path::new("/f")).expect("stat").nlink, 2);
        assert_eq!(fs.contents(Path::new("/g")), Some(b"x".to_vec()));
    }

    #[test]
    fn test_mock_hard_link_existing_target() {
        let fs = MockFilesystem::new();
        fs.add_file("/f", b"x");
        fs.add_file("/g", b"y");

        let err = fs
            .hard_link(Path::new("/f"), Path::new("/g"))
            .expect_err("must fail");
        assert_eq!(err.kind(), FsErrorKind::AlreadyExists);
    }

    #[test]
    fn test_mock_hard_link_missing_original() {
        let fs = MockFilesystem::new();
        let err = fs
            .hard_link(Path::new("/f"), Path::new("/g"))
            .expect_err("must fail");
        assert_eq!(err.kind(), FsErrorKind::NotFound);
    }

    #[test]
    fn test_mock_rename_preserves_inode() {
        let fs = MockFilesystem::new();
        fs.add_file("/a", b"x");
        let ino = fs.inode(Path::new("/a"));

        fs.rename(Path::new("/a"), Path::new("/b")).expect("rename");

        assert_eq!(fs.inode(Path::new("/a")), None);
        assert_eq!(fs.inode(Path::new("/b")), ino);
    }

    #[test]
    fn test_mock_rename_replaces_target() {
        let fs = MockFilesystem::new();
        fs.add_file("/a", b"new");
        fs.add_file("/b", b"old");

        fs.rename(Path::new("/a"), Path::new("/b")).expect("rename");

        assert_eq!(fs.contents(Path::new("/b")), Some(b"new".to_vec()));
        assert_eq!(fs.paths(), vec![PathBuf::from("/b")]);
    }

    #[test]
    fn test_mock_unlink_keeps_other_link() {
        let fs = MockFilesystem::new();
        fs.add_file("/f", b"x");
        fs.hard_link(Path::new("/f"), Path::new("/g")).expect("link");

        fs.unlink(Path::new("/f")).expect("unlink");

        assert_eq!(fs.contents(Path::new("/f")), None);
        assert_eq!(fs.contents(Path::new("/g")), Some(b"x".to_vec()));
        assert_eq!(fs.stat(Path::new("/g")).expect("stat").nlink, 1);
    }

    #[test]
    fn test_mock_unlink_missing_is_not_found() {
        let fs = MockFilesystem::new();
        let err = fs.unlink(Path::new("/absent")).expect_err("must fail");
        assert_eq!(err.kind(), FsErrorKind::NotFound);
    }

    #[test]
    fn test_mock_write_survives_unlink() {
        // Open handles keep writing into the inode after the last entry is
        // gone, matching Unix unlink semantics
        let fs = MockFilesystem::new();
        let path = PathBuf::from("/f");

        let mut f = fs.open_append(&path).expect("open");
        fs.unlink(&path).expect("unlink");
        f.write_all(b"orphan\n").expect("write");

        assert_eq!(fs.contents(&path), None);
    }

    #[test]
    fn test_mock_fail_once_is_consumed() {
        let fs = MockFilesystem::new();
        let path = PathBuf::from("/f");
        fs.fail_once(MockOp::Open, &path, io::ErrorKind::PermissionDenied);

        let err = fs.open_append(&path).err().expect("injected");
        assert_eq!(err.kind(), FsErrorKind::PermissionDenied);

        // Second attempt goes through
        fs.open_append(&path).expect("open");
    }

    #[test]
    fn test_mock_clone_shares_state() {
        let fs = MockFilesystem::new();
        let view = fs.clone();
        fs.add_file("/f", b"x");
        assert_eq!(view.contents(Path::new("/f")), Some(b"x".to_vec()));
    }
}
