//! Append-only status.jsonl heartbeat output.
//!
//! One JSON line per status interval tracking the writer's progress:
//! machine-readable, append-only, survives restarts.

use std::io::Write;
use std::path::{Path, PathBuf};

use chime_fs::{Filesystem, FsError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from status writing.
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("failed to append status: {0}")]
    Append(#[source] FsError),
}

/// A single heartbeat line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLine {
    /// Unix epoch seconds when this cycle completed.
    pub timestamp: i64,

    /// Write cycle number (1-indexed).
    pub cycle: u64,

    /// Cumulative records written across all streams.
    pub records_written: u64,

    /// Cumulative generation files opened.
    pub generations_opened: u64,
}

impl StatusLine {
    pub fn new(timestamp: i64, cycle: u64, records_written: u64, generations_opened: u64) -> Self {
        Self {
            timestamp,
            cycle,
            records_written,
            generations_opened,
        }
    }

    /// Serialize to a JSON line (no trailing newline).
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("StatusLine serialization should never fail")
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Writer for the append-only status.jsonl file.
pub struct StatusWriter<F: Filesystem> {
    fs: F,
    path: PathBuf,
}

impl<F: Filesystem> StatusWriter<F> {
    pub fn new(fs: F, path: PathBuf) -> Self {
        Self { fs, path }
    }

    /// Path of the status file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one status line, JSON object plus newline. The file is opened
    /// fresh per append so a restart or external rotation cannot strand a
    /// stale handle.
    pub fn append(&self, status: &StatusLine) -> Result<(), StatusError> {
        let line = format!("{}\n", status.to_json());
        let mut file = self.fs.open_append(&self.path).map_err(StatusError::Append)?;
        file.write_all(line.as_bytes())
            .map_err(|e| StatusError::Append(FsError::Io(e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chime_fs::MockFilesystem;

    fn content(fs: &MockFilesystem, path: &Path) -> String {
        String::from_utf8(fs.contents(path).expect("file exists")).expect("utf8")
    }

    #[test]
    fn test_status_line_to_json_has_all_fields() {
        let line = StatusLine::new(1_704_067_200, 1, 42, 2);
        let json = line.to_json();
        assert!(json.contains("\"timestamp\":1704067200"));
        assert!(json.contains("\"cycle\":1"));
        assert!(json.contains("\"records_written\":42"));
        assert!(json.contains("\"generations_opened\":2"));
        // Compact single-line JSON
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_status_line_from_json() {
        let json = r#"{"timestamp":1704067200,"cycle":3,"records_written":9,"generations_opened":1}"#;
        let line = StatusLine::from_json(json).expect("parse");
        assert_eq!(line.cycle, 3);
        assert_eq!(line.records_written, 9);
    }

    #[test]
    fn test_status_line_rejects_missing_field() {
        let json = r#"{"timestamp":1000,"cycle":1}"#;
        assert!(StatusLine::from_json(json).is_err());
    }

    #[test]
    fn test_status_writer_appends_lines() {
        let fs = MockFilesystem::new();
        let path = PathBuf::from("/stats/status.jsonl");
        let writer = StatusWriter::new(fs.clone(), path.clone());

        writer.append(&StatusLine::new(1000, 1, 1, 1)).expect("append");
        writer.append(&StatusLine::new(2000, 2, 2, 1)).expect("append");

        let text = content(&fs, &path);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(StatusLine::from_json(lines[1]).expect("parse").cycle, 2);
    }

    #[test]
    fn test_status_writer_survives_restart() {
        let fs = MockFilesystem::new();
        let path = PathBuf::from("/stats/status.jsonl");

        {
            let writer = StatusWriter::new(fs.clone(), path.clone());
            writer.append(&StatusLine::new(1000, 1, 1, 1)).expect("append");
        }
        {
            let writer = StatusWriter::new(fs.clone(), path.clone());
            writer.append(&StatusLine::new(2000, 2, 2, 1)).expect("append");
        }

        assert_eq!(content(&fs, &path).lines().count(), 2);
    }

    #[test]
    fn test_status_writer_path() {
        let fs = MockFilesystem::new();
        let path = PathBuf::from("/var/log/chime/status.jsonl");
        let writer = StatusWriter::new(fs, path.clone());
        assert_eq!(writer.path(), path.as_path());
    }
}
