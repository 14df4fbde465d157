//! Observability sink for Judge calls.
//!
//! Every Judge invocation is recorded (call name, inputs, outputs) to a JSONL
//! run log for later inspection. Recording is fire-and-forget: a sink failure
//! is logged and swallowed, never propagated into the convergence loop.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{JudgrError, Result};

/// One recorded Judge call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    /// Operation name, e.g. "extract_actions"
    pub call: String,
    /// System-level instruction passed to the Judge
    pub instruction: String,
    /// Composed message body
    pub message: String,
    /// Raw model output, before verdict parsing
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

impl CallRecord {
    /// Create a record stamped with the current time.
    pub fn new(
        call: impl Into<String>,
        instruction: impl Into<String>,
        message: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            call: call.into(),
            instruction: instruction.into(),
            message: message.into(),
            response: response.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Sink for Judge call records.
pub trait TrackingSink: Send + Sync {
    /// Record one Judge call. Must not be required for correctness.
    fn record(&self, record: &CallRecord) -> Result<()>;
}

/// JSONL-backed tracker: one run file per process, append-only.
pub struct JsonlTracker {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlTracker {
    /// Open a new run log under `base_dir/<project>/run-<timestamp>.jsonl`.
    pub fn open(base_dir: impl AsRef<Path>, project: &str) -> Result<Self> {
        let dir = base_dir.as_ref().join(project);
        fs::create_dir_all(&dir)?;

        let path = dir.join(format!("run-{}.jsonl", Utc::now().format("%Y%m%dT%H%M%S%f")));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Path of the run log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TrackingSink for JsonlTracker {
    fn record(&self, record: &CallRecord) -> Result<()> {
        let line = serde_json::to_string(record)?;
        let mut file = self
            .file
            .lock()
            .map_err(|e| JudgrError::Tracking(e.to_string()))?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

/// Tracker that drops every record; used when tracking is disabled.
pub struct NoopTracker;

impl TrackingSink for NoopTracker {
    fn record(&self, _record: &CallRecord) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufRead;
    use tempfile::TempDir;

    #[test]
    fn test_call_record_new() {
        let record = CallRecord::new("extract_actions", "instr", "msg", "resp");
        assert_eq!(record.call, "extract_actions");
        assert_eq!(record.instruction, "instr");
        assert_eq!(record.message, "msg");
        assert_eq!(record.response, "resp");
    }

    #[test]
    fn test_jsonl_tracker_appends_records() {
        let temp = TempDir::new().unwrap();
        let tracker = JsonlTracker::open(temp.path(), "eval-convergence").unwrap();

        tracker
            .record(&CallRecord::new("extract_actions", "i1", "m1", "r1"))
            .unwrap();
        tracker
            .record(&CallRecord::new("extract_actions", "i2", "m2", "r2"))
            .unwrap();

        let file = File::open(tracker.path()).unwrap();
        let lines: Vec<String> = std::io::BufReader::new(file)
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines.len(), 2);

        let first: CallRecord = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(first.message, "m1");
        let second: CallRecord = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(second.response, "r2");
    }

    #[test]
    fn test_jsonl_tracker_creates_project_dir() {
        let temp = TempDir::new().unwrap();
        let tracker = JsonlTracker::open(temp.path(), "my-project").unwrap();
        assert!(tracker.path().starts_with(temp.path().join("my-project")));
    }

    #[test]
    fn test_noop_tracker() {
        let tracker = NoopTracker;
        let record = CallRecord::new("extract_actions", "i", "m", "r");
        assert!(tracker.record(&record).is_ok());
    }
}
