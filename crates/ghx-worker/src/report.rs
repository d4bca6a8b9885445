// Run reports: the `{result, run}` records persisted when a workflow, job or
// step run retires, and the writer seam they go through.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use ghx_sdk::IOUtil;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// How a run went, as observed by whoever executed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Whether the run was executed at all.
    pub ran: bool,

    pub started_at: DateTime<Utc>,

    pub completed_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunResult {
    /// A run that executed to completion.
    pub fn ran() -> Self {
        let now = Utc::now();
        Self {
            ran: true,
            started_at: now,
            completed_at: now,
            error: None,
        }
    }

    /// A run that executed and stopped on an error.
    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::ran()
        }
    }

    /// A run that was never executed.
    pub fn skipped() -> Self {
        Self {
            ran: false,
            ..Self::ran()
        }
    }

    pub fn started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        self
    }
}

impl Default for RunResult {
    fn default() -> Self {
        Self::ran()
    }
}

/// A run record together with the result its executor reported.
#[derive(Debug, Serialize)]
pub struct Report<'a, T> {
    pub result: &'a RunResult,
    pub run: &'a T,
}

impl<'a, T: Serialize> Report<'a, T> {
    pub fn new(result: &'a RunResult, run: &'a T) -> Self {
        Self { result, run }
    }

    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Destination of report artifacts.
pub trait ReportWriter: Send + Sync {
    /// Write a JSON document.
    fn write_json(&self, path: &Path, value: &serde_json::Value) -> Result<()>;

    /// Write raw bytes.
    fn write_file(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Copy an existing file verbatim.
    fn copy_file(&self, src: &Path, dst: &Path) -> Result<()>;
}

/// Writes reports to the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FsReportWriter;

impl ReportWriter for FsReportWriter {
    fn write_json(&self, path: &Path, value: &serde_json::Value) -> Result<()> {
        IOUtil::save_object(path, value)
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> Result<()> {
        IOUtil::write_file(path, data)
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> Result<()> {
        IOUtil::copy_file(src, dst)
    }
}

/// One artifact captured by [`MemoryReportWriter`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEntry {
    Json(PathBuf, serde_json::Value),
    File(PathBuf, Vec<u8>),
    Copy(PathBuf, PathBuf),
}

impl ReportEntry {
    /// Destination path of the artifact.
    pub fn path(&self) -> &Path {
        match self {
            ReportEntry::Json(path, _) | ReportEntry::File(path, _) => path,
            ReportEntry::Copy(_, dst) => dst,
        }
    }
}

/// Keeps artifacts in memory.
#[derive(Debug, Default)]
pub struct MemoryReportWriter {
    entries: Mutex<Vec<ReportEntry>>,
}

impl MemoryReportWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<ReportEntry> {
        self.entries.lock().clone()
    }

    /// Artifacts whose destination file name is `name`.
    pub fn named(&self, name: &str) -> Vec<ReportEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.path().file_name().is_some_and(|n| n == name))
            .cloned()
            .collect()
    }
}

impl ReportWriter for MemoryReportWriter {
    fn write_json(&self, path: &Path, value: &serde_json::Value) -> Result<()> {
        self.entries
            .lock()
            .push(ReportEntry::Json(path.to_path_buf(), value.clone()));
        Ok(())
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> Result<()> {
        self.entries
            .lock()
            .push(ReportEntry::File(path.to_path_buf(), data.to_vec()));
        Ok(())
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> Result<()> {
        self.entries
            .lock()
            .push(ReportEntry::Copy(src.to_path_buf(), dst.to_path_buf()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{Workflow, WorkflowRun};

    #[test]
    fn run_result_constructors() {
        assert!(RunResult::ran().ran);
        assert!(RunResult::ran().error.is_none());
        assert!(!RunResult::skipped().ran);

        let failed = RunResult::failed("exit code 2");
        assert!(failed.ran);
        assert_eq!(failed.error.as_deref(), Some("exit code 2"));
    }

    #[test]
    fn report_serializes_result_and_run() {
        let result = RunResult::failed("boom");
        let run = WorkflowRun::new("12", Workflow::default());
        let value = Report::new(&result, &run).to_value().unwrap();

        assert_eq!(value["result"]["ran"], serde_json::json!(true));
        assert_eq!(value["result"]["error"], serde_json::json!("boom"));
        assert_eq!(value["run"]["run_id"], serde_json::json!("12"));
        assert_eq!(value["run"]["conclusion"], serde_json::json!("success"));
    }

    #[test]
    fn fs_writer_writes_and_copies() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FsReportWriter;

        let json_path = dir.path().join("runs").join("1").join("workflow_run.json");
        writer
            .write_json(&json_path, &serde_json::json!({"ok": true}))
            .unwrap();
        let back: serde_json::Value = IOUtil::load_object(&json_path).unwrap();
        assert_eq!(back["ok"], serde_json::json!(true));

        let src = dir.path().join("ci.yml");
        std::fs::write(&src, "name: CI\n").unwrap();
        let dst = dir.path().join("runs").join("1").join("workflow.yaml");
        writer.copy_file(&src, &dst).unwrap();
        assert_eq!(std::fs::read_to_string(&dst).unwrap(), "name: CI\n");

        let summary = dir.path().join("summary.md");
        writer.write_file(&summary, b"# Done").unwrap();
        assert_eq!(std::fs::read(&summary).unwrap(), b"# Done");
    }

    #[test]
    fn memory_writer_records_entries() {
        let writer = MemoryReportWriter::new();
        writer
            .write_json(Path::new("/r/job_run.json"), &serde_json::json!({}))
            .unwrap();
        writer.write_file(Path::new("/r/summary.md"), b"x").unwrap();

        assert_eq!(writer.entries().len(), 2);
        assert_eq!(writer.named("summary.md").len(), 1);
        assert!(writer.named("step_run.json").is_empty());
    }
}
