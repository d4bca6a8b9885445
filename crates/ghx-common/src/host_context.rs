// HostContext: directory resolution for the executor's data home and the
// per-run report tree.

use crate::config_store::GhxSettings;
use crate::constants::{self, WellKnownDirectory};

use std::path::PathBuf;
use std::sync::Arc;

/// Resolves where the executor keeps its data.
///
/// Report directories are nested per run, job and step:
///
/// ```text
/// <home>/runs/<run_id>/
///     workflow_run.json, workflow.yaml
///     jobs/<job_id>/
///         job_run.json
///         steps/<step_id>/
///             step_run.json, summary.md
/// ```
#[derive(Debug)]
pub struct HostContext {
    settings: GhxSettings,
}

impl HostContext {
    pub fn new(settings: GhxSettings) -> Arc<Self> {
        Arc::new(Self { settings })
    }

    /// Host context rooted at an explicit home directory (tests, embedding).
    pub fn with_home(home: impl Into<PathBuf>) -> Arc<Self> {
        Self::new(GhxSettings {
            home: home.into(),
            ..GhxSettings::default()
        })
    }

    pub fn settings(&self) -> &GhxSettings {
        &self.settings
    }

    /// Resolve the path for a well-known directory.
    pub fn get_directory(&self, directory: WellKnownDirectory) -> PathBuf {
        let home = self.settings.home.clone();
        match directory {
            WellKnownDirectory::Home => home,
            WellKnownDirectory::Runs => home.join(constants::path::RUNS_DIRECTORY),
            WellKnownDirectory::Secrets => home.join(constants::path::SECRETS_DIRECTORY),
            WellKnownDirectory::Inputs => home.join(constants::path::INPUTS_DIRECTORY),
            WellKnownDirectory::Temp => home.join(constants::path::TEMP_DIRECTORY),
        }
    }

    pub fn secrets_file(&self) -> PathBuf {
        self.get_directory(WellKnownDirectory::Secrets)
            .join(constants::path::SECRETS_FILE)
    }

    pub fn inputs_file(&self) -> PathBuf {
        self.get_directory(WellKnownDirectory::Inputs)
            .join(constants::path::INPUTS_FILE)
    }

    /// Report directory of a workflow run.
    pub fn workflow_run_path(&self, run_id: &str) -> PathBuf {
        self.get_directory(WellKnownDirectory::Runs)
            .join(safe_file_name(run_id))
    }

    /// Report directory of a job run inside its workflow run.
    pub fn job_run_path(&self, run_id: &str, job_id: &str) -> PathBuf {
        self.workflow_run_path(run_id)
            .join(constants::path::JOBS_DIRECTORY)
            .join(safe_file_name(job_id))
    }

    /// Report directory of a step run inside its job run.
    ///
    /// Keyed by step ID only: steps without an ID all share `steps/_`, so the
    /// last one retired overwrites the others' reports.
    pub fn step_run_path(&self, run_id: &str, job_id: &str, step_id: &str) -> PathBuf {
        self.job_run_path(run_id, job_id)
            .join(constants::path::STEPS_DIRECTORY)
            .join(safe_file_name(step_id))
    }
}

/// Replace characters that are invalid in file names with `_`. An empty
/// name becomes `_` so it still yields its own directory.
fn safe_file_name(name: &str) -> String {
    if name.is_empty() {
        return "_".to_string();
    }
    let invalid: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
    name.chars()
        .map(|ch| {
            if invalid.contains(&ch) || (ch as u32) < 0x20 {
                '_'
            } else {
                ch
            }
        })
        .collect()
}
