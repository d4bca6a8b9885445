// Environment files: the GITHUB_ENV, GITHUB_PATH, GITHUB_OUTPUT and
// GITHUB_STEP_SUMMARY files a step writes to, and folding what it wrote back
// into the execution context once the step has finished.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ghx_common::constants::variables::{self, github};
use ghx_common::VarUtil;
use ghx_sdk::{IOUtil, TraceWriter};

use crate::errors::ContextError;
use crate::execution_context::ExecutionContext;

/// Failure to read or decode an environment file.
#[derive(Debug, thiserror::Error)]
pub enum EnvironmentFileError {
    #[error("invalid line {line} in environment file: '{content}'")]
    InvalidLine { line: usize, content: String },

    #[error("heredoc '{name}' is not terminated by '{delimiter}'")]
    UnterminatedHeredoc { name: String, delimiter: String },

    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

/// A single file a step communicates through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentFile {
    path: PathBuf,
}

impl EnvironmentFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The whole file as text. A missing file reads as empty.
    pub fn raw_data(&self) -> Result<String, EnvironmentFileError> {
        Ok(IOUtil::read_to_string_if_exists(&self.path)?)
    }

    /// Non-blank lines, trimmed.
    pub fn read_lines(&self) -> Result<Vec<String>, EnvironmentFileError> {
        Ok(self
            .raw_data()?
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// `NAME=VALUE` and `NAME<<DELIMITER` entries, in file order.
    pub fn read_data(&self) -> Result<Vec<(String, String)>, EnvironmentFileError> {
        parse_data(&self.raw_data()?)
    }
}

/// Decode `NAME=VALUE` lines and heredoc blocks:
///
/// ```text
/// NAME<<EOF
/// first line
/// second line
/// EOF
/// ```
///
/// A line is a plain assignment when its first `=` comes before any `<<`.
fn parse_data(content: &str) -> Result<Vec<(String, String)>, EnvironmentFileError> {
    let mut entries = Vec::new();
    let mut lines = content.lines().enumerate();

    while let Some((index, line)) = lines.next() {
        if line.trim().is_empty() {
            continue;
        }

        let invalid = || EnvironmentFileError::InvalidLine {
            line: index + 1,
            content: line.to_string(),
        };

        let equals = line.find('=');
        let heredoc = line.find("<<");

        match (equals, heredoc) {
            (Some(eq), h) if h.map_or(true, |h| eq < h) => {
                let name = &line[..eq];
                if name.is_empty() {
                    return Err(invalid());
                }
                entries.push((name.to_string(), line[eq + 1..].to_string()));
            }
            (_, Some(h)) => {
                let name = &line[..h];
                let delimiter = &line[h + 2..];
                if name.is_empty() || delimiter.is_empty() {
                    return Err(invalid());
                }

                let mut value_lines = Vec::new();
                let mut terminated = false;
                for (_, value_line) in lines.by_ref() {
                    if value_line == delimiter {
                        terminated = true;
                        break;
                    }
                    value_lines.push(value_line);
                }
                if !terminated {
                    return Err(EnvironmentFileError::UnterminatedHeredoc {
                        name: name.to_string(),
                        delimiter: delimiter.to_string(),
                    });
                }

                entries.push((name.to_string(), value_lines.join("\n")));
            }
            _ => return Err(invalid()),
        }
    }

    Ok(entries)
}

/// The four files handed to an executed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentFiles {
    pub env: EnvironmentFile,
    pub path: EnvironmentFile,
    pub outputs: EnvironmentFile,
    pub step_summary: EnvironmentFile,
}

impl EnvironmentFiles {
    /// Create four empty files with unique names in `dir`.
    pub fn create(dir: &Path) -> Result<Self> {
        let create = |name: &str| -> Result<EnvironmentFile> {
            let path = dir.join(format!("{}_{}", name, uuid::Uuid::new_v4().as_simple()));
            IOUtil::ensure_file(&path, "")
                .with_context(|| format!("Failed to create {} file", name))?;
            Ok(EnvironmentFile::new(path))
        };

        Ok(Self {
            env: create("env")?,
            path: create("path")?,
            outputs: create("output")?,
            step_summary: create("step_summary")?,
        })
    }

    /// `GITHUB_*` variables pointing the step at these files.
    pub fn env_values(&self) -> Vec<(&'static str, String)> {
        vec![
            (github::ENV, self.env.path.to_string_lossy().to_string()),
            (github::PATH, self.path.path.to_string_lossy().to_string()),
            (github::OUTPUT, self.outputs.path.to_string_lossy().to_string()),
            (
                github::STEP_SUMMARY,
                self.step_summary.path.to_string_lossy().to_string(),
            ),
        ]
    }

    /// Fold what the step wrote into the execution context and the
    /// environment inherited by later steps.
    pub fn process(&self, ctx: &mut ExecutionContext) -> Result<()> {
        if ctx.step_run().is_none() {
            return Err(ContextError::NoActiveStep.into());
        }
        let process_env = ctx.process_env();

        for (name, value) in self.env.read_data().context("Failed to process env file")? {
            tracing::debug!("GITHUB_ENV: {}={}", name, value);
            process_env.set(&name, &value);
            ctx.set_step_env(&name, &value)?;
        }

        let paths = self.path.read_lines().context("Failed to process path file")?;
        if !paths.is_empty() {
            let current = process_env.get(variables::PATH).unwrap_or_default();
            process_env.set(variables::PATH, &VarUtil::append_path(&current, &paths));
            for path in &paths {
                tracing::debug!("GITHUB_PATH: {}", path);
                ctx.add_step_path(path)?;
            }
        }

        for (name, value) in self
            .outputs
            .read_data()
            .context("Failed to process output file")?
        {
            tracing::debug!("GITHUB_OUTPUT: {}={}", name, value);
            ctx.set_step_output(&name, &value)?;
        }

        let summary = self
            .step_summary
            .raw_data()
            .context("Failed to process step summary file")?;
        ctx.set_step_summary(&summary)?;

        Ok(())
    }

    /// Delete the files. Failures are traced, not returned.
    pub fn cleanup(&self, trace: &dyn TraceWriter) {
        for file in [&self.env, &self.path, &self.outputs, &self.step_summary] {
            if let Err(e) = IOUtil::delete_file(&file.path) {
                trace.warning(&format!("{:#}", e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{MemoryReportWriter, RunResult};
    use crate::workflow::{Job, JobRun, Step, StepRun, StepStage, Workflow, WorkflowRun};
    use ghx_common::constants::path::PATH_LIST_SEPARATOR;
    use ghx_common::{HostContext, MemoryEnv, ProcessEnv};
    use ghx_sdk::CollectingTraceWriter;
    use std::sync::Arc;

    fn context_with_step(env: Arc<MemoryEnv>) -> ExecutionContext {
        let mut ctx = ExecutionContext::builder()
            .host(HostContext::with_home("/ghx"))
            .reports(Arc::new(MemoryReportWriter::new()))
            .process_env(env)
            .build();
        ctx.set_workflow(WorkflowRun::new("1", Workflow::default()));
        ctx.set_job(JobRun::new(Job {
            id: "build".to_string(),
            ..Default::default()
        }))
        .unwrap();
        ctx.set_step(StepRun::new(
            Step {
                id: "s1".to_string(),
                ..Default::default()
            },
            StepStage::Main,
        ))
        .unwrap();
        ctx
    }

    #[test]
    fn parse_assignments_and_heredocs() {
        let entries = parse_data("A=1\n\nB=x=y\nMSG<<EOF\nhello\nworld\nEOF\nC=\n").unwrap();
        assert_eq!(
            entries,
            vec![
                ("A".to_string(), "1".to_string()),
                ("B".to_string(), "x=y".to_string()),
                ("MSG".to_string(), "hello\nworld".to_string()),
                ("C".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn parse_assignment_containing_heredoc_marker() {
        let entries = parse_data("CMD=cat <<EOF\r\n").unwrap();
        assert_eq!(entries, vec![("CMD".to_string(), "cat <<EOF".to_string())]);
    }

    #[test]
    fn parse_rejects_invalid_lines() {
        match parse_data("A=1\nnot an assignment\n") {
            Err(EnvironmentFileError::InvalidLine { line, content }) => {
                assert_eq!(line, 2);
                assert_eq!(content, "not an assignment");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            parse_data("=value"),
            Err(EnvironmentFileError::InvalidLine { .. })
        ));
    }

    #[test]
    fn parse_rejects_unterminated_heredoc() {
        match parse_data("MSG<<EOF\nhello\n") {
            Err(EnvironmentFileError::UnterminatedHeredoc { name, delimiter }) => {
                assert_eq!(name, "MSG");
                assert_eq!(delimiter, "EOF");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = EnvironmentFile::new(dir.path().join("nope"));
        assert!(file.read_data().unwrap().is_empty());
        assert!(file.read_lines().unwrap().is_empty());
        assert_eq!(file.raw_data().unwrap(), "");
    }

    #[test]
    fn create_makes_distinct_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let files = EnvironmentFiles::create(dir.path()).unwrap();
        let paths = [
            files.env.path(),
            files.path.path(),
            files.outputs.path(),
            files.step_summary.path(),
        ];
        for path in paths {
            assert!(path.exists());
            assert_eq!(std::fs::read_to_string(path).unwrap(), "");
        }
        assert_ne!(files.env.path(), files.outputs.path());

        let values: std::collections::HashMap<_, _> = files.env_values().into_iter().collect();
        assert_eq!(values["GITHUB_ENV"], files.env.path().to_string_lossy());

        let trace = CollectingTraceWriter::new();
        files.cleanup(&trace);
        assert!(!files.env.path().exists());
        assert!(trace.messages().is_empty());
    }

    #[test]
    fn process_folds_files_into_step() {
        let dir = tempfile::tempdir().unwrap();
        let files = EnvironmentFiles::create(dir.path()).unwrap();
        std::fs::write(files.env.path(), "FOO=bar\nFOO=baz\n").unwrap();
        std::fs::write(files.path.path(), "/opt/tool/bin\n\n  /opt/other  \n").unwrap();
        std::fs::write(files.outputs.path(), "version=1.2.3\nnotes<<X\na\nb\nX\n").unwrap();
        std::fs::write(files.step_summary.path(), "# Build\n").unwrap();

        let env = Arc::new(MemoryEnv::with_vars([("PATH", "/usr/bin")]));
        let mut ctx = context_with_step(env.clone());
        files.process(&mut ctx).unwrap();

        assert_eq!(env.get("FOO").as_deref(), Some("baz"));
        let expected_path = format!(
            "/usr/bin{sep}/opt/tool/bin{sep}/opt/other",
            sep = PATH_LIST_SEPARATOR
        );
        assert_eq!(env.get("PATH"), Some(expected_path));

        let step = ctx.step_run().unwrap();
        assert_eq!(step.environment["FOO"], "baz");
        assert_eq!(step.path, vec!["/opt/tool/bin", "/opt/other"]);
        assert_eq!(step.outputs["version"], "1.2.3");
        assert_eq!(step.outputs["notes"], "a\nb");
        assert_eq!(step.summary, "# Build\n");

        ctx.unset_step(&RunResult::ran());
        assert_eq!(ctx.steps().get_output("s1", "version"), Some("1.2.3"));
    }

    #[test]
    fn process_with_empty_files_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let files = EnvironmentFiles::create(dir.path()).unwrap();
        let env = Arc::new(MemoryEnv::with_vars([("PATH", "/usr/bin")]));
        let mut ctx = context_with_step(env.clone());

        files.process(&mut ctx).unwrap();
        assert_eq!(env.get("PATH").as_deref(), Some("/usr/bin"));
        let step = ctx.step_run().unwrap();
        assert!(step.outputs.is_empty());
        assert!(step.path.is_empty());
        assert_eq!(step.summary, "");
    }

    #[test]
    fn process_requires_active_step() {
        let dir = tempfile::tempdir().unwrap();
        let files = EnvironmentFiles::create(dir.path()).unwrap();
        let mut ctx = ExecutionContext::builder()
            .process_env(Arc::new(MemoryEnv::new()))
            .build();

        let err = files.process(&mut ctx).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ContextError>(),
            Some(&ContextError::NoActiveStep)
        );
    }

    #[test]
    fn process_propagates_malformed_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let files = EnvironmentFiles::create(dir.path()).unwrap();
        std::fs::write(files.outputs.path(), "garbage\n").unwrap();

        let mut ctx = context_with_step(Arc::new(MemoryEnv::new()));
        let err = files.process(&mut ctx).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to process output file"));
    }
}
