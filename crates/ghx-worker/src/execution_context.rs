// ExecutionContext: the state of a running workflow.
// Tracks the active workflow run, job run and step run, keeps the variable
// contexts derived from them in sync, and persists a report as each run retires.
//
// Lifecycle:
//   set_workflow → { set_job → { set_step → [execute] → unset_step }* → unset_job }* → unset_workflow

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use ghx_common::constants::{report, MOCK_TOKEN};
use ghx_common::{Conclusion, GhxSettings, HostContext, ProcessEnv, SystemEnv, VarUtil};
use ghx_sdk::{TraceWriter, TracingTraceWriter};
use serde::Serialize;

use crate::errors::ContextError;
use crate::github_context::GithubContext;
use crate::job_context::{JobContext, MatrixContext, NeedsContext};
use crate::report::{FsReportWriter, Report, ReportWriter, RunResult};
use crate::runner_context::RunnerContext;
use crate::secrets_context::{InputsContext, SecretsContext};
use crate::steps_context::{StepContext, StepsContext};
use crate::workflow::{CustomAction, JobRun, StepRun, StepStage, WorkflowRun};

/// The central execution state for one workflow run.
///
/// Owns the active runs and the expression contexts. Not shared: parallel
/// jobs need separate instances.
pub struct ExecutionContext {
    host: Arc<HostContext>,
    trace: Arc<dyn TraceWriter>,
    reports: Arc<dyn ReportWriter>,
    process_env: Arc<dyn ProcessEnv>,

    github: GithubContext,
    runner: RunnerContext,
    job: JobContext,
    steps: StepsContext,
    needs: NeedsContext,
    matrix: MatrixContext,
    secrets: SecretsContext,
    inputs: InputsContext,

    /// Effective environment of the current scope.
    env: HashMap<String, String>,

    workflow_run: Option<WorkflowRun>,
    job_run: Option<JobRun>,
    step_run: Option<StepRun>,
    current_action: Option<CustomAction>,
}

impl ExecutionContext {
    pub fn builder() -> ExecutionContextBuilder {
        ExecutionContextBuilder::default()
    }

    /// Build a context from the process environment and the files under the
    /// ghx home directory.
    pub fn load(host: Arc<HostContext>) -> Result<Self> {
        Self::load_with(host, |name| std::env::var(name).ok())
    }

    /// Like [`load`](Self::load), reading variables through `lookup`.
    pub fn load_with<F>(host: Arc<HostContext>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut github =
            GithubContext::from_lookup(&lookup).context("Failed to load github context")?;
        let mut runner = RunnerContext::from_lookup(&lookup);
        if runner.debug.is_empty() && host.settings().debug {
            runner.debug = "1".to_string();
        }

        let mut secrets = SecretsContext::load(&host.secrets_file())?;
        let inputs = InputsContext::load(&host.inputs_file())?;

        if github.token.is_empty() {
            tracing::debug!("No github token configured, using '{}'", MOCK_TOKEN);
            github.token = MOCK_TOKEN.to_string();
        }
        secrets.set_token(&github.token);

        Ok(Self::builder()
            .host(host)
            .github(github)
            .runner(runner)
            .secrets(secrets)
            .inputs(inputs)
            .build())
    }

    // -----------------------------------------------------------------------
    // Workflow
    // -----------------------------------------------------------------------

    /// Install a workflow run and seed the github context with its metadata.
    pub fn set_workflow(&mut self, mut run: WorkflowRun) {
        if let Some(previous) = &self.workflow_run {
            tracing::warn!(
                "Replacing active workflow run {} with {}",
                previous.run_id,
                run.run_id
            );
        }

        self.github.run_id = run.run_id.clone();
        self.github.run_number = run.run_number.clone();
        self.github.run_attempt = run.run_attempt.clone();
        self.github.retention_days = run.retention_days.clone();
        self.github.workflow = run.workflow.name.clone();
        self.github.workflow_ref = format!(
            "{}/{}@{}",
            self.github.repository, run.workflow.path, self.github.git_ref
        );
        self.github.workflow_sha = self.github.sha.clone();
        self.github.job.clear();

        run.conclusion = Conclusion::Success;

        self.job_run = None;
        self.step_run = None;
        self.job = JobContext::default();
        self.steps = StepsContext::new();
        self.needs = NeedsContext::new();
        self.matrix = MatrixContext::default();
        self.workflow_run = Some(run);

        self.export_github_env();
        self.refresh_env();
    }

    /// Retire the workflow run: write its report, keep a copy of the
    /// workflow source next to it, and hand the run back to the caller.
    pub fn unset_workflow(&mut self, result: &RunResult) -> Option<WorkflowRun> {
        if self.workflow_run.is_none() {
            return None;
        }

        if self.step_run.take().is_some() {
            self.trace.warning("Workflow retired with a step still active");
        }
        if self.job_run.take().is_some() {
            self.trace.warning("Workflow retired with a job still active");
        }

        let run = self.workflow_run.take()?;
        let dir = self.host.workflow_run_path(&run.run_id);

        self.persist(
            &run,
            "workflow run",
            self.write_report(&dir.join(report::WORKFLOW_RUN_FILE), result, &run),
        );

        if run.workflow.path.is_empty() {
            self.trace
                .verbose("Workflow has no source path, skipping workflow source copy");
        } else {
            let src = Path::new(&run.workflow.path);
            let dst = dir.join(report::WORKFLOW_SOURCE_FILE);
            self.persist(&run, "workflow", self.reports.copy_file(src, &dst));
        }

        self.github.job.clear();
        self.job = JobContext::default();
        self.matrix = MatrixContext::default();
        self.env.clear();

        Some(run)
    }

    // -----------------------------------------------------------------------
    // Job
    // -----------------------------------------------------------------------

    /// Activate a job run inside the active workflow run.
    pub fn set_job(&mut self, run: JobRun) -> Result<(), ContextError> {
        let workflow_run = self
            .workflow_run
            .as_mut()
            .ok_or(ContextError::NoActiveWorkflow)?;

        if let Some(previous) = &self.job_run {
            tracing::warn!(
                "Replacing active job run {} with {}",
                previous.job.id,
                run.job.id
            );
        }

        workflow_run.jobs.insert(run.job.id.clone(), run.clone());

        let (needs, missing) = NeedsContext::snapshot(&run.job.needs, &workflow_run.jobs);
        for need in missing {
            self.trace.warning(&format!(
                "Job '{}' needs '{}' which has not run",
                run.job.id, need
            ));
        }

        self.github.job = run.job.id.clone();
        self.matrix = if run.matrix.is_empty() {
            MatrixContext::default()
        } else {
            MatrixContext::from(run.matrix.clone())
        };
        self.job = JobContext {
            status: workflow_run.conclusion,
        };
        self.steps = StepsContext::new();
        self.needs = needs;
        self.step_run = None;
        self.job_run = Some(run);

        self.refresh_env();
        Ok(())
    }

    /// Retire the active job run. Downgrades the workflow conclusion when this
    /// is the first job that did not succeed.
    pub fn unset_job(&mut self, result: &RunResult) {
        let Some(job_run) = self.job_run.take() else {
            return;
        };
        if self.step_run.take().is_some() {
            self.trace.warning(&format!(
                "Job '{}' retired with a step still active",
                job_run.job.id
            ));
        }

        let Some(workflow_run) = self.workflow_run.as_mut() else {
            return;
        };

        workflow_run
            .jobs
            .insert(job_run.job.id.clone(), job_run.clone());

        if workflow_run.conclusion == Conclusion::Success
            && job_run.conclusion != Conclusion::Success
        {
            workflow_run.conclusion = job_run.conclusion;
        }

        self.github.job.clear();
        self.matrix = MatrixContext::default();
        self.refresh_env();

        if let Some(workflow_run) = self.workflow_run.as_ref() {
            let path = self
                .host
                .job_run_path(&workflow_run.run_id, &job_run.job.id)
                .join(report::JOB_RUN_FILE);
            self.persist(
                workflow_run,
                "job run",
                self.write_report(&path, result, &job_run),
            );
        }
    }

    pub fn set_job_results(
        &mut self,
        conclusion: Conclusion,
        outcome: Conclusion,
        outputs: HashMap<String, String>,
    ) -> Result<(), ContextError> {
        let job_run = self.job_run.as_mut().ok_or(ContextError::NoActiveJob)?;
        job_run.conclusion = conclusion;
        job_run.outcome = outcome;
        job_run.outputs = outputs;

        self.job.status = conclusion;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Step
    // -----------------------------------------------------------------------

    /// Activate a step run inside the active job run.
    pub fn set_step(&mut self, run: StepRun) -> Result<(), ContextError> {
        if self.job_run.is_none() {
            return Err(ContextError::NoActiveJob);
        }
        if let Some(previous) = &self.step_run {
            tracing::warn!(
                "Replacing active step run {} ({}) with {} ({})",
                previous.step.id,
                previous.stage,
                run.step.id,
                run.stage
            );
        }

        self.step_run = Some(run);
        self.refresh_env();
        Ok(())
    }

    /// Retire the active step run. Only the main stage is visible to later
    /// steps and written to disk.
    pub fn unset_step(&mut self, result: &RunResult) {
        let Some(step_run) = self.step_run.take() else {
            return;
        };

        self.refresh_env();

        if let Some(job_run) = self.job_run.as_mut() {
            job_run.steps.push(step_run.clone());
        }

        if step_run.stage != StepStage::Main {
            return;
        }

        self.steps
            .upsert(&step_run.step.id, StepContext::from(&step_run));

        let (Some(workflow_run), Some(job_run)) = (&self.workflow_run, &self.job_run) else {
            return;
        };
        let dir = self
            .host
            .step_run_path(&workflow_run.run_id, &job_run.job.id, &step_run.step.id);

        self.persist(
            workflow_run,
            "step run",
            self.write_report(&dir.join(report::STEP_RUN_FILE), result, &step_run),
        );

        if !step_run.summary.is_empty() {
            self.persist(
                workflow_run,
                "step run summary",
                self.reports.write_file(
                    &dir.join(report::STEP_SUMMARY_FILE),
                    step_run.summary.as_bytes(),
                ),
            );
        }
    }

    pub fn set_step_results(
        &mut self,
        conclusion: Conclusion,
        outcome: Conclusion,
    ) -> Result<(), ContextError> {
        let step_run = self.active_step()?;
        step_run.conclusion = conclusion;
        step_run.outcome = outcome;
        Ok(())
    }

    pub fn set_step_output(&mut self, key: &str, value: &str) -> Result<(), ContextError> {
        self.active_step()?
            .outputs
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn set_step_state(&mut self, key: &str, value: &str) -> Result<(), ContextError> {
        self.active_step()?
            .state
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn set_step_summary(&mut self, summary: &str) -> Result<(), ContextError> {
        self.active_step()?.summary = summary.to_string();
        Ok(())
    }

    /// Record an environment variable exported by the active step.
    pub fn set_step_env(&mut self, key: &str, value: &str) -> Result<(), ContextError> {
        self.active_step()?
            .environment
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Record a PATH entry added by the active step.
    pub fn add_step_path(&mut self, path: &str) -> Result<(), ContextError> {
        self.active_step()?.path.push(path.to_string());
        Ok(())
    }

    fn active_step(&mut self) -> Result<&mut StepRun, ContextError> {
        self.step_run.as_mut().ok_or(ContextError::NoActiveStep)
    }

    // -----------------------------------------------------------------------
    // Action
    // -----------------------------------------------------------------------

    pub fn set_action(&mut self, action: CustomAction) {
        self.github.action_path = action.path.clone();
        self.current_action = Some(action);
    }

    pub fn unset_action(&mut self) {
        self.github.action_path.clear();
        self.current_action = None;
    }

    // -----------------------------------------------------------------------
    // Environment files
    // -----------------------------------------------------------------------

    /// Point `github.env` at the env file of the step being executed.
    pub fn with_github_env(&mut self, path: impl Into<String>) {
        self.github.env = path.into();
    }

    pub fn without_github_env(&mut self) {
        self.github.env.clear();
    }

    /// Point `github.path` at the PATH file of the step being executed.
    pub fn with_github_path(&mut self, path: impl Into<String>) {
        self.github.path = path.into();
    }

    pub fn without_github_path(&mut self) {
        self.github.path.clear();
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn host(&self) -> &Arc<HostContext> {
        &self.host
    }

    pub fn trace(&self) -> &Arc<dyn TraceWriter> {
        &self.trace
    }

    pub fn process_env(&self) -> Arc<dyn ProcessEnv> {
        Arc::clone(&self.process_env)
    }

    pub fn workflow_run(&self) -> Option<&WorkflowRun> {
        self.workflow_run.as_ref()
    }

    pub fn workflow_run_mut(&mut self) -> Option<&mut WorkflowRun> {
        self.workflow_run.as_mut()
    }

    pub fn job_run(&self) -> Option<&JobRun> {
        self.job_run.as_ref()
    }

    pub fn step_run(&self) -> Option<&StepRun> {
        self.step_run.as_ref()
    }

    pub fn current_action(&self) -> Option<&CustomAction> {
        self.current_action.as_ref()
    }

    /// Effective environment: workflow env, then job env, then step env.
    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    pub fn github(&self) -> &GithubContext {
        &self.github
    }

    pub fn runner(&self) -> &RunnerContext {
        &self.runner
    }

    pub fn job(&self) -> &JobContext {
        &self.job
    }

    pub fn steps(&self) -> &StepsContext {
        &self.steps
    }

    pub fn needs(&self) -> &NeedsContext {
        &self.needs
    }

    pub fn matrix(&self) -> &MatrixContext {
        &self.matrix
    }

    pub fn secrets(&self) -> &SecretsContext {
        &self.secrets
    }

    pub fn inputs(&self) -> &InputsContext {
        &self.inputs
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Recompute the effective environment from the active scopes.
    fn refresh_env(&mut self) {
        let empty = HashMap::new();
        let workflow_env = self
            .workflow_run
            .as_ref()
            .map_or(&empty, |r| &r.workflow.env);
        let job_env = self.job_run.as_ref().map_or(&empty, |r| &r.job.env);
        let step_env = self
            .step_run
            .as_ref()
            .map_or(&empty, |r| &r.step.environment);

        self.env = VarUtil::layer_env([workflow_env, job_env, step_env]);
    }

    /// Mirror the github context into `GITHUB_*` variables for executed steps.
    fn export_github_env(&self) {
        for (name, value) in self.github.env_values() {
            if !value.is_empty() {
                self.process_env.set(name, &value);
            }
        }
    }

    fn write_report<T: Serialize>(&self, path: &Path, result: &RunResult, run: &T) -> Result<()> {
        let value = Report::new(result, run).to_value()?;
        self.reports.write_json(path, &value)
    }

    /// Report a failed write. Persistence never changes run state.
    fn persist(&self, run: &WorkflowRun, what: &str, outcome: Result<()>) {
        if let Err(e) = outcome {
            self.trace.error(&format!(
                "Failed to write {}: {:#} (workflow: {}, run: {})",
                what, e, run.workflow.name, run.run_id
            ));
        }
    }
}

/// Builds an [`ExecutionContext`] with explicit collaborators.
pub struct ExecutionContextBuilder {
    host: Option<Arc<HostContext>>,
    trace: Arc<dyn TraceWriter>,
    reports: Arc<dyn ReportWriter>,
    process_env: Arc<dyn ProcessEnv>,
    github: GithubContext,
    runner: RunnerContext,
    secrets: SecretsContext,
    inputs: InputsContext,
}

impl Default for ExecutionContextBuilder {
    fn default() -> Self {
        Self {
            host: None,
            trace: Arc::new(TracingTraceWriter),
            reports: Arc::new(FsReportWriter),
            process_env: Arc::new(SystemEnv),
            github: GithubContext::default(),
            runner: RunnerContext::default(),
            secrets: SecretsContext::default(),
            inputs: InputsContext::default(),
        }
    }
}

impl ExecutionContextBuilder {
    pub fn host(mut self, host: Arc<HostContext>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn trace(mut self, trace: Arc<dyn TraceWriter>) -> Self {
        self.trace = trace;
        self
    }

    pub fn reports(mut self, reports: Arc<dyn ReportWriter>) -> Self {
        self.reports = reports;
        self
    }

    pub fn process_env(mut self, process_env: Arc<dyn ProcessEnv>) -> Self {
        self.process_env = process_env;
        self
    }

    pub fn github(mut self, github: GithubContext) -> Self {
        self.github = github;
        self
    }

    pub fn runner(mut self, runner: RunnerContext) -> Self {
        self.runner = runner;
        self
    }

    pub fn secrets(mut self, secrets: SecretsContext) -> Self {
        self.secrets = secrets;
        self
    }

    pub fn inputs(mut self, inputs: InputsContext) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn build(self) -> ExecutionContext {
        ExecutionContext {
            host: self
                .host
                .unwrap_or_else(|| HostContext::new(GhxSettings::default())),
            trace: self.trace,
            reports: self.reports,
            process_env: self.process_env,
            github: self.github,
            runner: self.runner,
            job: JobContext::default(),
            steps: StepsContext::new(),
            needs: NeedsContext::new(),
            matrix: MatrixContext::default(),
            secrets: self.secrets,
            inputs: self.inputs,
            env: HashMap::new(),
            workflow_run: None,
            job_run: None,
            step_run: None,
            current_action: None,
        }
    }
}
