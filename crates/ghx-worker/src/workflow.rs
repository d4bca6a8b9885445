// Workflow model: the parsed definitions (workflow, job, step, custom action)
// and the run records built from them while a workflow executes.

use std::collections::HashMap;
use std::fmt;

use ghx_common::Conclusion;
use serde::{Deserialize, Serialize};

/// Realized matrix values for one job instance (`matrix.<key>`).
pub type MatrixCombination = HashMap<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// A parsed workflow definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// Path of the workflow source file, relative to the repository root.
    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub name: String,

    /// Workflow-level `env`.
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Jobs keyed by job ID.
    #[serde(default)]
    pub jobs: HashMap<String, Job>,
}

/// A job inside a workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Job ID (the key under `jobs:`).
    #[serde(default)]
    pub id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Job-level `env`.
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// IDs of jobs that must complete before this one.
    #[serde(default)]
    pub needs: Vec<String>,

    /// Declared job outputs (name → expression).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub outputs: HashMap<String, String>,

    #[serde(default)]
    pub steps: Vec<Step>,
}

/// The kind of task a step runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    Run,
    Action,
    Docker,
    Unknown,
}

/// A single step of a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub id: String,

    #[serde(default, rename = "if", skip_serializing_if = "String::is_empty")]
    pub condition: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uses: String,

    /// Step-level `env`.
    #[serde(default, rename = "env")]
    pub environment: HashMap<String, String>,

    /// Action inputs.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub with: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub run: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub shell: String,

    #[serde(
        default,
        rename = "working-directory",
        skip_serializing_if = "String::is_empty"
    )]
    pub working_directory: String,

    #[serde(default, rename = "continue-on-error")]
    pub continue_on_error: bool,

    #[serde(default, rename = "timeout-minutes", skip_serializing_if = "is_zero")]
    pub timeout_minutes: u32,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl Step {
    /// Classify the step from the fields it sets.
    pub fn step_type(&self) -> StepType {
        if self.uses.starts_with("docker://") {
            StepType::Docker
        } else if !self.uses.is_empty() {
            StepType::Action
        } else if !self.run.is_empty() {
            StepType::Run
        } else {
            StepType::Unknown
        }
    }
}

/// A custom action resolved for a `uses:` step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomAction {
    /// Directory the action was checked out to.
    pub path: String,

    pub meta: ActionMeta,
}

/// Contents of an `action.yml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionMeta {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub inputs: HashMap<String, ActionInput>,

    #[serde(default)]
    pub outputs: HashMap<String, ActionOutput>,

    #[serde(default)]
    pub runs: ActionRuns,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionInput {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionOutput {
    #[serde(default)]
    pub description: String,

    /// Expression producing the output (composite actions only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// The `runs:` section of an action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionRuns {
    /// `node20`, `docker`, `composite`, ...
    #[serde(default)]
    pub using: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub main: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pre: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub post: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// Run records
// ---------------------------------------------------------------------------

/// One execution of a workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub run_id: String,

    pub run_number: String,

    pub run_attempt: String,

    pub retention_days: String,

    pub workflow: Workflow,

    /// Result of the run; starts as success and is downgraded by the first
    /// job that does not succeed.
    pub conclusion: Conclusion,

    /// Job runs keyed by job ID.
    pub jobs: HashMap<String, JobRun>,
}

impl WorkflowRun {
    pub fn new(run_id: impl Into<String>, workflow: Workflow) -> Self {
        Self {
            run_id: run_id.into(),
            run_number: "1".to_string(),
            run_attempt: "1".to_string(),
            retention_days: "0".to_string(),
            workflow,
            conclusion: Conclusion::Success,
            jobs: HashMap::new(),
        }
    }
}

/// One execution of a job (one matrix instance for matrixed jobs).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRun {
    pub job: Job,

    /// Matrix values of this instance; empty for non-matrix jobs.
    #[serde(default)]
    pub matrix: MatrixCombination,

    /// Result after `continue-on-error`.
    pub conclusion: Conclusion,

    /// Result before `continue-on-error`.
    pub outcome: Conclusion,

    pub outputs: HashMap<String, String>,

    /// Every retired step run, in retirement order. A step that runs several
    /// stages appears once per stage.
    pub steps: Vec<StepRun>,
}

impl JobRun {
    pub fn new(job: Job) -> Self {
        Self {
            job,
            ..Self::default()
        }
    }

    pub fn with_matrix(mut self, matrix: MatrixCombination) -> Self {
        self.matrix = matrix;
        self
    }
}

/// Lifecycle stage of a step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStage {
    Setup,
    Pre,
    #[default]
    Main,
    Post,
    Complete,
}

impl fmt::Display for StepStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepStage::Setup => "setup",
            StepStage::Pre => "pre",
            StepStage::Main => "main",
            StepStage::Post => "post",
            StepStage::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// One stage of one step's execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepRun {
    pub step: Step,

    pub stage: StepStage,

    /// Result after `continue-on-error`.
    pub conclusion: Conclusion,

    /// Result before `continue-on-error`.
    pub outcome: Conclusion,

    pub outputs: HashMap<String, String>,

    /// Values saved for later stages of the same action.
    pub state: HashMap<String, String>,

    pub summary: String,

    /// Environment variables exported by the step.
    pub environment: HashMap<String, String>,

    /// PATH entries added by the step.
    pub path: Vec<String>,
}

impl StepRun {
    pub fn new(step: Step, stage: StepStage) -> Self {
        Self {
            step,
            stage,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(uses: &str, run: &str) -> Step {
        Step {
            uses: uses.to_string(),
            run: run.to_string(),
            ..Step::default()
        }
    }

    #[test]
    fn step_type_from_fields() {
        assert_eq!(step("docker://alpine:3", "").step_type(), StepType::Docker);
        assert_eq!(step("actions/checkout@v4", "").step_type(), StepType::Action);
        assert_eq!(step("actions/checkout@v4", "echo hi").step_type(), StepType::Action);
        assert_eq!(step("", "make test").step_type(), StepType::Run);
        assert_eq!(step("", "").step_type(), StepType::Unknown);
    }

    #[test]
    fn step_uses_workflow_field_names() {
        let json = serde_json::json!({
            "id": "build",
            "if": "success()",
            "run": "cargo build",
            "env": { "RUST_LOG": "debug" },
            "working-directory": "crates/app",
            "continue-on-error": true,
            "timeout-minutes": 10
        });
        let step: Step = serde_json::from_value(json).unwrap();
        assert_eq!(step.condition, "success()");
        assert_eq!(step.environment.get("RUST_LOG").map(String::as_str), Some("debug"));
        assert_eq!(step.working_directory, "crates/app");
        assert!(step.continue_on_error);
        assert_eq!(step.timeout_minutes, 10);

        let back = serde_json::to_value(&step).unwrap();
        assert_eq!(back["continue-on-error"], serde_json::json!(true));
        assert!(back.get("uses").is_none());
    }

    #[test]
    fn stage_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&StepStage::Post).unwrap(), "\"post\"");
        assert_eq!(StepStage::Complete.to_string(), "complete");
    }

    #[test]
    fn new_workflow_run_starts_successful() {
        let run = WorkflowRun::new("7", Workflow::default());
        assert_eq!(run.conclusion, Conclusion::Success);
        assert_eq!(run.run_attempt, "1");
        assert!(run.jobs.is_empty());
    }

    #[test]
    fn job_run_with_matrix() {
        let mut matrix = MatrixCombination::new();
        matrix.insert("os".to_string(), serde_json::json!("ubuntu-latest"));
        let jr = JobRun::new(Job::default()).with_matrix(matrix);
        assert_eq!(jr.matrix["os"], serde_json::json!("ubuntu-latest"));
        assert!(jr.steps.is_empty());
    }
}
