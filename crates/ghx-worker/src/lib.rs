// ghx-worker: Workflow execution state for the ghx executor.
// Depends on `ghx-sdk` and `ghx-common`.
//
// Architecture:
//   ExecutionContext::set_workflow → set_job → set_step
//     → [executor runs the step, EnvironmentFiles::process] → unset_step → unset_job → unset_workflow
//   VariableProvider::get_variable reads the contexts the ExecutionContext maintains.

pub mod environment_files;
pub mod errors;
pub mod execution_context;
pub mod expressions;
pub mod github_context;
pub mod job_context;
pub mod report;
pub mod runner_context;
pub mod secrets_context;
pub mod steps_context;
pub mod workflow;

pub use environment_files::{EnvironmentFile, EnvironmentFileError, EnvironmentFiles};
pub use errors::{ContextError, VariableError};
pub use execution_context::{ExecutionContext, ExecutionContextBuilder};
pub use expressions::{Variable, VariableName, VariableProvider};
pub use report::{FsReportWriter, MemoryReportWriter, Report, ReportWriter, RunResult};
pub use workflow::{
    CustomAction, Job, JobRun, MatrixCombination, Step, StepRun, StepStage, StepType, Workflow,
    WorkflowRun,
};
