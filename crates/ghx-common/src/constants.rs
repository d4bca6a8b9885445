// Constants shared across the ghx crates: well-known directories, report
// file names and environment variable names.

use std::fmt;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Well-known directories under the ghx home.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownDirectory {
    /// Root data directory.
    Home,
    /// Per-run report directories.
    Runs,
    /// Secrets file location.
    Secrets,
    /// Workflow inputs file location.
    Inputs,
    /// Scratch space for environment files.
    Temp,
}

impl fmt::Display for WellKnownDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

pub mod path {
    /// Default home directory name when `GHX_HOME` is not set.
    pub const DEFAULT_HOME_DIRECTORY: &str = ".ghx";
    pub const RUNS_DIRECTORY: &str = "runs";
    pub const JOBS_DIRECTORY: &str = "jobs";
    pub const STEPS_DIRECTORY: &str = "steps";
    pub const SECRETS_DIRECTORY: &str = "secrets";
    pub const INPUTS_DIRECTORY: &str = "inputs";
    pub const TEMP_DIRECTORY: &str = "tmp";

    pub const SECRETS_FILE: &str = "secrets.json";
    pub const INPUTS_FILE: &str = "inputs.json";

    /// PATH list separator on this platform.
    #[cfg(windows)]
    pub const PATH_LIST_SEPARATOR: char = ';';
    #[cfg(not(windows))]
    pub const PATH_LIST_SEPARATOR: char = ':';
}

// ---------------------------------------------------------------------------
// Report artifacts
// ---------------------------------------------------------------------------

pub mod report {
    pub const WORKFLOW_RUN_FILE: &str = "workflow_run.json";
    pub const JOB_RUN_FILE: &str = "job_run.json";
    pub const STEP_RUN_FILE: &str = "step_run.json";
    pub const STEP_SUMMARY_FILE: &str = "summary.md";
    /// Verbatim copy of the workflow source.
    pub const WORKFLOW_SOURCE_FILE: &str = "workflow.yaml";
}

// ---------------------------------------------------------------------------
// Environment variables
// ---------------------------------------------------------------------------

pub mod variables {
    pub mod ghx {
        pub const HOME: &str = "GHX_HOME";
        pub const LOG_FORMAT: &str = "GHX_LOG_FORMAT";
    }

    pub mod runner {
        pub const NAME: &str = "RUNNER_NAME";
        pub const OS: &str = "RUNNER_OS";
        pub const ARCH: &str = "RUNNER_ARCH";
        pub const TEMP: &str = "RUNNER_TEMP";
        pub const TOOL_CACHE: &str = "RUNNER_TOOL_CACHE";
        pub const DEBUG: &str = "RUNNER_DEBUG";
        pub const STEP_DEBUG: &str = "ACTIONS_STEP_DEBUG";
    }

    pub mod github {
        pub const REPOSITORY: &str = "GITHUB_REPOSITORY";
        pub const REPOSITORY_ID: &str = "GITHUB_REPOSITORY_ID";
        pub const REPOSITORY_OWNER: &str = "GITHUB_REPOSITORY_OWNER";
        pub const REPOSITORY_OWNER_ID: &str = "GITHUB_REPOSITORY_OWNER_ID";
        pub const REPOSITORY_URL: &str = "GITHUB_REPOSITORY_URL";
        pub const WORKSPACE: &str = "GITHUB_WORKSPACE";
        pub const API_URL: &str = "GITHUB_API_URL";
        pub const GRAPHQL_URL: &str = "GITHUB_GRAPHQL_URL";
        pub const SERVER_URL: &str = "GITHUB_SERVER_URL";
        pub const REF: &str = "GITHUB_REF";
        pub const REF_NAME: &str = "GITHUB_REF_NAME";
        pub const REF_TYPE: &str = "GITHUB_REF_TYPE";
        pub const REF_PROTECTED: &str = "GITHUB_REF_PROTECTED";
        pub const HEAD_REF: &str = "GITHUB_HEAD_REF";
        pub const BASE_REF: &str = "GITHUB_BASE_REF";
        pub const SHA: &str = "GITHUB_SHA";
        pub const EVENT_NAME: &str = "GITHUB_EVENT_NAME";
        pub const EVENT_PATH: &str = "GITHUB_EVENT_PATH";
        pub const TOKEN: &str = "GITHUB_TOKEN";
        pub const ACTOR: &str = "GITHUB_ACTOR";
        pub const WORKFLOW: &str = "GITHUB_WORKFLOW";
        pub const WORKFLOW_REF: &str = "GITHUB_WORKFLOW_REF";
        pub const WORKFLOW_SHA: &str = "GITHUB_WORKFLOW_SHA";
        pub const RUN_ID: &str = "GITHUB_RUN_ID";
        pub const RUN_NUMBER: &str = "GITHUB_RUN_NUMBER";
        pub const RUN_ATTEMPT: &str = "GITHUB_RUN_ATTEMPT";
        pub const RETENTION_DAYS: &str = "GITHUB_RETENTION_DAYS";
        pub const JOB: &str = "GITHUB_JOB";
        pub const ACTION_PATH: &str = "GITHUB_ACTION_PATH";
        pub const ENV: &str = "GITHUB_ENV";
        pub const PATH: &str = "GITHUB_PATH";
        pub const OUTPUT: &str = "GITHUB_OUTPUT";
        pub const STEP_SUMMARY: &str = "GITHUB_STEP_SUMMARY";
    }

    pub const PATH: &str = "PATH";
}

/// Token used when no github token is available.
pub const MOCK_TOKEN: &str = "mock-token";

/// Name the github token is stored under in the secrets context.
pub const GITHUB_TOKEN_SECRET: &str = "GITHUB_TOKEN";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_serde() {
        let parsed: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(parsed, LogFormat::Json);
        assert_eq!(LogFormat::default(), LogFormat::Text);
    }

    #[test]
    fn well_known_directory_display() {
        assert_eq!(WellKnownDirectory::Runs.to_string(), "Runs");
    }
}
