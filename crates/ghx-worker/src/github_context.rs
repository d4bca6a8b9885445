// GithubContext: the `github.*` expression context, populated from the
// `GITHUB_*` environment and updated as runs and jobs are activated.

use anyhow::{Context, Result};
use ghx_common::constants::variables::github as vars;
use ghx_sdk::{IOUtil, StringUtil};
use std::path::Path;

/// The `github` context available in expressions.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GithubContext {
    pub repository: String,
    pub repository_id: String,
    pub repository_owner: String,
    pub repository_owner_id: String,
    #[serde(rename = "repositoryUrl")]
    pub repository_url: String,
    pub workspace: String,
    pub api_url: String,
    pub graphql_url: String,
    pub server_url: String,

    #[serde(rename = "ref")]
    pub git_ref: String,
    pub ref_name: String,
    pub ref_type: String,
    pub ref_protected: bool,
    pub head_ref: String,
    pub base_ref: String,
    pub sha: String,

    pub actor: String,
    pub event_name: String,
    pub event_path: String,

    /// The event payload.
    pub event: serde_json::Value,

    pub token: String,

    pub workflow: String,
    pub workflow_ref: String,
    pub workflow_sha: String,
    pub run_id: String,
    pub run_number: String,
    pub run_attempt: String,
    pub retention_days: String,

    /// ID of the active job; empty between jobs.
    pub job: String,

    /// Directory of the custom action currently executing.
    pub action_path: String,

    /// Path of the env file of the step being executed.
    pub env: String,

    /// Path of the PATH file of the step being executed.
    pub path: String,
}

impl GithubContext {
    /// Build the context from a variable lookup.
    ///
    /// The event payload is read from the file named by `GITHUB_EVENT_PATH`;
    /// an unset path yields an empty object, an unreadable file is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).unwrap_or_default();

        let event_path = get(vars::EVENT_PATH);
        let event = if event_path.is_empty() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            IOUtil::load_object(Path::new(&event_path))
                .with_context(|| format!("Failed to read event file '{}'", event_path))?
        };

        let repository = get(vars::REPOSITORY);
        let repository_owner = match get(vars::REPOSITORY_OWNER) {
            owner if !owner.is_empty() => owner,
            _ => repository
                .split_once('/')
                .map(|(owner, _)| owner.to_string())
                .unwrap_or_default(),
        };

        let git_ref = get(vars::REF);
        let ref_name = match get(vars::REF_NAME) {
            name if !name.is_empty() => name,
            _ => Self::extract_ref_name(&git_ref),
        };
        let ref_type = match get(vars::REF_TYPE) {
            kind if !kind.is_empty() => kind,
            _ => Self::extract_ref_type(&git_ref),
        };

        Ok(Self {
            repository,
            repository_id: get(vars::REPOSITORY_ID),
            repository_owner,
            repository_owner_id: get(vars::REPOSITORY_OWNER_ID),
            repository_url: get(vars::REPOSITORY_URL),
            workspace: get(vars::WORKSPACE),
            api_url: get(vars::API_URL),
            graphql_url: get(vars::GRAPHQL_URL),
            server_url: get(vars::SERVER_URL),
            git_ref,
            ref_name,
            ref_type,
            ref_protected: StringUtil::convert_to_bool(&get(vars::REF_PROTECTED))
                .unwrap_or(false),
            head_ref: get(vars::HEAD_REF),
            base_ref: get(vars::BASE_REF),
            sha: get(vars::SHA),
            actor: get(vars::ACTOR),
            event_name: get(vars::EVENT_NAME),
            event_path,
            event,
            token: get(vars::TOKEN),
            ..Self::default()
        })
    }

    /// `GITHUB_*` variables mirroring this context, for steps that read the
    /// environment instead of expressions.
    pub fn env_values(&self) -> Vec<(&'static str, String)> {
        vec![
            (vars::REPOSITORY, self.repository.clone()),
            (vars::REPOSITORY_OWNER, self.repository_owner.clone()),
            (vars::WORKSPACE, self.workspace.clone()),
            (vars::REF, self.git_ref.clone()),
            (vars::REF_NAME, self.ref_name.clone()),
            (vars::REF_TYPE, self.ref_type.clone()),
            (vars::SHA, self.sha.clone()),
            (vars::EVENT_NAME, self.event_name.clone()),
            (vars::WORKFLOW, self.workflow.clone()),
            (vars::WORKFLOW_REF, self.workflow_ref.clone()),
            (vars::WORKFLOW_SHA, self.workflow_sha.clone()),
            (vars::RUN_ID, self.run_id.clone()),
            (vars::RUN_NUMBER, self.run_number.clone()),
            (vars::RUN_ATTEMPT, self.run_attempt.clone()),
            (vars::RETENTION_DAYS, self.retention_days.clone()),
            (vars::JOB, self.job.clone()),
            (vars::ACTION_PATH, self.action_path.clone()),
            (vars::ENV, self.env.clone()),
            (vars::PATH, self.path.clone()),
        ]
    }

    /// Convert to a serde_json::Value for expression evaluation.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Object(serde_json::Map::new()))
    }

    /// `refs/heads/main` → `main`, `refs/tags/v1.0` → `v1.0`.
    fn extract_ref_name(git_ref: &str) -> String {
        git_ref
            .strip_prefix("refs/heads/")
            .or_else(|| git_ref.strip_prefix("refs/tags/"))
            .unwrap_or(git_ref)
            .to_string()
    }

    fn extract_ref_type(git_ref: &str) -> String {
        if git_ref.starts_with("refs/heads/") {
            "branch".to_string()
        } else if git_ref.starts_with("refs/tags/") {
            "tag".to_string()
        } else {
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: Vec<(&str, String)>) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_extract_ref_name() {
        assert_eq!(GithubContext::extract_ref_name("refs/heads/main"), "main");
        assert_eq!(GithubContext::extract_ref_name("refs/tags/v1.0.0"), "v1.0.0");
        assert_eq!(GithubContext::extract_ref_name("abc"), "abc");
    }

    #[test]
    fn test_extract_ref_type() {
        assert_eq!(GithubContext::extract_ref_type("refs/heads/main"), "branch");
        assert_eq!(GithubContext::extract_ref_type("refs/tags/v1.0"), "tag");
        assert_eq!(GithubContext::extract_ref_type("unknown"), "");
    }

    #[test]
    fn test_from_lookup_reads_event_and_derives_fields() {
        let dir = tempfile::tempdir().unwrap();
        let event_path = dir.path().join("event.json");
        std::fs::write(&event_path, r#"{"action":"opened","number":5}"#).unwrap();

        let ctx = GithubContext::from_lookup(lookup_from(vec![
            ("GITHUB_REPOSITORY", "octo/hello".to_string()),
            ("GITHUB_REF", "refs/heads/feature".to_string()),
            ("GITHUB_SHA", "abc123".to_string()),
            ("GITHUB_REF_PROTECTED", "true".to_string()),
            ("GITHUB_EVENT_NAME", "pull_request".to_string()),
            ("GITHUB_EVENT_PATH", event_path.to_string_lossy().to_string()),
        ]))
        .unwrap();

        assert_eq!(ctx.repository_owner, "octo");
        assert_eq!(ctx.ref_name, "feature");
        assert_eq!(ctx.ref_type, "branch");
        assert!(ctx.ref_protected);
        assert_eq!(ctx.event["number"], serde_json::json!(5));
        assert_eq!(ctx.event_path, event_path.to_string_lossy());
    }

    #[test]
    fn test_missing_event_path_is_empty_object() {
        let ctx = GithubContext::from_lookup(|_| None).unwrap();
        assert_eq!(ctx.event, serde_json::json!({}));
        assert!(ctx.token.is_empty());
    }

    #[test]
    fn test_unreadable_event_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let result = GithubContext::from_lookup(lookup_from(vec![(
            "GITHUB_EVENT_PATH",
            missing.to_string_lossy().to_string(),
        )]));
        assert!(result.is_err());
    }

    #[test]
    fn test_to_value_uses_expression_names() {
        let ctx = GithubContext {
            workflow: "CI".to_string(),
            git_ref: "refs/heads/main".to_string(),
            repository_url: "https://github.com/octo/hello".to_string(),
            ..Default::default()
        };

        let val = ctx.to_value();
        assert_eq!(val["workflow"], serde_json::json!("CI"));
        assert_eq!(val["ref"], serde_json::json!("refs/heads/main"));
        assert_eq!(val["repositoryUrl"], serde_json::json!("https://github.com/octo/hello"));
    }

    #[test]
    fn test_env_values_mirror_run_fields() {
        let ctx = GithubContext {
            run_id: "99".to_string(),
            job: "build".to_string(),
            ..Default::default()
        };
        let values: HashMap<_, _> = ctx.env_values().into_iter().collect();
        assert_eq!(values["GITHUB_RUN_ID"], "99");
        assert_eq!(values["GITHUB_JOB"], "build");
    }
}
