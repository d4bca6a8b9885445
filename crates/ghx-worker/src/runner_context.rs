// RunnerContext: the `runner.*` expression context, populated from the
// `RUNNER_*` environment of the host running the workflow.

use ghx_common::constants::variables::runner as vars;
use ghx_common::VarUtil;

/// The `runner` context available in expressions.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RunnerContext {
    pub name: String,

    /// `Linux`, `Windows` or `macOS`.
    pub os: String,

    /// `X64`, `ARM64`, `ARM` or `X86`.
    pub arch: String,

    pub temp: String,

    pub tool_cache: String,

    /// `"1"` when debug logging is enabled, empty otherwise.
    pub debug: String,
}

impl RunnerContext {
    /// Build the context from a variable lookup, falling back to the host's
    /// own name, OS, architecture and temp directory.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let name = get(vars::NAME).unwrap_or_else(|| {
            hostname::get()
                .map(|h| h.to_string_lossy().to_string())
                .unwrap_or_else(|_| "ghx".to_string())
        });

        Self {
            name,
            os: get(vars::OS).unwrap_or_else(|| VarUtil::os().to_string()),
            arch: get(vars::ARCH).unwrap_or_else(|| VarUtil::os_architecture().to_string()),
            temp: get(vars::TEMP)
                .unwrap_or_else(|| std::env::temp_dir().to_string_lossy().to_string()),
            tool_cache: get(vars::TOOL_CACHE).unwrap_or_default(),
            debug: get(vars::DEBUG).unwrap_or_default(),
        }
    }

    /// Convert to a serde_json::Value for expression evaluation.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Object(serde_json::Map::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_values_win() {
        let ctx = RunnerContext::from_lookup(|name| match name {
            "RUNNER_NAME" => Some("my-runner".to_string()),
            "RUNNER_OS" => Some("Linux".to_string()),
            "RUNNER_ARCH" => Some("ARM64".to_string()),
            "RUNNER_TEMP" => Some("/tmp/runner".to_string()),
            "RUNNER_TOOL_CACHE" => Some("/opt/hostedtoolcache".to_string()),
            "RUNNER_DEBUG" => Some("1".to_string()),
            _ => None,
        });

        assert_eq!(ctx.name, "my-runner");
        assert_eq!(ctx.arch, "ARM64");
        assert_eq!(ctx.temp, "/tmp/runner");
        assert_eq!(ctx.tool_cache, "/opt/hostedtoolcache");
        assert_eq!(ctx.debug, "1");
    }

    #[test]
    fn test_host_fallbacks() {
        let ctx = RunnerContext::from_lookup(|_| None);
        assert!(!ctx.name.is_empty());
        assert_eq!(ctx.os, VarUtil::os());
        assert_eq!(ctx.arch, VarUtil::os_architecture());
        assert!(!ctx.temp.is_empty());
        assert_eq!(ctx.debug, "");
    }

    #[test]
    fn test_to_value() {
        let ctx = RunnerContext {
            name: "test-runner".to_string(),
            tool_cache: "/tools".to_string(),
            ..Default::default()
        };
        let val = ctx.to_value();
        assert_eq!(val["name"], serde_json::json!("test-runner"));
        assert_eq!(val["tool_cache"], serde_json::json!("/tools"));
    }
}
