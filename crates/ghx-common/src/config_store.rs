// GhxSettings: executor configuration loaded from a settings file and/or
// environment variables.

use crate::constants::{self, LogFormat};

use anyhow::Result;
use ghx_sdk::{IOUtil, StringUtil};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persisted executor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GhxSettings {
    /// Root data directory holding secrets, inputs and run reports.
    #[serde(default = "default_home")]
    pub home: PathBuf,

    /// Whether debug diagnostics are enabled.
    #[serde(default)]
    pub debug: bool,

    /// Format of log output.
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_home() -> PathBuf {
    PathBuf::from(constants::path::DEFAULT_HOME_DIRECTORY)
}

impl Default for GhxSettings {
    fn default() -> Self {
        Self {
            home: default_home(),
            debug: false,
            log_format: LogFormat::default(),
        }
    }
}

impl GhxSettings {
    /// Build settings from defaults overridden by process environment variables.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        settings.apply_overrides(|name| std::env::var(name).ok());
        settings
    }

    /// Read a JSON settings file, then apply environment overrides on top.
    pub fn load(path: &Path) -> Result<Self> {
        let mut settings: Self = IOUtil::load_object(path)?;
        settings.apply_overrides(|name| std::env::var(name).ok());
        tracing::debug!(
            "Loaded settings from '{}' (home = '{}')",
            path.display(),
            settings.home.display()
        );
        Ok(settings)
    }

    /// Apply overrides from a variable lookup. Empty or unparsable values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        use constants::variables::{ghx, runner};

        if let Some(home) = lookup(ghx::HOME).filter(|v| !v.is_empty()) {
            self.home = PathBuf::from(home);
        }

        let debug = lookup(runner::DEBUG)
            .and_then(|v| StringUtil::convert_to_bool(&v))
            .or_else(|| lookup(runner::STEP_DEBUG).and_then(|v| StringUtil::convert_to_bool(&v)));
        if let Some(debug) = debug {
            self.debug = debug;
        }

        match lookup(ghx::LOG_FORMAT).map(|v| v.to_ascii_lowercase()).as_deref() {
            Some("json") => self.log_format = LogFormat::Json,
            Some("text") => self.log_format = LogFormat::Text,
            Some(other) if !other.is_empty() => {
                tracing::warn!("Ignoring unknown log format '{}'", other);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let settings = GhxSettings::default();
        assert_eq!(settings.home, PathBuf::from(".ghx"));
        assert!(!settings.debug);
        assert_eq!(settings.log_format, LogFormat::Text);
    }

    #[test]
    fn overrides_from_lookup() {
        let mut settings = GhxSettings::default();
        settings.apply_overrides(lookup_from(&[
            ("GHX_HOME", "/var/lib/ghx"),
            ("RUNNER_DEBUG", "1"),
            ("GHX_LOG_FORMAT", "JSON"),
        ]));
        assert_eq!(settings.home, PathBuf::from("/var/lib/ghx"));
        assert!(settings.debug);
        assert_eq!(settings.log_format, LogFormat::Json);
    }

    #[test]
    fn step_debug_is_a_fallback() {
        let mut settings = GhxSettings::default();
        settings.apply_overrides(lookup_from(&[("ACTIONS_STEP_DEBUG", "true")]));
        assert!(settings.debug);

        let mut settings = GhxSettings::default();
        settings.apply_overrides(lookup_from(&[
            ("RUNNER_DEBUG", "0"),
            ("ACTIONS_STEP_DEBUG", "true"),
        ]));
        assert!(!settings.debug);
    }

    #[test]
    fn empty_and_unknown_values_are_ignored() {
        let mut settings = GhxSettings::default();
        settings.apply_overrides(lookup_from(&[
            ("GHX_HOME", ""),
            ("RUNNER_DEBUG", "perhaps"),
            ("GHX_LOG_FORMAT", "xml"),
        ]));
        assert_eq!(settings, GhxSettings::default());
    }

    #[test]
    fn partial_settings_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "debug": true }"#).unwrap();

        let settings: GhxSettings = IOUtil::load_object(&path).unwrap();
        assert!(settings.debug);
        assert_eq!(settings.home, PathBuf::from(".ghx"));
        assert_eq!(settings.log_format, LogFormat::Text);
    }
}
