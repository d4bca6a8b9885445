// VarUtil: platform-aware environment variable helpers.

use std::collections::HashMap;

use crate::constants::path::PATH_LIST_SEPARATOR;

/// Platform-aware environment variable and OS helpers.
pub struct VarUtil;

impl VarUtil {
    /// Compare environment variable names the way the platform does:
    /// case-insensitive on Windows, exact elsewhere.
    pub fn env_var_keys_equal(a: &str, b: &str) -> bool {
        if cfg!(windows) {
            a.eq_ignore_ascii_case(b)
        } else {
            a == b
        }
    }

    /// The runner OS name as exposed to workflows.
    pub fn os() -> &'static str {
        if cfg!(target_os = "windows") {
            "Windows"
        } else if cfg!(target_os = "macos") {
            "macOS"
        } else {
            "Linux"
        }
    }

    /// The runner CPU architecture as exposed to workflows.
    pub fn os_architecture() -> &'static str {
        match std::env::consts::ARCH {
            "x86_64" => "X64",
            "aarch64" => "ARM64",
            "arm" => "ARM",
            "x86" => "X86",
            _ => "UNKNOWN",
        }
    }

    /// Merge environment maps. Values from `overrides` win over `base`.
    pub fn merge_env(
        base: &HashMap<String, String>,
        overrides: &HashMap<String, String>,
    ) -> HashMap<String, String> {
        let mut merged = base.clone();
        for (key, value) in overrides {
            let existing_key = merged
                .keys()
                .find(|k| Self::env_var_keys_equal(k, key))
                .cloned();
            if let Some(k) = existing_key {
                merged.remove(&k);
            }
            merged.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Compose environment layers in precedence order: later layers win.
    pub fn layer_env<'a, I>(layers: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = &'a HashMap<String, String>>,
    {
        layers
            .into_iter()
            .fold(HashMap::new(), |acc, layer| Self::merge_env(&acc, layer))
    }

    /// Append entries to a PATH-style list, skipping empty entries.
    pub fn append_path<S: AsRef<str>>(current: &str, entries: &[S]) -> String {
        let mut path = current.to_string();
        for entry in entries {
            let entry = entry.as_ref();
            if entry.is_empty() {
                continue;
            }
            if !path.is_empty() {
                path.push(PATH_LIST_SEPARATOR);
            }
            path.push_str(entry);
        }
        path
    }
}
