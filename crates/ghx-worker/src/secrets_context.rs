// Secrets and inputs contexts, loaded from JSON files under the ghx home.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use ghx_common::constants::GITHUB_TOKEN_SECRET;
use ghx_sdk::IOUtil;
use serde::{Deserialize, Serialize};

/// The `secrets` context.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretsContext(HashMap<String, String>);

impl SecretsContext {
    /// Load secrets from a JSON object file, creating an empty one if absent.
    pub fn load(path: &Path) -> Result<Self> {
        IOUtil::ensure_file(path, "{}")
            .with_context(|| format!("Failed to ensure secrets file '{}' exists", path.display()))?;
        IOUtil::load_object(path)
            .with_context(|| format!("Failed to read secrets file '{}'", path.display()))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Expose the github token as `secrets.GITHUB_TOKEN`.
    pub fn set_token(&mut self, token: &str) {
        self.insert(GITHUB_TOKEN_SECRET, token);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Values stay out of Debug output.
impl std::fmt::Debug for SecretsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.0.keys().collect();
        names.sort();
        f.debug_struct("SecretsContext").field("names", &names).finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SecretsContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// The `inputs` context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputsContext(HashMap<String, String>);

impl InputsContext {
    /// Load inputs from a JSON object file, creating an empty one if absent.
    pub fn load(path: &Path) -> Result<Self> {
        IOUtil::ensure_file(path, "{}")
            .with_context(|| format!("Failed to ensure inputs file '{}' exists", path.display()))?;
        IOUtil::load_object(path)
            .with_context(|| format!("Failed to read inputs file '{}'", path.display()))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InputsContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
