// ProcessEnv: the environment that executed steps inherit.

use parking_lot::RwLock;
use std::collections::HashMap;

/// Read/write access to the environment handed to executed steps.
///
/// `SystemEnv` is the real process environment; `MemoryEnv` keeps values in
/// memory so tests never touch process-global state.
pub trait ProcessEnv: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;

    fn set(&self, name: &str, value: &str);
}

/// The process environment of the current executable.
#[derive(Debug, Clone, Default)]
pub struct SystemEnv;

impl ProcessEnv for SystemEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn set(&self, name: &str, value: &str) {
        std::env::set_var(name, value);
    }
}

/// An in-memory environment.
#[derive(Debug, Default)]
pub struct MemoryEnv {
    vars: RwLock<HashMap<String, String>>,
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the environment with initial values.
    pub fn with_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: RwLock::new(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }

    /// A copy of every variable currently set.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.vars.read().clone()
    }
}

impl ProcessEnv for MemoryEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.read().get(name).cloned()
    }

    fn set(&self, name: &str, value: &str) {
        self.vars.write().insert(name.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_env_last_write_wins() {
        let env = MemoryEnv::with_vars([("PATH", "/usr/bin")]);
        assert_eq!(env.get("PATH").as_deref(), Some("/usr/bin"));
        env.set("FOO", "1");
        env.set("FOO", "2");
        assert_eq!(env.get("FOO").as_deref(), Some("2"));
        assert_eq!(env.snapshot().len(), 2);
        assert_eq!(env.get("MISSING"), None);
    }
}
