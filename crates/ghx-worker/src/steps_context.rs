// StepsContext: the `steps.<id>.*` expression context.

use std::collections::HashMap;

use ghx_common::Conclusion;
use serde::{Deserialize, Serialize};

use crate::workflow::StepRun;

/// What later steps can see of a finished step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepContext {
    pub state: HashMap<String, String>,

    pub summary: String,

    pub outputs: HashMap<String, String>,

    /// Result before `continue-on-error`.
    pub outcome: Conclusion,

    /// Result after `continue-on-error`.
    pub conclusion: Conclusion,
}

impl From<&StepRun> for StepContext {
    fn from(sr: &StepRun) -> Self {
        Self {
            state: sr.state.clone(),
            summary: sr.summary.clone(),
            outputs: sr.outputs.clone(),
            outcome: sr.outcome,
            conclusion: sr.conclusion,
        }
    }
}

/// Step contexts of the active job, keyed by step ID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepsContext {
    results: HashMap<String, StepContext>,
}

impl StepsContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the context of a step.
    pub fn upsert(&mut self, step_id: &str, context: StepContext) {
        self.results.insert(step_id.to_string(), context);
    }

    pub fn get(&self, step_id: &str) -> Option<&StepContext> {
        self.results.get(step_id)
    }

    pub fn has_step(&self, step_id: &str) -> bool {
        self.results.contains_key(step_id)
    }

    pub fn get_outcome(&self, step_id: &str) -> Option<Conclusion> {
        self.results.get(step_id).map(|r| r.outcome)
    }

    pub fn get_conclusion(&self, step_id: &str) -> Option<Conclusion> {
        self.results.get(step_id).map(|r| r.conclusion)
    }

    pub fn get_output(&self, step_id: &str, output_name: &str) -> Option<&str> {
        self.results
            .get(step_id)
            .and_then(|r| r.outputs.get(output_name))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn steps(&self) -> &HashMap<String, StepContext> {
        &self.results
    }
}
