// Job-scoped expression contexts: `job`, `needs` and `matrix`.

use std::collections::HashMap;

use ghx_common::Conclusion;
use serde::{Deserialize, Serialize};

use crate::workflow::{JobRun, MatrixCombination};

/// The `job` context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobContext {
    /// Current status of the job.
    pub status: Conclusion,
}

/// What a job can see of one of its dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeedContext {
    pub result: Conclusion,

    pub outputs: HashMap<String, String>,
}

/// The `needs` context, keyed by dependency job ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NeedsContext(HashMap<String, NeedContext>);

impl NeedsContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the conclusion and outputs of every needed job out of `jobs`.
    ///
    /// Returns the snapshot together with the IDs that were not found.
    pub fn snapshot(needs: &[String], jobs: &HashMap<String, JobRun>) -> (Self, Vec<String>) {
        let mut snapshot = HashMap::new();
        let mut missing = Vec::new();

        for need in needs {
            match jobs.get(need) {
                Some(jr) => {
                    snapshot.insert(
                        need.clone(),
                        NeedContext {
                            result: jr.conclusion,
                            outputs: jr.outputs.clone(),
                        },
                    );
                }
                None => missing.push(need.clone()),
            }
        }

        (Self(snapshot), missing)
    }

    pub fn get(&self, job_id: &str) -> Option<&NeedContext> {
        self.0.get(job_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The `matrix` context of the active job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatrixContext(MatrixCombination);

impl MatrixContext {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<MatrixCombination> for MatrixContext {
    fn from(matrix: MatrixCombination) -> Self {
        Self(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::Job;

    fn finished(id: &str, conclusion: Conclusion, outputs: &[(&str, &str)]) -> JobRun {
        let mut jr = JobRun::new(Job {
            id: id.to_string(),
            ..Job::default()
        });
        jr.conclusion = conclusion;
        jr.outputs = outputs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        jr
    }

    #[test]
    fn snapshot_copies_result_and_outputs() {
        let mut jobs = HashMap::new();
        jobs.insert("build".to_string(), finished("build", Conclusion::Success, &[("x", "v")]));
        jobs.insert("lint".to_string(), finished("lint", Conclusion::Failure, &[]));

        let (needs, missing) =
            NeedsContext::snapshot(&["build".to_string(), "lint".to_string()], &jobs);
        assert!(missing.is_empty());
        assert_eq!(needs.len(), 2);
        assert_eq!(needs.get("build").unwrap().result, Conclusion::Success);
        assert_eq!(needs.get("build").unwrap().outputs["x"], "v");
        assert_eq!(needs.get("lint").unwrap().result, Conclusion::Failure);

        jobs.get_mut("build").unwrap().outputs.insert("x".into(), "changed".into());
        assert_eq!(needs.get("build").unwrap().outputs["x"], "v");
    }

    #[test]
    fn snapshot_reports_missing_jobs() {
        let (needs, missing) = NeedsContext::snapshot(&["deploy".to_string()], &HashMap::new());
        assert!(needs.is_empty());
        assert_eq!(missing, vec!["deploy".to_string()]);
    }

    #[test]
    fn needs_serialize_as_map() {
        let mut jobs = HashMap::new();
        jobs.insert("a".to_string(), finished("a", Conclusion::Skipped, &[("k", "1")]));
        let (needs, _) = NeedsContext::snapshot(&["a".to_string()], &jobs);
        let val = serde_json::to_value(&needs).unwrap();
        assert_eq!(val["a"]["result"], serde_json::json!("skipped"));
        assert_eq!(val["a"]["outputs"]["k"], serde_json::json!("1"));
    }

    #[test]
    fn matrix_from_combination() {
        let mut combo = MatrixCombination::new();
        combo.insert("node".to_string(), serde_json::json!(20));
        let matrix = MatrixContext::from(combo);
        assert_eq!(matrix.get("node"), Some(&serde_json::json!(20)));
        assert!(MatrixContext::default().is_empty());
    }
}
