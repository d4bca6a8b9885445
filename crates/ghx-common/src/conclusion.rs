// Conclusion / outcome values for workflow, job and step runs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Result of a run unit.
///
/// The same type carries both the *outcome* (raw result before
/// `continue-on-error`) and the *conclusion* (result after it).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conclusion {
    #[default]
    Success,
    Failure,
    Cancelled,
    Skipped,
    Neutral,
}

impl Conclusion {
    /// Derive a conclusion from a raw outcome.
    ///
    /// A failure under `continue-on-error` concludes as success; every other
    /// outcome concludes as itself.
    pub fn resolve(outcome: Conclusion, continue_on_error: bool) -> Conclusion {
        match outcome {
            Conclusion::Failure if continue_on_error => Conclusion::Success,
            other => other,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Conclusion::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Conclusion::Success => "success",
            Conclusion::Failure => "failure",
            Conclusion::Cancelled => "cancelled",
            Conclusion::Skipped => "skipped",
            Conclusion::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown conclusion string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown conclusion: {0}")]
pub struct ParseConclusionError(pub String);

impl FromStr for Conclusion {
    type Err = ParseConclusionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "success" => Ok(Conclusion::Success),
            "failure" => Ok(Conclusion::Failure),
            "cancelled" => Ok(Conclusion::Cancelled),
            "skipped" => Ok(Conclusion::Skipped),
            "neutral" => Ok(Conclusion::Neutral),
            _ => Err(ParseConclusionError(s.to_string())),
        }
    }
}

/// Resolve an outcome under `continue-on-error`. See [`Conclusion::resolve`].
pub fn resolve(outcome: Conclusion, continue_on_error: bool) -> Conclusion {
    Conclusion::resolve(outcome, continue_on_error)
}
