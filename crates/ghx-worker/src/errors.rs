// Error types returned by the execution context and the variable provider.

/// An operation was called outside the workflow ⊃ job ⊃ step nesting.
///
/// These indicate a bug in the caller driving the context, not a runtime
/// condition to recover from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("no workflow is set")]
    NoActiveWorkflow,

    #[error("no job is set")]
    NoActiveJob,

    #[error("no step is set")]
    NoActiveStep,
}

/// A variable requested by the expression evaluator could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum VariableError {
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    #[error("failed to convert variable '{name}'")]
    Conversion {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}
