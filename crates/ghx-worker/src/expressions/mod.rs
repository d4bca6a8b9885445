// expressions: the variable surface an expression evaluator reads.
// Evaluating `${{ ... }}` itself happens elsewhere; this module only answers
// "what is the value of `github`, `steps`, `needs`, ...".

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::errors::VariableError;
use crate::execution_context::ExecutionContext;

/// Top-level names an expression can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableName {
    Github,
    Runner,
    Env,
    Vars,
    Job,
    Steps,
    Secrets,
    Strategy,
    Matrix,
    Needs,
    Inputs,
    Infinity,
    Nan,
}

impl VariableName {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableName::Github => "github",
            VariableName::Runner => "runner",
            VariableName::Env => "env",
            VariableName::Vars => "vars",
            VariableName::Job => "job",
            VariableName::Steps => "steps",
            VariableName::Secrets => "secrets",
            VariableName::Strategy => "strategy",
            VariableName::Matrix => "matrix",
            VariableName::Needs => "needs",
            VariableName::Inputs => "inputs",
            VariableName::Infinity => "infinity",
            VariableName::Nan => "nan",
        }
    }
}

impl fmt::Display for VariableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariableName {
    type Err = VariableError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "github" => Ok(VariableName::Github),
            "runner" => Ok(VariableName::Runner),
            "env" => Ok(VariableName::Env),
            "vars" => Ok(VariableName::Vars),
            "job" => Ok(VariableName::Job),
            "steps" => Ok(VariableName::Steps),
            "secrets" => Ok(VariableName::Secrets),
            "strategy" => Ok(VariableName::Strategy),
            "matrix" => Ok(VariableName::Matrix),
            "needs" => Ok(VariableName::Needs),
            "inputs" => Ok(VariableName::Inputs),
            "infinity" => Ok(VariableName::Infinity),
            "nan" => Ok(VariableName::Nan),
            other => Err(VariableError::UnknownVariable(other.to_string())),
        }
    }
}

/// A resolved variable.
///
/// Numbers are kept apart from JSON values because JSON cannot hold
/// infinity or NaN.
#[derive(Debug, Clone, PartialEq)]
pub enum Variable {
    Value(serde_json::Value),
    Number(f64),
}

impl Variable {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Variable::Number(n) => Some(*n),
            Variable::Value(value) => value.as_f64(),
        }
    }
}

/// Source of top-level expression variables.
pub trait VariableProvider {
    fn get_variable(&self, name: &str) -> Result<Variable, VariableError>;
}

impl VariableProvider for ExecutionContext {
    fn get_variable(&self, name: &str) -> Result<Variable, VariableError> {
        let name: VariableName = name.parse()?;
        match name {
            VariableName::Github => to_variable(name, self.github()),
            VariableName::Runner => to_variable(name, self.runner()),
            VariableName::Job => to_variable(name, self.job()),
            VariableName::Steps => to_variable(name, self.steps()),
            VariableName::Secrets => to_variable(name, self.secrets()),
            VariableName::Matrix => to_variable(name, self.matrix()),
            VariableName::Needs => to_variable(name, self.needs()),
            VariableName::Inputs => to_variable(name, self.inputs()),
            // Not populated yet; evaluators see an empty object.
            VariableName::Env | VariableName::Vars | VariableName::Strategy => {
                Ok(Variable::Value(serde_json::Value::Object(serde_json::Map::new())))
            }
            VariableName::Infinity => Ok(Variable::Number(f64::INFINITY)),
            VariableName::Nan => Ok(Variable::Number(f64::NAN)),
        }
    }
}

fn to_variable<T: Serialize>(name: VariableName, value: &T) -> Result<Variable, VariableError> {
    serde_json::to_value(value)
        .map(Variable::Value)
        .map_err(|source| VariableError::Conversion {
            name: name.to_string(),
            source,
        })
}
