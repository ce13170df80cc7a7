use thiserror::Error;

use crate::progression::InvalidRange;

/// Rejected shapes of a step sequence, reported by `StepSequence::build`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("invalid step at position {position}: {reason}")]
    InvalidStep { position: usize, reason: String },
    #[error("name `{0}` is bound more than once")]
    DuplicateBinding(String),
    #[error("parameter {0} has an empty name")]
    InvalidParameter(usize),
}

impl BuildError {
    pub(crate) fn invalid_step(position: usize, reason: impl Into<String>) -> Self {
        BuildError::InvalidStep {
            position,
            reason: reason.into(),
        }
    }
}

/// Failures that abort a single evaluation.
///
/// `Nothing` and `Error(message)` are ordinary results and never show up here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unbound variable `{0}`")]
    UnboundVariable(String),
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("`{name}` expects {expected} argument(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error(transparent)]
    InvalidRange(#[from] InvalidRange),
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow in `{op}`")]
    Overflow { op: &'static str },
    #[error("unsupported operands for `{op}`: {left} and {right}")]
    InvalidOperands {
        op: &'static str,
        left: String,
        right: String,
    },
    #[error("call to `{name}` failed: {message}")]
    Call { name: String, message: String },
}

impl EvalError {
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        EvalError::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Front-end error for the CLI and configuration loading.
#[derive(Debug, Error)]
pub enum FluffyError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    InvalidCommand(String),
}
