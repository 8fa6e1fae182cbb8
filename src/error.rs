//! Boundary error type.
//!
//! Validation findings are never errors; they are collected into a
//! `ValidationResult`. `ValidatorError` is reserved for input that cannot be
//! turned into a workflow graph at all.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Parse,
    Precondition,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Parse => write!(f, "Parse"),
            Phase::Precondition => write!(f, "Precondition"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidatorError {
    #[error("[{phase}] malformed workflow input: {message}")]
    Malformed { phase: Phase, message: String },

    #[error("[Precondition] duplicate node id '{0}'")]
    DuplicateNodeId(String),
}

impl ValidatorError {
    pub fn malformed(message: impl Into<String>) -> Self {
        ValidatorError::Malformed {
            phase: Phase::Parse,
            message: message.into(),
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            ValidatorError::Malformed { phase, .. } => phase.clone(),
            ValidatorError::DuplicateNodeId(_) => Phase::Precondition,
        }
    }
}
