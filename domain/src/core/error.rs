//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("No models configured for the council")]
    NoModels,

    #[error("Duplicate council member: {0}")]
    DuplicateModel(String),

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Illegal deliberation transition: {from} -> {to}")]
    IllegalTransition { from: String, to: String },
}
