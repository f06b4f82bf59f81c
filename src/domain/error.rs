//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::{FieldError, PipelineState};

/// Domain errors represent business logic violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid form: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("invalid {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("catalog dataset {0} not found")]
    DatasetNotFound(String),

    #[error("invalid dataset reference: {0}")]
    InvalidDatasetRef(String),

    #[error("illegal pipeline transition: {from} -> {to}")]
    IllegalTransition {
        from: PipelineState,
        to: PipelineState,
    },
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
