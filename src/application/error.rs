//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("failed to {stage}: {message}")]
    Stage { stage: String, message: String },

    #[error("training cancelled")]
    Cancelled,

    #[error("storage error: {message}")]
    Storage { message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    /// The field errors when the form was rejected, empty otherwise.
    pub fn field_errors(&self) -> &[crate::domain::FieldError] {
        match self {
            ApplicationError::Domain(DomainError::Validation(errors)) => errors,
            _ => &[],
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
