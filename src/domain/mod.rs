//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod catalog;
pub mod entities;
pub mod error;
pub mod event;
pub mod form;
pub mod pipeline_state;
pub mod validation;

pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use event::{EventLevel, PipelineEvent};
pub use form::{FormInput, FormOverrides, FormPreview};
pub use pipeline_state::PipelineState;
pub use validation::{FieldError, FieldStatus, ValidationReport};
