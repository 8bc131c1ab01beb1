use thiserror::Error;

use crate::models::payload::ValidationFailure;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Invalid input: {0}")]
    Validation(ValidationFailure),

    #[error("Event not found: {0}")]
    NotFound(String),

    #[error("Store failure: {0}")]
    Store(#[from] sqlx::Error),
}

impl From<ValidationFailure> for EventError {
    fn from(failure: ValidationFailure) -> Self {
        EventError::Validation(failure)
    }
}

pub type EventResult<T> = Result<T, EventError>;
