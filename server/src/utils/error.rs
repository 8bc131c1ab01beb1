use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::models::payload::ValidationFailure;
use crate::service::EventError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(ValidationFailure),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::ValidationError(failure) => {
                warn!(fields = %failure, "Rejected invalid input");
            }
            AppError::NotFound(msg) => {
                warn!(message = %msg, "Resource not found");
            }
            AppError::DatabaseError(e) => {
                error!(error = ?e, "Database error");
            }
        }
    }
}

impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::Validation(failure) => AppError::ValidationError(failure),
            EventError::NotFound(id) => {
                AppError::NotFound(format!("Event with ID {} not found", id))
            }
            EventError::Store(e) => AppError::DatabaseError(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        self.log();

        // Internal details stay in the logs.
        match self {
            AppError::ValidationError(failure) => error_response(
                code,
                "Request validation failed",
                Some(failure.errors),
                status,
            ),
            AppError::NotFound(msg) => error_response(code, msg, None, status),
            AppError::DatabaseError(_) => {
                error_response(code, "A database error occurred", None, status)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payload::FieldError;

    #[test]
    fn test_status_codes() {
        let validation = AppError::ValidationError(ValidationFailure::single("title", "too short"));
        assert_eq!(validation.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(validation.code(), "VALIDATION_ERROR");

        let not_found = AppError::from(EventError::NotFound("abc".to_string()));
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let store = AppError::from(EventError::Store(sqlx::Error::PoolTimedOut));
        assert_eq!(store.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(store.code(), "DATABASE_ERROR");
    }

    #[test]
    fn test_validation_failure_keeps_every_field() {
        let failure = ValidationFailure::new(vec![
            FieldError::new("title", "too short"),
            FieldError::new("location.latitude", "out of range"),
        ]);
        match AppError::from(EventError::Validation(failure)) {
            AppError::ValidationError(f) => {
                assert_eq!(f.errors.len(), 2);
                assert_eq!(f.errors[0].field, "location.latitude");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
