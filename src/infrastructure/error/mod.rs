use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::signup::{SignupError, ValidationError};

/// Body of every signup failure
pub const SIGNUP_FAILED_MESSAGE: &str = "An error occurred during signup";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Signup failed: {0}")]
    Signup(String),

    #[error("Request body rejected: {0}")]
    Body(#[from] BytesRejection),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
}

impl From<SignupError> for AppError {
    fn from(err: SignupError) -> Self {
        match err {
            SignupError::Validation(e) => AppError::Validation(e),
            other => AppError::Signup(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, client_message, reason) = match &self {
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string(), Some(e.reason())),
            AppError::Signup(detail) => {
                // Details stay in the log
                tracing::error!(error = %detail, "Signup error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    SIGNUP_FAILED_MESSAGE.to_string(),
                    None,
                )
            }
            AppError::Body(rejection) => {
                tracing::debug!(error = %rejection, "Request body rejected");
                (rejection.status(), rejection.body_text(), None)
            }
        };

        let body = ErrorResponse {
            error: client_message,
            reason,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
