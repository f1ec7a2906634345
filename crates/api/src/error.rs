//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use saga::SagaError;

/// API-level error type that maps to HTTP responses.
///
/// The entry-point contract distinguishes only validation failures
/// (400) from provisioning failures (500); everything else about the
/// failure stays in the `error` message and the logs.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Saga execution error.
    Saga(SagaError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Saga(err) => saga_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn saga_error_to_response(err: SagaError) -> (StatusCode, String) {
    match &err {
        SagaError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        SagaError::EmailAlreadyRegistered(_) | SagaError::IdentityCreation(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        SagaError::BusinessCreation { compensation, .. } => {
            if !compensation.is_clean() {
                tracing::error!(
                    failures = compensation.failures().len(),
                    "provisioning failed with incomplete compensation"
                );
            }
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<SagaError> for ApiError {
    fn from(err: SagaError) -> Self {
        ApiError::Saga(err)
    }
}
