//! Consistent JSON error responses.
//!
//! Envelope: `{"error": "<message>"}`. Internal failures are logged with
//! detail server-side and surfaced as a generic 500.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use mealbridge_auth::GateError;
use mealbridge_core::DomainError;

pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (status, axum::Json(json!({ "error": message.into() }))).into_response()
}

pub fn domain_error_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, msg),
        DomainError::InvalidTransition(msg) => json_error(StatusCode::BAD_REQUEST, msg),
        DomainError::NotFound { entity } => {
            json_error(StatusCode::NOT_FOUND, format!("{entity} not found"))
        }
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, msg),
        DomainError::PermissionDenied(msg) => json_error(StatusCode::FORBIDDEN, msg),
        DomainError::Storage(detail) | DomainError::Crypto(detail) => {
            tracing::error!(error = %detail, "internal error");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}

pub fn gate_error_response(err: GateError) -> axum::response::Response {
    match err {
        GateError::Unauthenticated => json_error(StatusCode::UNAUTHORIZED, "not authenticated"),
        GateError::Forbidden => json_error(StatusCode::FORBIDDEN, "unauthorized"),
    }
}
