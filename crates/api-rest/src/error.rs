//! Mapping from core errors to HTTP responses.
//!
//! Every failure is answered with a JSON body: `{"detail": "..."}`, or the field-keyed map for
//! validation failures. Internal errors are logged and never leak their cause to the client.

use api_shared::auth::AuthError;
use api_shared::ErrorRes;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use mhr_core::RecordsError;

pub const PERMISSION_DENIED: &str = "You do not have permission to perform this action.";
pub const NOT_FOUND: &str = "Not found.";

#[derive(Debug)]
pub enum ApiError {
    Unauthenticated(AuthError),
    NotFound,
    Records(RecordsError),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthenticated(err)
    }
}

impl From<RecordsError> for ApiError {
    fn from(err: RecordsError) -> Self {
        ApiError::Records(err)
    }
}

fn detail(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorRes {
            detail: message.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthenticated(err) => {
                let mut response = detail(StatusCode::UNAUTHORIZED, err.to_string());
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, header::HeaderValue::from_static("Token"));
                response
            }
            ApiError::NotFound => detail(StatusCode::NOT_FOUND, NOT_FOUND),
            ApiError::Records(err) => records_response(err),
        }
    }
}

fn records_response(err: RecordsError) -> Response {
    match err {
        RecordsError::Forbidden(message) => detail(StatusCode::FORBIDDEN, message),
        RecordsError::UnknownRole(_) => detail(StatusCode::FORBIDDEN, PERMISSION_DENIED),
        RecordsError::UnknownUser(_) => detail(
            StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken.to_string(),
        ),
        RecordsError::PatientProfileNotFound
        | RecordsError::NotFound(_)
        | RecordsError::NoRecords(_) => detail(StatusCode::NOT_FOUND, err.to_string()),
        RecordsError::Validation(fields) => (StatusCode::BAD_REQUEST, Json(fields)).into_response(),
        RecordsError::InvalidInput(message) => detail(StatusCode::BAD_REQUEST, message),
        other => {
            tracing::error!("request failed: {:?}", other);
            detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}
