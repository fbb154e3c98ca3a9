//! Uniform error-response construction, generalized from the teacher
//! workspace's `routers/error.rs` pattern: a small set of constructors that
//! all funnel through one function producing a consistent body shape and an
//! error-code header, rather than each handler building its own response.

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use envelope::{ErrorCode, ErrorEnvelope};

pub const HEADER_X_OPS_ERROR_CODE: &str = "x-ops-error-code";

/// Wraps an [`OpsError`](ops_core::OpsError)-derived code/message pair into
/// the axum response every transport's error path returns.
pub fn error_response(request_id: Option<String>, code: ErrorCode, message: impl Into<String>) -> Response {
    let envelope = ErrorEnvelope::new(request_id, code, message);
    create_error_response(code, envelope)
}

fn create_error_response(code: ErrorCode, envelope: ErrorEnvelope) -> Response {
    let status = StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, Json(envelope)).into_response();
    if let Ok(value) = HeaderValue::from_str(code.as_str()) {
        response.headers_mut().insert(HEADER_X_OPS_ERROR_CODE, value);
    }
    response
}

pub fn bad_request(request_id: Option<String>, message: impl Into<String>) -> Response {
    error_response(request_id, ErrorCode::RequestError, message)
}
