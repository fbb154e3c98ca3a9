use axum::extract::State;
use axum::response::{IntoResponse, Json, Response};
use envelope::{Envelope, ResponseEnvelope};

use crate::dispatch::dispatch;
use crate::error::DispatchError;
use crate::error_response::error_response;
use crate::state::AppState;

/// `POST /api/mcp/request` — one request envelope in, one response (or
/// error) envelope out. If the request sets `stream: true`, this endpoint
/// returns the streaming placeholder described in the design notes rather
/// than attempting to stream over a unary response; the caller is expected
/// to switch to `/api/mcp/stream`, `/api/mcp/sse-stream`, or `/ws/mcp` for
/// the actual stream. Kept for wire-compatibility, not because it's the
/// right way to get a stream.
pub async fn request(State(state): State<AppState>, Json(envelope): Json<Envelope>) -> Response {
    let req = match envelope {
        Envelope::Request(req) => req,
        other => {
            let err = DispatchError::NotARequestEnvelope;
            return error_response(other.request_id().map(str::to_string), err.code(), err.to_string());
        }
    };

    if req.stream {
        tracing::warn!(
            request_id = %req.id,
            operation = %req.operation,
            "stream requested on unary endpoint; returning placeholder, switch transports for the real stream"
        );
        return Json(Envelope::Response(ResponseEnvelope::streaming_placeholder(&req.id))).into_response();
    }

    match dispatch(&req, &state.config).await {
        Ok(result) => Json(Envelope::Response(ResponseEnvelope::success(&req.id, result))).into_response(),
        Err(err) => {
            let err = DispatchError::from(err);
            tracing::error!(request_id = %req.id, operation = %req.operation, error = %err, "dispatch failed");
            error_response(Some(req.id.clone()), err.code(), err.to_string())
        }
    }
}
