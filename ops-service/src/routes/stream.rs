use axum::body::Body;
use axum::extract::State;
use axum::response::{IntoResponse, Json, Response};
use envelope::{Envelope, Operation, StreamChunkEnvelope};
use futures::{stream, Stream, StreamExt};

use crate::dispatch::dispatch;
use crate::error_response::bad_request;
use crate::state::AppState;
use crate::streaming::{build_chunks, command_chunk_stream};

/// `POST /api/mcp/stream` — newline-delimited JSON, one `StreamChunkEnvelope`
/// per line, terminated by the chunk with `is_final: true`.
pub async fn stream(State(state): State<AppState>, Json(envelope): Json<Envelope>) -> Response {
    let req = match envelope {
        Envelope::Request(req) => req,
        other => {
            return bad_request(
                other.request_id().map(str::to_string),
                "expected a request envelope",
            )
        }
    };

    let chunks: std::pin::Pin<Box<dyn Stream<Item = StreamChunkEnvelope> + Send>> =
        if req.operation == Operation::ExecuteCommand && req.stream {
            match command_chunk_stream(&req, &state.config).await {
                Ok(chunks) => chunks,
                Err(err) => {
                    tracing::error!(request_id = %req.id, error = %err, "failed to start streaming command");
                    return crate::error_response::error_response(Some(req.id.clone()), err.code(), err.to_string());
                }
            }
        } else {
            let result = match dispatch(&req, &state.config).await {
                Ok(result) => result,
                Err(err) => {
                    tracing::error!(request_id = %req.id, operation = %req.operation, error = %err, "dispatch failed");
                    return crate::error_response::error_response(Some(req.id.clone()), err.code(), err.to_string());
                }
            };
            Box::pin(stream::iter(build_chunks(&req, &result)))
        };

    let lines = chunks.map(|chunk| {
        let mut line = serde_json::to_string(&Envelope::StreamChunk(chunk)).unwrap_or_default();
        line.push('\n');
        Ok::<_, std::io::Error>(line)
    });

    let body = Body::from_stream(lines);
    Response::builder()
        .header("content-type", "application/x-ndjson")
        .body(body)
        .unwrap_or_else(|_| bad_request(Some(req.id), "failed to build stream response"))
}
