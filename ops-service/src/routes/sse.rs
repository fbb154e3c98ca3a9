use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Json, Response};
use envelope::{Envelope, Operation, StreamChunkEnvelope};
use futures::{stream, Stream, StreamExt};

use crate::dispatch::dispatch;
use crate::error_response::bad_request;
use crate::state::AppState;
use crate::streaming::{build_chunks, command_chunk_stream};

/// `POST /api/mcp/sse-stream` — the same chunk sequence as
/// `/api/mcp/stream`, framed as Server-Sent Events. Each event's `event:`
/// field is `stream-chunk` for every non-terminal chunk and
/// `stream-complete` for the final one, per §4.5.
pub async fn sse_stream(State(state): State<AppState>, Json(envelope): Json<Envelope>) -> Response {
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

    let events = chunks.map(|chunk| {
        let event_name = if chunk.is_final { "stream-complete" } else { "stream-chunk" };
        let payload = serde_json::to_string(&Envelope::StreamChunk(chunk)).unwrap_or_default();
        Ok::<_, Infallible>(Event::default().event(event_name).data(payload))
    });

    Sse::new(events)
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
        .into_response()
}
