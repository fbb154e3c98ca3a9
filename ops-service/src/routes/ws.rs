use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use envelope::{Envelope, ErrorCode, ErrorEnvelope, Operation, ResponseEnvelope};
use futures::StreamExt;

use crate::dispatch::dispatch;
use crate::state::AppState;
use crate::streaming::{build_chunks, command_chunk_stream};

/// `/ws/mcp` — a persistent connection over which the caller may send any
/// number of request envelopes, each answered with a response envelope (or,
/// for `stream: true` requests, a sequence of stream-chunk envelopes). The
/// connection stays open across requests, unlike the other three transports.
pub async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    while let Some(Ok(message)) = socket.recv().await {
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        let envelope: Envelope = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(err) => {
                let error = ErrorEnvelope::new(None, ErrorCode::RequestError, err.to_string());
                if send(&mut socket, &Envelope::Error(error)).await.is_err() {
                    break;
                }
                continue;
            }
        };

        let req = match envelope {
            Envelope::Request(req) => req,
            other => {
                let error = ErrorEnvelope::new(
                    other.request_id().map(str::to_string),
                    ErrorCode::RequestError,
                    "expected a request envelope",
                );
                if send(&mut socket, &Envelope::Error(error)).await.is_err() {
                    break;
                }
                continue;
            }
        };

        tracing::info!(request_id = %req.id, operation = %req.operation, "websocket request");

        let send_result = if req.operation == Operation::ExecuteCommand && req.stream {
            match command_chunk_stream(&req, &state.config).await {
                Ok(chunks) => send_stream(&mut socket, chunks).await,
                Err(err) => {
                    let error = ErrorEnvelope::new(Some(req.id.clone()), err.code(), err.to_string());
                    if send(&mut socket, &Envelope::Error(error)).await.is_err() {
                        break;
                    }
                    continue;
                }
            }
        } else {
            match dispatch(&req, &state.config).await {
                Ok(result) => {
                    if req.stream && req.operation.supports_streaming() {
                        send_stream(&mut socket, Box::pin(futures::stream::iter(build_chunks(&req, &result)))).await
                    } else {
                        send(&mut socket, &Envelope::Response(ResponseEnvelope::success(&req.id, result))).await
                    }
                }
                Err(err) => {
                    let error = ErrorEnvelope::new(Some(req.id.clone()), err.code(), err.to_string());
                    if send(&mut socket, &Envelope::Error(error)).await.is_err() {
                        break;
                    }
                    continue;
                }
            }
        };

        if send_result.is_err() {
            break;
        }
    }
}

async fn send_stream(
    socket: &mut WebSocket,
    mut chunks: std::pin::Pin<Box<dyn futures::Stream<Item = envelope::StreamChunkEnvelope> + Send>>,
) -> Result<(), axum::Error> {
    while let Some(chunk) = chunks.next().await {
        send(socket, &Envelope::StreamChunk(chunk)).await?;
    }
    Ok(())
}

async fn send(socket: &mut WebSocket, envelope: &Envelope) -> Result<(), axum::Error> {
    let text = serde_json::to_string(envelope).unwrap_or_default();
    socket.send(Message::Text(text.into())).await
}
