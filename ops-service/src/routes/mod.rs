mod catalog;
mod health;
mod sse;
mod stream;
mod unary;
mod ws;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/mcp/operations", get(catalog::operations))
        .route("/api/mcp/health", get(health::health))
        .route("/api/mcp/request", post(unary::request))
        .route("/api/mcp/stream", post(stream::stream))
        .route("/api/mcp/sse-stream", post(sse::sse_stream))
        .route("/ws/mcp", get(ws::upgrade))
        .with_state(state)
}
