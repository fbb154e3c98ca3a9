mod capabilities;
mod chat;
mod conversations;
mod health;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat/message", post(chat::message))
        .route("/api/chat/conversation/{id}/history", get(conversations::history))
        .route("/api/chat/conversation/{id}", delete(conversations::delete))
        .route("/api/chat/conversations", get(conversations::list))
        .route("/api/chat/health", get(health::health))
        .route("/api/chat/capabilities", get(capabilities::capabilities))
        .route("/api/chat/ping", get(health::ping))
        .with_state(state)
}
