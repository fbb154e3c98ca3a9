use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::conversation::ConversationId;
use crate::state::AppState;

pub async fn history(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.get(&ConversationId(id)).await {
        Ok(conversation) => Json(conversation).into_response(),
        Err(err) => (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": err.to_string() }))).into_response(),
    }
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.clear(&ConversationId(id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": err.to_string() }))).into_response(),
    }
}

pub async fn list(State(state): State<AppState>) -> Response {
    let ids: Vec<String> = state.store.list().await.into_iter().map(|id| id.0).collect();
    Json(serde_json::json!({ "conversations": ids })).into_response()
}
