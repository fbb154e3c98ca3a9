use axum::extract::State;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct Capabilities {
    models: Vec<String>,
    tools_enabled: bool,
    max_calls_per_turn: usize,
}

/// Reports what this deployment can actually do: the models the configured
/// model endpoint currently has loaded (via its `GET /api/tags`), whether
/// tool calling is enabled, and the per-turn tool-call cap.
pub async fn capabilities(State(state): State<AppState>) -> Response {
    let models = state.model_client.list_models().await.unwrap_or_default();
    Json(Capabilities {
        models,
        tools_enabled: state.config.tools_enabled,
        max_calls_per_turn: state.config.max_calls_per_turn,
    })
    .into_response()
}
