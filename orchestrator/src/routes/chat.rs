use axum::extract::State;
use axum::response::{IntoResponse, Json, Response};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::conversation::ConversationId;
use crate::state::AppState;
use crate::turn_runner::TurnRequestOptions;

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub enable_tools: Option<bool>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ToolCallSummary {
    pub tool_name: String,
    pub success: bool,
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub conversation_id: String,
    pub message: String,
    pub tool_calls_made: Vec<ToolCallSummary>,
    pub model: String,
    pub elapsed_time_ms: u64,
}

pub async fn message(State(state): State<AppState>, Json(req): Json<MessageRequest>) -> Response {
    let conversation_id = req.conversation_id.map(ConversationId);
    let options = TurnRequestOptions {
        model: req.model,
        temperature: req.temperature,
        max_tokens: req.max_tokens,
        tools_enabled: req.enable_tools,
    };
    match state
        .turn_runner
        .run_turn_with_options(conversation_id, &req.message, options)
        .await
    {
        Ok(outcome) => Json(MessageResponse {
            conversation_id: outcome.conversation_id.0,
            message: outcome.assistant_message,
            tool_calls_made: outcome
                .tool_calls
                .into_iter()
                .map(|record| ToolCallSummary {
                    tool_name: record.name,
                    success: record.success,
                    summary: record.summary,
                })
                .collect(),
            model: outcome.model,
            elapsed_time_ms: outcome.elapsed_ms,
        })
        .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "turn failed");
            (StatusCode::BAD_GATEWAY, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
        }
    }
}
