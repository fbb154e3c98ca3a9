use axum::Json;
use serde_json::{json, Value};

/// Liveness probe: always `ok` if the process can answer HTTP at all.
/// Distinct from `/api/chat/health`, which may later report degraded states
/// (model endpoint unreachable, operations service unreachable) without
/// this one ever doing so.
pub async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
