use axum::Json;
use serde_json::{json, Value};

/// `GET /api/mcp/health` — `{status:"UP", service, version}` per §6.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "UP",
        "service": "ops-service",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
