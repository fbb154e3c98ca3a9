use axum::body::Body;
use axum::http::{Request, StatusCode};
use envelope::{Envelope, ErrorCode, Operation, RequestEnvelope, ResponseStatus};
use ops_service::{app, Config};
use serde_json::{json, Map};
use tower::ServiceExt;

fn parse_ndjson(bytes: &[u8]) -> Vec<Envelope> {
    std::str::from_utf8(bytes)
        .unwrap()
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn test_config() -> Config {
    Config {
        listen_addr: "127.0.0.1:0".into(),
        command_timeout_secs: 5,
        search_max_depth: 10,
        log_format: "pretty".into(),
    }
}

#[tokio::test]
async fn operations_catalog_lists_all_seven_operations() {
    let router = app(test_config());
    let response = router
        .oneshot(Request::get("/api/mcp/operations").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let catalog: Vec<serde_json::Value> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(catalog.len(), 7);
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let router = app(test_config());
    let response = router
        .oneshot(Request::get("/api/mcp/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unary_request_round_trips_list_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut params = Map::new();
    params.insert("path".into(), json!(dir.path().to_str().unwrap()));
    let req = RequestEnvelope::new(Operation::ListDirectory, params, false);
    let body = serde_json::to_vec(&Envelope::Request(req)).unwrap();

    let router = app(test_config());
    let response = router
        .oneshot(
            Request::post("/api/mcp/request")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let envelope: Envelope = serde_json::from_slice(&bytes).unwrap();
    match envelope {
        Envelope::Response(resp) => assert_eq!(resp.status, ResponseStatus::Success),
        _ => panic!("expected a response envelope"),
    }
}

#[tokio::test]
async fn unary_request_reports_missing_parameter_as_error_envelope() {
    let req = RequestEnvelope::new(Operation::ReadFile, Map::new(), false);
    let body = serde_json::to_vec(&Envelope::Request(req)).unwrap();

    let router = app(test_config());
    let response = router
        .oneshot(
            Request::post("/api/mcp/request")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let envelope: Envelope = serde_json::from_slice(&bytes).unwrap();
    match envelope {
        Envelope::Error(err) => assert_eq!(err.error_code, ErrorCode::MissingParameter),
        _ => panic!("expected an error envelope"),
    }
}

#[tokio::test]
async fn unary_request_with_stream_flag_returns_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let mut params = Map::new();
    params.insert("path".into(), json!(dir.path().to_str().unwrap()));
    let req = RequestEnvelope::new(Operation::ListDirectory, params, true);
    let body = serde_json::to_vec(&Envelope::Request(req)).unwrap();

    let router = app(test_config());
    let response = router
        .oneshot(
            Request::post("/api/mcp/request")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let envelope: Envelope = serde_json::from_slice(&bytes).unwrap();
    match envelope {
        Envelope::Response(resp) => {
            assert_eq!(resp.status, ResponseStatus::Streaming);
            assert!(!resp.stream_complete);
        }
        _ => panic!("expected a response envelope"),
    }
}

/// Scenario 4 from the spec's end-to-end scenarios: a streaming
/// `execute_command` over the NDJSON endpoint yields one chunk per stdout
/// line, then an `EXIT_CODE:` chunk, then a terminal sentinel.
#[tokio::test]
async fn ndjson_stream_runs_execute_command_line_by_line() {
    let mut params = Map::new();
    params.insert("command".into(), json!("printf 'a\\nb\\nc\\n'"));
    let req = RequestEnvelope::new(Operation::ExecuteCommand, params, true);
    let body = serde_json::to_vec(&Envelope::Request(req)).unwrap();

    let router = app(test_config());
    let response = router
        .oneshot(
            Request::post("/api/mcp/stream")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let envelopes = parse_ndjson(&bytes);

    let chunks: Vec<_> = envelopes
        .into_iter()
        .map(|e| match e {
            Envelope::StreamChunk(c) => c,
            other => panic!("expected stream chunks, got {other:?}"),
        })
        .collect();

    assert_eq!(chunks.len(), 5);
    assert_eq!(chunks[0].sequence, 1);
    assert_eq!(chunks[0].data, json!("STDOUT: a"));
    assert_eq!(chunks[1].data, json!("STDOUT: b"));
    assert_eq!(chunks[2].data, json!("STDOUT: c"));
    assert_eq!(chunks[3].data, json!("EXIT_CODE: 0"));
    assert!(!chunks[3].is_final);
    assert!(chunks[4].is_final);
    for (idx, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.sequence, idx as u64 + 1);
    }
}

/// Scenario 5: a forbidden command is rejected before any process spawns,
/// regardless of transport.
#[tokio::test]
async fn forbidden_command_is_rejected_on_unary_endpoint() {
    let mut params = Map::new();
    params.insert("command".into(), json!("rm -rf /"));
    let req = RequestEnvelope::new(Operation::ExecuteCommand, params, false);
    let body = serde_json::to_vec(&Envelope::Request(req)).unwrap();

    let router = app(test_config());
    let response = router
        .oneshot(
            Request::post("/api/mcp/request")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let envelope: Envelope = serde_json::from_slice(&bytes).unwrap();
    match envelope {
        Envelope::Error(err) => assert_eq!(err.error_code, ErrorCode::ForbiddenCommand),
        _ => panic!("expected an error envelope"),
    }
}
