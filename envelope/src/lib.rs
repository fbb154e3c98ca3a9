//! Wire-protocol types shared between the Operations Service and the
//! Orchestrator's Tool Client.
//!
//! Every message on the wire is an [`Envelope`]: a tagged union whose `type`
//! field is examined first, then the remaining fields are decoded according
//! to that tag (never by field-presence heuristics — see the design note in
//! the operations-service protocol layer).

mod catalog;
mod error;
mod operation;
mod payload;

pub use catalog::{OperationDescriptor, ParamDescriptor, ParamType, operation_catalog};
pub use error::ErrorCode;
pub use operation::Operation;
pub use payload::{
    CommandResult, CreateEditAppendResult, FileDescriptor, FileKind, GrepMatch, GrepResult,
    ListDirectoryResult, ReadFileResult, WriteKind,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Current wire-protocol version. Bumped on breaking envelope changes.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Every wire message, discriminated by its `type` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Envelope {
    Request(RequestEnvelope),
    Response(ResponseEnvelope),
    StreamChunk(StreamChunkEnvelope),
    Error(ErrorEnvelope),
}

impl Envelope {
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Envelope::Request(r) => Some(&r.id),
            Envelope::Response(r) => Some(&r.request_id),
            Envelope::StreamChunk(c) => Some(&c.request_id),
            Envelope::Error(e) => e.request_id.as_deref(),
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub operation: Operation,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub stream: bool,
}

impl RequestEnvelope {
    pub fn new(operation: Operation, params: Map<String, Value>, stream: bool) -> Self {
        Self {
            id: new_id(),
            timestamp: Utc::now(),
            version: PROTOCOL_VERSION.to_string(),
            operation,
            params,
            stream,
        }
    }

    /// Fetch a required string parameter.
    pub fn param_str(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(Value::as_str)
    }

    pub fn param_bool(&self, name: &str, default: bool) -> bool {
        self.params.get(name).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn param_u64(&self, name: &str, default: u64) -> u64 {
        self.params.get(name).and_then(Value::as_u64).unwrap_or(default)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Success,
    Streaming,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub request_id: String,
    pub status: ResponseStatus,
    pub result: Value,
    pub stream_complete: bool,
}

impl ResponseEnvelope {
    pub fn success(request_id: impl Into<String>, result: Value) -> Self {
        Self {
            id: new_id(),
            timestamp: Utc::now(),
            version: PROTOCOL_VERSION.to_string(),
            request_id: request_id.into(),
            status: ResponseStatus::Success,
            result,
            stream_complete: true,
        }
    }

    /// The unary-endpoint "stream initiated" placeholder (see §4.5/§9): the
    /// caller is expected to switch transports for the actual stream.
    pub fn streaming_placeholder(request_id: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            timestamp: Utc::now(),
            version: PROTOCOL_VERSION.to_string(),
            request_id: request_id.into(),
            status: ResponseStatus::Streaming,
            result: Value::Null,
            stream_complete: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunkEnvelope {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub request_id: String,
    pub sequence: u64,
    pub data: Value,
    pub is_final: bool,
}

impl StreamChunkEnvelope {
    pub fn new(request_id: impl Into<String>, sequence: u64, data: Value, is_final: bool) -> Self {
        Self {
            id: new_id(),
            timestamp: Utc::now(),
            version: PROTOCOL_VERSION.to_string(),
            request_id: request_id.into(),
            sequence,
            data,
            is_final,
        }
    }

    /// Terminal chunk carrying the completion sentinel.
    pub fn terminal(request_id: impl Into<String>, sequence: u64) -> Self {
        Self::new(request_id, sequence, Value::String("DONE".to_string()), true)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub error_code: ErrorCode,
    pub error_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorEnvelope {
    pub fn new(
        request_id: Option<String>,
        error_code: ErrorCode,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            timestamp: Utc::now(),
            version: PROTOCOL_VERSION.to_string(),
            request_id,
            error_code,
            error_message: error_message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_envelope_round_trips() {
        let mut params = Map::new();
        params.insert("path".into(), Value::String("/tmp".into()));
        let req = RequestEnvelope::new(Operation::ListDirectory, params, false);
        let env = Envelope::Request(req.clone());
        let json = serde_json::to_string(&env).unwrap();
        assert!(json.contains("\"type\":\"request\""));
        let back: Envelope = serde_json::from_str(&json).unwrap();
        match back {
            Envelope::Request(r) => assert_eq!(r.id, req.id),
            _ => panic!("expected request variant"),
        }
    }

    #[test]
    fn error_envelope_may_omit_request_id() {
        let err = ErrorEnvelope::new(None, ErrorCode::RequestError, "malformed json");
        let json = serde_json::to_string(&err).unwrap();
        assert!(!json.contains("request_id"));
    }

    #[test]
    fn envelope_request_id_accessor_covers_all_variants() {
        let resp = Envelope::Response(ResponseEnvelope::success("r1", Value::Null));
        assert_eq!(resp.request_id(), Some("r1"));
        let chunk = Envelope::StreamChunk(StreamChunkEnvelope::terminal("r2", 3));
        assert_eq!(chunk.request_id(), Some("r2"));
    }
}
