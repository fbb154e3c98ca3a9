//! Tool Client: turns a model tool call into a request envelope, normalizes
//! path-like arguments against the caller's real home directory, and
//! dispatches it to the operations service with a bounded retry/timeout
//! policy.

use std::time::Duration;

use envelope::{Envelope, Operation, RequestEnvelope};
use serde_json::{Map, Value};

use crate::conversation::ToolCall;
use crate::error::ToolClientError;

pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TOOL_MAX_RETRIES: u32 = 3;
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

fn operation_for(name: &str) -> Option<Operation> {
    Operation::all().into_iter().find(|op| op.as_str() == name)
}

/// Rewrites `~`, a bare `/home`, or `/home/<other-user>/...` path prefixes to
/// the real home directory of the process the Tool Client runs as. This
/// lets a model trained on a different filesystem layout still address the
/// operator's actual home directory, without the model needing to know it.
pub fn normalize_path_alias(path: &str, real_home: &str) -> String {
    if let Some(rest) = path.strip_prefix('~') {
        return format!("{real_home}{rest}");
    }
    if path == "/home" {
        return real_home.to_string();
    }
    if let Some(rest) = path.strip_prefix("/home/") {
        if let Some(slash) = rest.find('/') {
            return format!("{real_home}{}", &rest[slash..]);
        }
        return real_home.to_string();
    }
    path.to_string()
}

fn normalize_arguments(mut arguments: Value, real_home: &str) -> Value {
    if let Value::Object(ref mut map) = arguments {
        for key in ["path", "root"] {
            if let Some(Value::String(value)) = map.get(key).cloned() {
                map.insert(key.to_string(), Value::String(normalize_path_alias(&value, real_home)));
            }
        }
    }
    arguments
}

pub struct ToolClient {
    http: reqwest::Client,
    base_url: String,
    real_home: String,
    timeout_secs: u64,
    max_retries: u32,
}

pub struct ToolOutcome {
    pub result: Value,
}

impl ToolClient {
    pub fn new(base_url: impl Into<String>, real_home: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            real_home: real_home.into(),
            timeout_secs: DEFAULT_TOOL_TIMEOUT_SECS,
            max_retries: DEFAULT_TOOL_MAX_RETRIES,
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// The home directory path aliases are normalized against (see
    /// [`normalize_path_alias`]). Exposed so the Turn Runner can fold it
    /// into the system-context message it injects into new conversations.
    pub fn real_home(&self) -> &str {
        &self.real_home
    }

    /// Calls the operations service for `call`, retrying up to
    /// `max_retries` times with a fixed 1s delay on transport failure or a
    /// per-attempt timeout. A well-formed `ErrorEnvelope` from the service
    /// is *not* retried — it's a definitive answer, not a transient fault.
    pub async fn call(&self, call: &ToolCall) -> Result<ToolOutcome, ToolClientError> {
        let operation = operation_for(&call.name).ok_or_else(|| ToolClientError::UnknownTool(call.name.clone()))?;

        let params = match normalize_arguments(call.arguments.clone(), &self.real_home) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let request = RequestEnvelope::new(operation, params, false);

        let mut last_err = None;
        for attempt in 0..=self.max_retries {
            match self.try_once(&request).await {
                Ok(outcome) => return Ok(outcome),
                Err(ToolClientError::OperationFailed { code, message }) => {
                    return Err(ToolClientError::OperationFailed { code, message });
                }
                Err(err) => {
                    tracing::warn!(attempt, tool = %call.name, error = %err, "tool call attempt failed");
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or(ToolClientError::RetriesExhausted(self.max_retries)))
    }

    async fn try_once(&self, request: &RequestEnvelope) -> Result<ToolOutcome, ToolClientError> {
        let send = self
            .http
            .post(format!("{}/api/mcp/request", self.base_url))
            .json(&Envelope::Request(request.clone()))
            .timeout(Duration::from_secs(self.timeout_secs))
            .send();

        let response = match send.await {
            Ok(response) => response,
            Err(err) => {
                tokio::time::sleep(RETRY_DELAY).await;
                return Err(ToolClientError::Request(err));
            }
        };

        let envelope: Envelope = match response.json().await {
            Ok(envelope) => envelope,
            Err(err) => {
                tokio::time::sleep(RETRY_DELAY).await;
                return Err(ToolClientError::Request(err));
            }
        };

        match envelope {
            // Only `type="response" ∧ status="success"` counts as success
            // (§4.8); a response envelope carrying any other status is
            // surfaced as a tool failure, same as an explicit error envelope.
            Envelope::Response(resp) if resp.status == envelope::ResponseStatus::Success => {
                Ok(ToolOutcome { result: resp.result })
            }
            Envelope::Response(resp) => Err(ToolClientError::OperationFailed {
                code: format!("{:?}", resp.status),
                message: resp.result.to_string(),
            }),
            Envelope::Error(err) => Err(ToolClientError::OperationFailed {
                code: err.error_code.as_str().to_string(),
                message: err.error_message,
            }),
            other => Err(ToolClientError::MalformedEnvelope(format!("{other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilde_paths_rewrite_to_real_home() {
        assert_eq!(normalize_path_alias("~/notes.txt", "/home/alice"), "/home/alice/notes.txt");
        assert_eq!(normalize_path_alias("~", "/home/alice"), "/home/alice");
    }

    #[test]
    fn bare_home_rewrites_to_real_home() {
        assert_eq!(normalize_path_alias("/home", "/home/alice"), "/home/alice");
    }

    #[test]
    fn other_users_home_rewrites_preserving_the_tail() {
        assert_eq!(
            normalize_path_alias("/home/bob/projects/x", "/home/alice"),
            "/home/alice/projects/x"
        );
    }

    #[test]
    fn unrelated_paths_pass_through_unchanged() {
        assert_eq!(normalize_path_alias("/var/log/app.log", "/home/alice"), "/var/log/app.log");
    }
}
