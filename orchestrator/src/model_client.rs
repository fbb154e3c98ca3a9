//! Thin client for the local model inference endpoint (an Ollama-style
//! `POST /api/chat` / `GET /api/tags` pair).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::conversation::{Message, Role, ToolCall};
use crate::error::ModelClientError;
use crate::tool_catalog::ToolDefinition;

#[derive(Debug, Clone, Serialize)]
pub struct ChatOptions {
    pub temperature: f32,
    pub num_predict: u32,
}

#[derive(Debug, Clone, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireToolCall {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    function: WireFunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(deserialize_with = "deserialize_arguments")]
    arguments: Value,
}

/// The model endpoint may send `arguments` as either a JSON object or a
/// JSON-encoded string (some tool-calling backends stringify it); accept
/// both rather than failing to parse one of them.
fn deserialize_arguments<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    match raw {
        Value::String(s) => Ok(serde_json::from_str(&s).unwrap_or(Value::String(s))),
        other => Ok(other),
    }
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        let role = match message.role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        };
        WireMessage {
            role,
            content: message.content.clone(),
            tool_calls: message
                .tool_calls
                .iter()
                .map(|call| WireToolCall {
                    id: Some(call.id.clone()),
                    function: WireFunctionCall {
                        name: call.name.clone(),
                        arguments: call.arguments.clone(),
                    },
                })
                .collect(),
            tool_call_id: message.tool_call_id.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    options: ChatOptionsWire,
}

#[derive(Debug, Serialize)]
struct ChatOptionsWire {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

/// The model's reply: free-form text plus any tool calls it asked for.
#[derive(Debug, Clone)]
pub struct ModelReply {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

pub struct ModelClient {
    http: reqwest::Client,
    base_url: String,
}

impl ModelClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub async fn chat(
        &self,
        model: &str,
        history: &[Message],
        tools: Option<&[ToolDefinition]>,
        options: &ChatOptions,
    ) -> Result<ModelReply, ModelClientError> {
        let request = ChatRequest {
            model,
            messages: history.iter().map(WireMessage::from).collect(),
            stream: false,
            tools,
            options: ChatOptionsWire {
                temperature: options.temperature,
                num_predict: options.num_predict,
            },
        };

        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let parsed: ChatResponse = response.json().await.map_err(ModelClientError::from)?;

        let tool_calls = parsed
            .message
            .tool_calls
            .into_iter()
            .enumerate()
            .map(|(idx, call)| ToolCall {
                id: call.id.unwrap_or_else(|| format!("call_{idx}")),
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        Ok(ModelReply {
            content: parsed.message.content,
            tool_calls,
        })
    }

    /// Queries the model endpoint's tag listing — used both for a liveness
    /// check and to report available models via `/api/chat/capabilities`.
    pub async fn list_models(&self) -> Result<Vec<String>, ModelClientError> {
        let response = self
            .http
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        let parsed: TagsResponse = response.json().await.map_err(ModelClientError::from)?;
        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn chat_parses_content_and_tool_calls() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/chat");
            then.status(200).json_body(json!({
                "message": {
                    "role": "assistant",
                    "content": "",
                    "tool_calls": [
                        { "id": "call_1", "function": { "name": "read_file", "arguments": { "path": "~/a.txt" } } }
                    ]
                },
                "done": true
            }));
        });

        let client = ModelClient::new(server.base_url());
        let options = ChatOptions { temperature: 0.7, num_predict: 2048 };
        let reply = client
            .chat(
                "llama3.1",
                &[Message::user(crate::conversation::ConversationId::new(), "read a.txt")],
                None,
                &options,
            )
            .await
            .unwrap();

        mock.assert();
        assert_eq!(reply.tool_calls.len(), 1);
        assert_eq!(reply.tool_calls[0].name, "read_file");
    }

    #[tokio::test]
    async fn chat_accepts_string_encoded_tool_call_arguments() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/chat");
            then.status(200).json_body(json!({
                "message": {
                    "role": "assistant",
                    "content": "",
                    "tool_calls": [
                        { "id": "call_1", "function": { "name": "read_file", "arguments": "{\"path\": \"~/a.txt\"}" } }
                    ]
                },
                "done": true
            }));
        });

        let client = ModelClient::new(server.base_url());
        let options = ChatOptions { temperature: 0.7, num_predict: 2048 };
        let reply = client
            .chat(
                "llama3.1",
                &[Message::user(crate::conversation::ConversationId::new(), "read a.txt")],
                None,
                &options,
            )
            .await
            .unwrap();

        assert_eq!(reply.tool_calls[0].arguments.get("path").and_then(Value::as_str), Some("~/a.txt"));
    }

    #[tokio::test]
    async fn list_models_parses_tags() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/tags");
            then.status(200).json_body(json!({ "models": [{ "name": "llama3.1" }] }));
        });

        let client = ModelClient::new(server.base_url());
        let models = client.list_models().await.unwrap();
        assert_eq!(models, vec!["llama3.1".to_string()]);
    }
}
