//! Turn Runner: the tool-calling conversation loop.
//!
//! Seven steps per turn:
//! 1. bind conversation (existing id, or create a new one and inject a
//!    system-context message)
//! 2. enroll the caller's message into the conversation history
//! 3. first model call, offering the tool catalog
//! 4. branch on whether the model asked for tool calls
//! 5. bounded, parallel fan-out of the tool calls it asked for
//! 6. second model call with a single synthetic tool-result message folded
//!    back in
//! 7. persist the final assistant message and return it
//!
//! A turn never makes a third model call: the tool results from step 5 are
//! the orchestrator's one chance to ground the model's answer, not the
//! start of an open-ended agent loop.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;

use crate::conversation::{ConversationId, Message, ToolCall};
use crate::error::OrchestratorError;
use crate::model_client::{ChatOptions, ModelClient};
use crate::store::ConversationStore;
use crate::tool_catalog::tool_definitions;
use crate::tool_client::ToolClient;

/// Fixed fallback content used whenever a model call that the spec allows
/// to fail gracefully (stage 6) comes back without usable content.
const APOLOGY: &str = "I'm sorry, I wasn't able to come up with a response to that.";

#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
    pub success: bool,
    pub summary: String,
}

pub struct TurnOutcome {
    pub conversation_id: ConversationId,
    pub assistant_message: String,
    pub model: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub elapsed_ms: u64,
}

/// Per-turn overrides a caller may supply; anything left `None` falls back
/// to [`TurnRunnerConfig`]'s defaults.
#[derive(Debug, Clone, Default)]
pub struct TurnRequestOptions {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub tools_enabled: Option<bool>,
}

pub struct TurnRunnerConfig {
    pub model: String,
    pub first_call_temperature: f32,
    pub first_call_max_tokens: u32,
    pub max_calls_per_turn: usize,
    pub tools_enabled: bool,
}

pub struct TurnRunner {
    store: Arc<dyn ConversationStore>,
    model_client: ModelClient,
    tool_client: ToolClient,
    config: TurnRunnerConfig,
}

/// The system-context message injected into brand-new conversations. Per
/// §9's open question, this propagates caller host state (the home
/// directory) into the model's context; a multi-tenant deployment that
/// needs to keep that private should gate this at the config layer instead
/// of silently omitting it here.
fn system_context_message(conversation_id: ConversationId, real_home: &str) -> Message {
    Message::system(
        conversation_id,
        format!(
            "You are a tool-using assistant with access to the caller's filesystem. \
             The caller's home directory is `{real_home}`. When a tool call needs an \
             absolute path, resolve relative mentions (like \"my home directory\" or \
             \"~\") against that path rather than guessing."
        ),
    )
}

/// Renders the synthetic tool-result message folded back into the second
/// model call: one bullet line per dispatched call, in the order they were
/// issued — `- <name>: SUCCESS - <result>` or `- <name>: ERROR - <error>`.
fn render_tool_result_summary(records: &[ToolCallRecord]) -> String {
    records
        .iter()
        .map(|record| {
            if record.success {
                format!("- {}: SUCCESS - {}", record.name, record.summary)
            } else {
                format!("- {}: ERROR - {}", record.name, record.summary)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl TurnRunner {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        model_client: ModelClient,
        tool_client: ToolClient,
        config: TurnRunnerConfig,
    ) -> Self {
        Self {
            store,
            model_client,
            tool_client,
            config,
        }
    }

    pub async fn run_turn(
        &self,
        conversation_id: Option<ConversationId>,
        user_text: &str,
    ) -> Result<TurnOutcome, OrchestratorError> {
        self.run_turn_with_options(conversation_id, user_text, TurnRequestOptions::default())
            .await
    }

    pub async fn run_turn_with_options(
        &self,
        conversation_id: Option<ConversationId>,
        user_text: &str,
        options: TurnRequestOptions,
    ) -> Result<TurnOutcome, OrchestratorError> {
        let started = Instant::now();
        let model = options.model.unwrap_or_else(|| self.config.model.clone());
        let tools_enabled = options.tools_enabled.unwrap_or(self.config.tools_enabled);
        let chat_options = ChatOptions {
            temperature: options.temperature.unwrap_or(self.config.first_call_temperature),
            num_predict: options.max_tokens.unwrap_or(self.config.first_call_max_tokens),
        };

        // Step 1: bind conversation. A brand-new conversation — either a
        // freshly minted id, or a caller-supplied id the store hasn't seen
        // yet — gets a system-context message as its first entry; an
        // existing one does not get a second (append is total, so a
        // not-yet-known supplied id is created here rather than erroring).
        let conversation_id = match conversation_id {
            Some(id) if self.store.get(&id).await.is_ok() => id,
            Some(id) => {
                self.store
                    .append(&id, system_context_message(id.clone(), self.tool_client.real_home()))
                    .await?;
                id
            }
            None => {
                let id = self.store.create().await;
                self.store
                    .append(&id, system_context_message(id.clone(), self.tool_client.real_home()))
                    .await?;
                id
            }
        };

        // Step 2: enroll the user's message.
        self.store
            .append(&conversation_id, Message::user(conversation_id.clone(), user_text))
            .await?;

        // Step 3: first model call.
        let tools = if tools_enabled { Some(tool_definitions()) } else { None };
        let history = self.store.get(&conversation_id).await?.messages;
        let first_reply = self
            .model_client
            .chat(&model, &history, tools.as_deref(), &chat_options)
            .await?;

        // Step 4: branch — no tool calls means the turn ends here.
        if first_reply.tool_calls.is_empty() {
            self.store
                .append(
                    &conversation_id,
                    Message::assistant(conversation_id.clone(), first_reply.content.clone(), Vec::new()),
                )
                .await?;
            return Ok(TurnOutcome {
                conversation_id,
                assistant_message: first_reply.content,
                model,
                tool_calls: Vec::new(),
                elapsed_ms: started.elapsed().as_millis() as u64,
            });
        }

        // Step 5: bounded, parallel fan-out, preserving request order.
        let accepted: Vec<ToolCall> = first_reply
            .tool_calls
            .iter()
            .take(self.config.max_calls_per_turn)
            .cloned()
            .collect();
        let dropped = first_reply.tool_calls.len().saturating_sub(accepted.len());
        if dropped > 0 {
            tracing::warn!(
                conversation_id = %conversation_id,
                dropped,
                cap = self.config.max_calls_per_turn,
                "model requested more tool calls than the per-turn cap; truncating"
            );
        }

        self.store
            .append(
                &conversation_id,
                Message::assistant(conversation_id.clone(), first_reply.content.clone(), accepted.clone()),
            )
            .await?;

        let outcomes = join_all(accepted.iter().map(|call| self.tool_client.call(call))).await;
        let mut records = Vec::with_capacity(accepted.len());
        for (call, outcome) in accepted.iter().zip(outcomes) {
            let (success, summary) = match outcome {
                Ok(outcome) => (true, outcome.result.to_string()),
                Err(err) => {
                    tracing::error!(tool = %call.name, error = %err, "tool call failed");
                    (false, err.to_string())
                }
            };
            records.push(ToolCallRecord {
                id: call.id.clone(),
                name: call.name.clone(),
                arguments: call.arguments.clone(),
                success,
                summary,
            });
        }

        // Step 6: second model call, grounded by one synthetic tool-result
        // message summarizing every dispatched call.
        self.store
            .append(
                &conversation_id,
                Message::tool_result(conversation_id.clone(), "batch", render_tool_result_summary(&records)),
            )
            .await?;

        let history = self.store.get(&conversation_id).await?.messages;
        let second_content = match self.model_client.chat(&model, &history, None, &chat_options).await {
            Ok(reply) if !reply.content.is_empty() => reply.content,
            Ok(_empty) => APOLOGY.to_string(),
            Err(err) => {
                tracing::error!(conversation_id = %conversation_id, error = %err, "second model call failed, apologizing");
                APOLOGY.to_string()
            }
        };

        // Step 7: persist and return.
        self.store
            .append(
                &conversation_id,
                Message::assistant(conversation_id.clone(), second_content.clone(), Vec::new()),
            )
            .await?;

        Ok(TurnOutcome {
            conversation_id,
            assistant_message: second_content,
            model,
            tool_calls: records,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }
}
