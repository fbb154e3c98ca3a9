pub mod config;
pub mod conversation;
pub mod error;
pub mod model_client;
pub mod routes;
pub mod state;
pub mod store;
pub mod tool_catalog;
pub mod tool_client;
pub mod turn_runner;

pub use config::Config;

use std::sync::Arc;

use axum::Router;

use model_client::ModelClient;
use state::AppState;
use store::InMemoryConversationStore;
use tool_client::ToolClient;
use turn_runner::{TurnRunner, TurnRunnerConfig};

pub fn app(config: Config) -> Router {
    let real_home = config.real_home();
    let store: Arc<dyn store::ConversationStore> = Arc::new(InMemoryConversationStore::new());
    let model_client = ModelClient::new(config.model_base_url.clone());
    let tool_client = ToolClient::new(config.ops_base_url.clone(), real_home)
        .with_timeout_secs(config.tool_timeout_secs)
        .with_max_retries(config.tool_max_retries);

    let turn_runner = Arc::new(TurnRunner::new(
        store.clone(),
        ModelClient::new(config.model_base_url.clone()),
        tool_client,
        TurnRunnerConfig {
            model: config.default_model.clone(),
            first_call_temperature: config.first_call_temperature,
            first_call_max_tokens: config.first_call_max_tokens,
            max_calls_per_turn: config.max_calls_per_turn,
            tools_enabled: config.tools_enabled,
        },
    ));

    let state = AppState {
        store,
        turn_runner,
        model_client: Arc::new(model_client),
        config: Arc::new(config),
    };

    routes::router(state)
}
