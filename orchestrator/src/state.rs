use std::sync::Arc;

use crate::config::Config;
use crate::model_client::ModelClient;
use crate::store::ConversationStore;
use crate::turn_runner::TurnRunner;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ConversationStore>,
    pub turn_runner: Arc<TurnRunner>,
    pub model_client: Arc<ModelClient>,
    pub config: Arc<Config>,
}
