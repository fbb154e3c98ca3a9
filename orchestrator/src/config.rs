use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "orchestrator", about = "Tool-calling conversation loop over a local model")]
pub struct Config {
    #[arg(long, env = "ORCH_LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: String,

    #[arg(long, env = "ORCH_OPS_BASE_URL", default_value = "http://localhost:8070")]
    pub ops_base_url: String,

    #[arg(long, env = "ORCH_MODEL_BASE_URL", default_value = "http://localhost:11434")]
    pub model_base_url: String,

    #[arg(long, env = "ORCH_DEFAULT_MODEL", default_value = "llama3.1")]
    pub default_model: String,

    #[arg(long, env = "ORCH_FIRST_CALL_TEMPERATURE", default_value_t = 0.7)]
    pub first_call_temperature: f32,

    #[arg(long, env = "ORCH_FIRST_CALL_MAX_TOKENS", default_value_t = 2048)]
    pub first_call_max_tokens: u32,

    #[arg(long, env = "ORCH_TOOL_TIMEOUT_SECS", default_value_t = 30)]
    pub tool_timeout_secs: u64,

    #[arg(long, env = "ORCH_TOOL_MAX_RETRIES", default_value_t = 3)]
    pub tool_max_retries: u32,

    #[arg(long, env = "ORCH_MAX_CALLS_PER_TURN", default_value_t = 5)]
    pub max_calls_per_turn: usize,

    #[arg(long, env = "ORCH_TOOLS_ENABLED", default_value_t = true)]
    pub tools_enabled: bool,

    #[arg(long, env = "ORCH_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> Self {
        Config::parse()
    }

    pub fn real_home(&self) -> String {
        std::env::var("HOME").unwrap_or_else(|_| "/root".to_string())
    }
}
