use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "ops-service", about = "Operations Service: typed OS primitives over HTTP")]
pub struct Config {
    /// Address the HTTP server binds to.
    #[arg(long, env = "OPS_LISTEN_ADDR", default_value = "0.0.0.0:8070")]
    pub listen_addr: String,

    /// Default timeout (seconds) applied to `execute_command` when the
    /// request doesn't specify its own `timeout_secs`.
    #[arg(long, env = "OPS_COMMAND_TIMEOUT_SECS", default_value_t = 300)]
    pub command_timeout_secs: u64,

    /// Maximum directory recursion depth for `grep`.
    #[arg(long, env = "OPS_SEARCH_MAX_DEPTH", default_value_t = 10)]
    pub search_max_depth: usize,

    /// `pretty` for human-readable logs, `json` for structured logs.
    #[arg(long, env = "OPS_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> Self {
        Config::parse()
    }
}
