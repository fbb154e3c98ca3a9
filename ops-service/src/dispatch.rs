//! Central operation dispatcher: turns a validated [`RequestEnvelope`] into
//! a JSON result value by calling into `ops-core`. Every transport (unary,
//! NDJSON, SSE, websocket) goes through this single function so behavior
//! cannot drift between them.

use envelope::{Operation, RequestEnvelope};
use ops_core::error::{OpsError, OpsResult};
use serde_json::Value;

use crate::config::Config;

fn to_value<T: serde::Serialize>(value: T) -> OpsResult<Value> {
    serde_json::to_value(value).map_err(|e| OpsError::Io(std::io::Error::other(e)))
}

fn required_str<'a>(req: &'a RequestEnvelope, name: &'static str) -> Result<&'a str, OpsError> {
    req.param_str(name).ok_or(OpsError::MissingParameter(name))
}

/// Dispatches `req` and returns the operation's JSON result payload, or the
/// [`OpsError`] that should become an `ErrorEnvelope`.
pub async fn dispatch(req: &RequestEnvelope, config: &Config) -> OpsResult<Value> {
    match req.operation {
        Operation::ListDirectory => {
            let path = req.param_str("path").unwrap_or(".");
            let recursive = req.param_bool("recursive", false);
            to_value(ops_core::list_directory(path, recursive).await?)
        }
        Operation::ReadFile => {
            let path = required_str(req, "path")?;
            let chunk_index = req.params.get("chunk_index").and_then(Value::as_u64).map(|v| v as usize);
            to_value(ops_core::read_file(path, chunk_index).await?)
        }
        Operation::CreateFile => {
            let path = required_str(req, "path")?;
            let content = req.param_str("content").unwrap_or("");
            to_value(ops_core::create_file(path, content).await?)
        }
        Operation::EditFile => {
            let path = required_str(req, "path")?;
            let content = required_str(req, "content")?;
            to_value(ops_core::edit_file(path, content).await?)
        }
        Operation::AppendFile => {
            let path = required_str(req, "path")?;
            let content = required_str(req, "content")?;
            to_value(ops_core::append_file(path, content).await?)
        }
        Operation::Grep => {
            let path = req.param_str("path").unwrap_or(".");
            let pattern = required_str(req, "pattern")?;
            let case_sensitive = req.param_bool("case_sensitive", true);
            let recursive = req.param_bool("recursive", false);
            to_value(ops_core::grep(path, pattern, case_sensitive, recursive, config.search_max_depth).await?)
        }
        Operation::ExecuteCommand => {
            let command = required_str(req, "command")?;
            let working_directory = req.param_str("working_directory");
            let timeout_secs = req
                .params
                .get("timeout_seconds")
                .and_then(Value::as_u64)
                .or(Some(config.command_timeout_secs));
            to_value(ops_core::execute_command(command, working_directory, timeout_secs).await?)
        }
        // The original `operation` string is discarded by `#[serde(other)]`
        // during deserialization, so all we can report is that it didn't
        // match any of the seven known operations.
        Operation::Unrecognized => Err(OpsError::UnknownOperation("<unrecognized operation>".to_string())),
    }
}
