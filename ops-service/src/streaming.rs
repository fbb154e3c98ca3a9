//! Builds the sequence of [`StreamChunkEnvelope`]s a streaming transport
//! (NDJSON, SSE, websocket) emits for a given operation. Shared by every
//! streaming transport so chunk boundaries cannot drift between them.
//!
//! `list_directory`, `read_file`, and `grep` are chunked after the fact from
//! an already-computed result (one descriptor/window/match per chunk, plus
//! a terminal sentinel chunk). `execute_command` is different: its output is
//! streamed live from the child process as it runs, via
//! [`ops_core::stream_command`], so cancelling the transport can actually
//! kill the process rather than discarding a result nobody asked for
//! anymore.

use std::pin::Pin;

use envelope::{Operation, RequestEnvelope, StreamChunkEnvelope};
use futures::Stream;
use ops_core::CommandStreamItem;
use serde_json::{json, Value};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use crate::config::Config;
use crate::error::DispatchError;

/// Chunks an already-computed non-streaming result for `list_directory`,
/// `read_file`, or `grep`. `execute_command` must go through
/// [`command_chunk_stream`] instead — see the module docs.
pub fn build_chunks(req: &RequestEnvelope, result: &Value) -> Vec<StreamChunkEnvelope> {
    match req.operation {
        Operation::ReadFile => chunk_read_file(req, result),
        Operation::ListDirectory => chunk_items(req, result, "files"),
        Operation::Grep => chunk_items(req, result, "matches"),
        _ => vec![StreamChunkEnvelope::new(req.id.clone(), 1, result.clone(), true)],
    }
}

/// One content window per chunk (never final), followed by a terminal
/// sentinel chunk — see §4.2: "an empty file yields only the terminal
/// sentinel" and "a file of length 1024N yields exactly N content chunks
/// plus the terminal."
fn chunk_read_file(req: &RequestEnvelope, result: &Value) -> Vec<StreamChunkEnvelope> {
    let content = result.get("content").and_then(Value::as_str).unwrap_or("");
    let chars: Vec<char> = content.chars().collect();
    let window = ops_core::files::READ_CHUNK_SIZE;

    let mut chunks = Vec::new();
    let mut sequence = 0u64;
    let mut start = 0usize;
    while start < chars.len() {
        let end = (start + window).min(chars.len());
        let piece: String = chars[start..end].iter().collect();
        sequence += 1;
        chunks.push(StreamChunkEnvelope::new(
            req.id.clone(),
            sequence,
            json!({ "content": piece, "offset": start }),
            false,
        ));
        start = end;
    }
    chunks.push(StreamChunkEnvelope::terminal(req.id.clone(), sequence + 1));
    chunks
}

/// One array item from `result[items_key]` per chunk, followed by a
/// terminal sentinel — used by `list_directory` (one file descriptor per
/// chunk) and `grep` (one match per chunk).
fn chunk_items(req: &RequestEnvelope, result: &Value, items_key: &str) -> Vec<StreamChunkEnvelope> {
    let items = result.get(items_key).and_then(Value::as_array).cloned().unwrap_or_default();
    let mut chunks = Vec::with_capacity(items.len() + 1);
    let mut sequence = 0u64;
    for item in items {
        sequence += 1;
        chunks.push(StreamChunkEnvelope::new(req.id.clone(), sequence, item, false));
    }
    chunks.push(StreamChunkEnvelope::terminal(req.id.clone(), sequence + 1));
    chunks
}

/// Builds the live stream of chunks for a streaming `execute_command`
/// request: one chunk per stdout/stderr line prefixed `STDOUT: `/`STDERR: `
/// (stderr only when `include_stderr`), then an `EXIT_CODE: <n>` chunk,
/// then the terminal sentinel. Dropping the returned stream (the caller
/// cancelling the transport) propagates through to `ops-core` and kills the
/// child — see `ops_core::stream_command`.
pub async fn command_chunk_stream(
    req: &RequestEnvelope,
    config: &Config,
) -> Result<Pin<Box<dyn Stream<Item = StreamChunkEnvelope> + Send>>, DispatchError> {
    let command = req
        .param_str("command")
        .ok_or(DispatchError::Ops(ops_core::OpsError::MissingParameter("command")))?;
    let working_directory = req.param_str("working_directory");
    let timeout_secs = req
        .params
        .get("timeout_seconds")
        .and_then(Value::as_u64)
        .or(Some(config.command_timeout_secs));
    let include_stderr = req.param_bool("include_stderr", true);

    let rx = ops_core::stream_command(command, working_directory, timeout_secs, include_stderr)
        .await
        .map_err(DispatchError::Ops)?;

    let request_id = req.id.clone();
    let stream = ReceiverStream::new(rx)
        .enumerate()
        .map(move |(idx, item)| {
            let sequence = idx as u64 + 1;
            let data = match item {
                CommandStreamItem::Stdout(line) => json!(format!("STDOUT: {line}")),
                CommandStreamItem::Stderr(line) => json!(format!("STDERR: {line}")),
                CommandStreamItem::Exit(code) => json!(format!("EXIT_CODE: {code}")),
            };
            StreamChunkEnvelope::new(request_id.clone(), sequence, data, false)
        });

    // The exit-code chunk above is the last *content* chunk emitted by
    // `ops-core`; the transport-level terminal sentinel still follows it,
    // distinct from it, per the envelope invariant (exactly one `is_final`
    // chunk, always last).
    let request_id = req.id.clone();
    let with_terminal = stream.chain(futures::stream::once(async move {
        // Placeholder sequence; corrected below once we know the true count.
        StreamChunkEnvelope::terminal(request_id, 0)
    }));

    Ok(Box::pin(renumber_terminal(with_terminal)))
}

/// Rewrites the final chunk's `sequence` to be one past the previous
/// chunk's, since the terminal sentinel above is appended without knowing
/// how many content chunks preceded it.
fn renumber_terminal(
    stream: impl Stream<Item = StreamChunkEnvelope> + Send + 'static,
) -> impl Stream<Item = StreamChunkEnvelope> + Send + 'static {
    let state = (stream, 0u64);
    futures::stream::unfold(state, |(mut stream, last_sequence)| async move {
        let next = stream.next().await?;
        if next.is_final {
            let corrected = StreamChunkEnvelope::terminal(next.request_id.clone(), last_sequence + 1);
            Some((corrected, (stream, last_sequence + 1)))
        } else {
            let sequence = next.sequence;
            Some((next, (stream, sequence)))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    #[test]
    fn read_file_chunks_are_windows_plus_a_terminal() {
        let req = RequestEnvelope::new(Operation::ReadFile, Map::new(), true);
        let content: String = "x".repeat(2000);
        let result = json!({ "content": content });
        let chunks = build_chunks(&req, &result);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].sequence, 1);
        assert_eq!(chunks[1].sequence, 2);
        assert_eq!(chunks[2].sequence, 3);
        assert!(!chunks[0].is_final && !chunks[1].is_final);
        assert!(chunks[2].is_final);
    }

    #[test]
    fn empty_file_yields_only_the_terminal_chunk() {
        let req = RequestEnvelope::new(Operation::ReadFile, Map::new(), true);
        let result = json!({ "content": "" });
        let chunks = build_chunks(&req, &result);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_final);
        assert_eq!(chunks[0].sequence, 1);
    }

    #[test]
    fn list_directory_emits_one_descriptor_per_chunk() {
        let req = RequestEnvelope::new(Operation::ListDirectory, Map::new(), true);
        let result = json!({ "files": [{"name": "a"}, {"name": "b"}] });
        let chunks = build_chunks(&req, &result);
        assert_eq!(chunks.len(), 3);
        assert!(chunks[0..2].iter().all(|c| !c.is_final));
        assert!(chunks[2].is_final);
        assert_eq!(chunks[0].sequence, 1);
    }

    #[test]
    fn grep_emits_one_match_per_chunk() {
        let req = RequestEnvelope::new(Operation::Grep, Map::new(), true);
        let result = json!({ "matches": [{"line": "a"}] });
        let chunks = build_chunks(&req, &result);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[1].is_final);
    }

    #[test]
    fn other_operations_get_a_single_final_chunk() {
        let req = RequestEnvelope::new(Operation::CreateFile, Map::new(), true);
        let result = json!({ "success": true });
        let chunks = build_chunks(&req, &result);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].sequence, 1);
        assert!(chunks[0].is_final);
    }
}
