//! Strongly-typed result payloads. The wire envelope carries `result` as an
//! opaque `serde_json::Value` (its shape is determined by `operation`, not by
//! the envelope schema itself), but callers on both sides of the pipe convert
//! through these types rather than poking at raw `Value`s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    File,
    Directory,
    Symlink,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub name: String,
    pub path: String,
    pub kind: FileKind,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    pub permissions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListDirectoryResult {
    pub path: String,
    pub files: Vec<FileDescriptor>,
    pub total_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadFileResult {
    pub path: String,
    pub content: String,
    /// Character count of `content` (not byte length — see the note on
    /// multi-byte UTF-8 in the File Engine's read path).
    pub size: usize,
    /// Always `"utf-8"`; the File Engine never attempts to detect or honor
    /// another encoding.
    pub encoding: &'static str,
    pub truncated: bool,
    pub offset: usize,
    pub total_chunks: Option<usize>,
    pub chunk_index: Option<usize>,
}

/// Which write operation produced a [`CreateEditAppendResult`]. Serializes
/// to the present-tense `operation` value the spec's result shape names
/// (`"create"`/`"edit"`/`"append"`), not the past-tense variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteKind {
    Create,
    Edit,
    Append,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEditAppendResult {
    pub path: String,
    pub operation: WriteKind,
    pub success: bool,
    pub message: String,
    pub bytes_written: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrepMatch {
    pub path: String,
    pub line_number: usize,
    pub line: String,
    /// Byte offset of the match's first byte within `line`.
    pub match_start: usize,
    /// Byte offset one past the match's last byte within `line`.
    pub match_end: usize,
    pub matched_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrepResult {
    pub pattern: String,
    pub path: String,
    pub recursive: bool,
    pub matches: Vec<GrepMatch>,
    pub total_matches: usize,
    pub files_searched: usize,
    pub files_skipped_binary: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    pub command: String,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub execution_time_ms: u64,
    /// `true` iff `exit_code == Some(0)`. Timeouts never reach this type —
    /// they fail with `COMMAND_TIMEOUT` before a result is produced.
    pub success: bool,
}
