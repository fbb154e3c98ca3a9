use serde::{Deserialize, Serialize};

use crate::Operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Boolean,
    Integer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDescriptor {
    pub name: &'static str,
    pub param_type: ParamType,
    pub required: bool,
    pub description: &'static str,
}

impl ParamDescriptor {
    const fn new(
        name: &'static str,
        param_type: ParamType,
        required: bool,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            param_type,
            required,
            description,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ParamDescriptor>,
    pub streaming: bool,
}

/// The full operation catalog, generated from [`Operation::all`] so the
/// discovery endpoint and the dispatcher can never drift apart.
pub fn operation_catalog() -> Vec<OperationDescriptor> {
    Operation::all().iter().map(describe).collect()
}

fn describe(op: &Operation) -> OperationDescriptor {
    use ParamType::*;

    let (description, parameters): (&'static str, Vec<ParamDescriptor>) = match op {
        Operation::ListDirectory => (
            "List the entries of a directory.",
            vec![
                ParamDescriptor::new("path", String, true, "Directory path to list."),
                ParamDescriptor::new(
                    "recursive",
                    Boolean,
                    false,
                    "List subdirectories recursively.",
                ),
            ],
        ),
        Operation::ReadFile => (
            "Read a file's contents, optionally in fixed-size chunks.",
            vec![
                ParamDescriptor::new("path", String, true, "File path to read."),
                ParamDescriptor::new(
                    "chunk_index",
                    Integer,
                    false,
                    "0-based index of the 1024-character window to return.",
                ),
            ],
        ),
        Operation::CreateFile => (
            "Create a new file with the given content. Fails if it already exists.",
            vec![
                ParamDescriptor::new("path", String, true, "File path to create."),
                ParamDescriptor::new("content", String, false, "Initial file content."),
            ],
        ),
        Operation::EditFile => (
            "Overwrite an existing file's content.",
            vec![
                ParamDescriptor::new("path", String, true, "File path to overwrite."),
                ParamDescriptor::new("content", String, true, "New file content."),
            ],
        ),
        Operation::AppendFile => (
            "Append content to the end of an existing file.",
            vec![
                ParamDescriptor::new("path", String, true, "File path to append to."),
                ParamDescriptor::new("content", String, true, "Content to append."),
            ],
        ),
        Operation::Grep => (
            "Search a file, or files under a directory, for a regex pattern.",
            vec![
                ParamDescriptor::new("path", String, true, "File or directory to search."),
                ParamDescriptor::new("pattern", String, true, "Regular expression to match."),
                ParamDescriptor::new(
                    "recursive",
                    Boolean,
                    false,
                    "Walk subdirectories (default false: immediate children only).",
                ),
                ParamDescriptor::new(
                    "case_sensitive",
                    Boolean,
                    false,
                    "Whether matching is case-sensitive (default true).",
                ),
            ],
        ),
        Operation::ExecuteCommand => (
            "Run a shell command subject to the deny-list, with output streamed \
             line by line when requested.",
            vec![
                ParamDescriptor::new("command", String, true, "Command line to execute."),
                ParamDescriptor::new(
                    "working_directory",
                    String,
                    false,
                    "Working directory for the child process (default: service cwd).",
                ),
                ParamDescriptor::new(
                    "timeout_seconds",
                    Integer,
                    false,
                    "Override the default command timeout (default 300).",
                ),
                ParamDescriptor::new(
                    "include_stderr",
                    Boolean,
                    false,
                    "Streaming only: include stderr lines (default true).",
                ),
            ],
        ),
        // Never produced by `Operation::all`, so `operation_catalog` never
        // actually calls `describe` with this variant; the arm exists only
        // to keep the match exhaustive.
        Operation::Unrecognized => ("Unrecognized operation.", vec![]),
    };

    OperationDescriptor {
        name: op.as_str(),
        description,
        parameters,
        streaming: op.supports_streaming(),
    }
}
