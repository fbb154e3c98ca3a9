//! The fixed tool catalog presented to the model.
//!
//! This is authored independently of the operations service's own operation
//! catalog (`envelope::operation_catalog`, served from `GET
//! /api/mcp/operations`): the two are allowed to drift. A model trained
//! against this catalog might ask for a parameter the downstream service
//! doesn't have, or the service might grow a parameter this catalog never
//! mentions; either way that surfaces as a tool-execution error once the
//! Tool Client dispatches the call, never as a schema-validation error here.

use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub r#type: &'static str,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

fn tool(name: &'static str, description: &'static str, parameters: Value) -> ToolDefinition {
    ToolDefinition {
        r#type: "function",
        function: FunctionDefinition {
            name,
            description,
            parameters,
        },
    }
}

/// The seven entries named in §4.7, constant across turns and independent
/// of whatever the operations service actually exposes.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        tool(
            "list_directory",
            "List the entries of a directory.",
            json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "Directory path to list." },
                },
                "required": ["path"],
            }),
        ),
        tool(
            "read_file",
            "Read a file's contents.",
            json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "File path to read." },
                },
                "required": ["path"],
            }),
        ),
        tool(
            "create_file",
            "Create a new file with the given content. Fails if it already exists.",
            json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "File path to create." },
                    "content": { "type": "string", "description": "Initial file content." },
                },
                "required": ["path", "content"],
            }),
        ),
        tool(
            "edit_file",
            "Overwrite an existing file's content.",
            json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "File path to overwrite." },
                    "content": { "type": "string", "description": "New file content." },
                },
                "required": ["path", "content"],
            }),
        ),
        tool(
            "append_file",
            "Append content to the end of an existing file.",
            json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "File path to append to." },
                    "content": { "type": "string", "description": "Content to append." },
                },
                "required": ["path", "content"],
            }),
        ),
        tool(
            "execute_command",
            "Run a shell command, subject to a conservative deny-list.",
            json!({
                "type": "object",
                "properties": {
                    "command": { "type": "string", "description": "Command line to execute." },
                    "working_directory": {
                        "type": "string",
                        "description": "Working directory for the child process (default: service cwd).",
                    },
                },
                "required": ["command"],
            }),
        ),
        tool(
            "grep",
            "Search a file, or files under a directory, for a regex pattern.",
            json!({
                "type": "object",
                "properties": {
                    "pattern": { "type": "string", "description": "Regular expression to match." },
                    "path": { "type": "string", "description": "File or directory to search." },
                    "recursive": {
                        "type": "boolean",
                        "description": "Walk subdirectories (default false: immediate children only).",
                    },
                },
                "required": ["pattern", "path"],
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_names_exactly_the_seven_operations_from_the_spec() {
        let names: Vec<_> = tool_definitions().iter().map(|t| t.function.name).collect();
        assert_eq!(
            names,
            vec![
                "list_directory",
                "read_file",
                "create_file",
                "edit_file",
                "append_file",
                "execute_command",
                "grep",
            ]
        );
    }

    #[test]
    fn execute_command_has_no_timeout_or_stream_parameters() {
        let tools = tool_definitions();
        let exec = tools.iter().find(|t| t.function.name == "execute_command").unwrap();
        let properties = exec.function.parameters.get("properties").unwrap().as_object().unwrap();
        assert!(properties.contains_key("command"));
        assert!(properties.contains_key("working_directory"));
        assert!(!properties.contains_key("timeout_seconds"));
        assert!(!properties.contains_key("include_stderr"));
    }

    #[test]
    fn grep_has_no_case_sensitive_parameter() {
        let tools = tool_definitions();
        let grep = tools.iter().find(|t| t.function.name == "grep").unwrap();
        let properties = grep.function.parameters.get("properties").unwrap().as_object().unwrap();
        assert!(properties.contains_key("pattern"));
        assert!(properties.contains_key("path"));
        assert!(properties.contains_key("recursive"));
        assert!(!properties.contains_key("case_sensitive"));
        let required = grep.function.parameters.get("required").unwrap().as_array().unwrap();
        assert!(required.iter().any(|v| v == "pattern"));
        assert!(required.iter().any(|v| v == "path"));
    }

    #[test]
    fn required_parameters_are_listed_in_the_schema() {
        let tools = tool_definitions();
        let create = tools.iter().find(|t| t.function.name == "create_file").unwrap();
        let required = create.function.parameters.get("required").unwrap().as_array().unwrap();
        assert!(required.iter().any(|v| v == "path"));
        assert!(required.iter().any(|v| v == "content"));
    }
}
