use serde::{Deserialize, Serialize};

/// The seven operations the Operations Service exposes. Parameters for each
/// are carried loosely in `RequestEnvelope::params` (a JSON object) rather
/// than as enum payload, so the catalog and the dispatcher can describe them
/// uniformly — see [`crate::catalog::operation_catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    ListDirectory,
    ReadFile,
    CreateFile,
    EditFile,
    AppendFile,
    Grep,
    ExecuteCommand,
    /// Catches any `operation` value outside the seven above, so a
    /// malformed or version-skewed request still parses into a well-formed
    /// envelope instead of failing JSON extraction outright — the dispatcher
    /// can then report `UNKNOWN_OPERATION` as a proper error envelope (§7)
    /// rather than a bare HTTP 400 from the deserializer.
    #[serde(other)]
    Unrecognized,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ListDirectory => "list_directory",
            Operation::ReadFile => "read_file",
            Operation::CreateFile => "create_file",
            Operation::EditFile => "edit_file",
            Operation::AppendFile => "append_file",
            Operation::Grep => "grep",
            Operation::ExecuteCommand => "execute_command",
            Operation::Unrecognized => "unrecognized",
        }
    }

    pub fn all() -> [Operation; 7] {
        [
            Operation::ListDirectory,
            Operation::ReadFile,
            Operation::CreateFile,
            Operation::EditFile,
            Operation::AppendFile,
            Operation::Grep,
            Operation::ExecuteCommand,
        ]
    }

    /// Whether this operation can produce a chunked/streaming result
    /// (`list_directory` one descriptor per chunk, `read_file` in windowed
    /// mode, `grep` one match per chunk, `execute_command`'s line-by-line
    /// output). All operations still accept the `stream` request flag; this
    /// flag is what the catalog advertises as the operation's *natural*
    /// streaming mode.
    pub fn supports_streaming(&self) -> bool {
        matches!(
            self,
            Operation::ListDirectory | Operation::ReadFile | Operation::Grep | Operation::ExecuteCommand
        )
    }

    /// Whether this is the catch-all variant for an operation name the
    /// wire protocol doesn't recognize — never present in [`Operation::all`]
    /// or the discovery catalog, only ever produced by deserializing a
    /// request envelope.
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Operation::Unrecognized)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
