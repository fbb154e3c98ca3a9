//! Transport-agnostic engines behind the operations service: directory
//! listing and file I/O, recursive regex search, and shell command
//! execution. `ops-service` wraps these with axum transports; nothing here
//! knows about HTTP, websockets, or the wire envelope beyond the result
//! types it returns.

pub mod command;
pub mod error;
pub mod files;
pub mod pathutil;
pub mod search;

pub use command::{execute_command, stream_command, CommandStreamItem};
pub use error::{OpsError, OpsResult};
pub use files::{append_file, create_file, edit_file, list_directory, read_file};
pub use search::grep;
