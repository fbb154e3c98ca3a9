//! Command Engine: runs a shell command through a conservative deny-list,
//! then executes it with a timeout, killing the child process if it runs
//! over. Offers both a buffered (wait-for-exit) mode and a live
//! line-by-line streaming mode.
//!
//! The deny-list is a heuristic, not a sandbox: it blocks the obviously
//! destructive first tokens and a handful of dangerous substrings, but a
//! determined caller can route around it (`bash -c "rm -rf /"` for
//! instance). Real isolation belongs to the deployment (containers, seccomp,
//! a restricted user), not to this string check.

use std::process::Stdio;
use std::time::{Duration, Instant};

use envelope::CommandResult;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::error::{OpsError, OpsResult};

pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 300;

/// Channel depth for [`stream_command`]; a slow consumer applies
/// backpressure onto the reader tasks rather than dropping lines.
const STREAM_CHANNEL_CAPACITY: usize = 64;

const DENIED_FIRST_TOKENS: &[&str] = &[
    "rm", "rmdir", "del", "format", "fdisk", "mkfs", "dd", "shutdown", "reboot", "halt",
];

const DENIED_SUBSTRINGS: &[&str] = &["sudo", "su ", ">/dev/", ">/proc/"];

/// Returns `Some(reason)` if `command` should be rejected outright.
fn deny_reason(command: &str) -> Option<String> {
    let trimmed = command.trim();
    let trimmed_lower = trimmed.to_lowercase();
    let first_token = trimmed_lower.split_whitespace().next().unwrap_or("");
    for denied in DENIED_FIRST_TOKENS {
        if first_token == *denied || trimmed_lower.starts_with(&format!("{denied} ")) {
            return Some(format!("command begins with denied token '{denied}'"));
        }
    }
    for denied in DENIED_SUBSTRINGS {
        if trimmed.contains(denied) {
            return Some(format!("command contains denied substring '{denied}'"));
        }
    }
    None
}

fn build_command(command: &str, working_directory: Option<&str>) -> Command {
    let mut cmd = Command::new("/bin/sh");
    cmd.arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = working_directory {
        cmd.current_dir(dir);
    }
    cmd
}

/// Runs `command` under `/bin/sh -c`, subject to the deny-list above and a
/// timeout (`timeout_secs`, defaulting to [`DEFAULT_COMMAND_TIMEOUT_SECS`]),
/// waiting for exit and capturing stdout/stderr in full. On timeout the
/// child is killed and the call fails with [`OpsError::CommandTimeout`]
/// rather than returning a result.
pub async fn execute_command(
    command: &str,
    working_directory: Option<&str>,
    timeout_secs: Option<u64>,
) -> OpsResult<CommandResult> {
    if let Some(reason) = deny_reason(command) {
        tracing::warn!(command, reason, "rejected command");
        return Err(OpsError::ForbiddenCommand(reason));
    }

    let timeout_secs = timeout_secs.unwrap_or(DEFAULT_COMMAND_TIMEOUT_SECS);
    let started = Instant::now();

    let child = build_command(command, working_directory).spawn()?;

    match timeout(Duration::from_secs(timeout_secs), child.wait_with_output()).await {
        Ok(Ok(output)) => {
            let exit_code = output.status.code();
            Ok(CommandResult {
                command: command.to_string(),
                exit_code,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                execution_time_ms: started.elapsed().as_millis() as u64,
                success: exit_code == Some(0),
            })
        }
        Ok(Err(io_err)) => Err(OpsError::Io(io_err)),
        Err(_elapsed) => {
            tracing::warn!(command, timeout_secs, "command timed out, killing child");
            Err(OpsError::CommandTimeout(timeout_secs))
        }
    }
}

/// One event from a live, streamed command execution.
#[derive(Debug, Clone)]
pub enum CommandStreamItem {
    Stdout(String),
    Stderr(String),
    Exit(i32),
}

/// Spawns `command` and streams its output line-by-line as it runs, rather
/// than waiting for exit. The deny-list check happens before anything is
/// spawned, so a forbidden command never starts a process. Dropping the
/// returned receiver (the caller cancelling the stream) closes the sender
/// side, which the background task detects on its next send and uses to
/// kill the child — this is how stream cancellation terminates the
/// underlying process (see the concurrency model's cancellation rules).
pub async fn stream_command(
    command: &str,
    working_directory: Option<&str>,
    timeout_secs: Option<u64>,
    include_stderr: bool,
) -> OpsResult<mpsc::Receiver<CommandStreamItem>> {
    if let Some(reason) = deny_reason(command) {
        tracing::warn!(command, reason, "rejected streaming command");
        return Err(OpsError::ForbiddenCommand(reason));
    }

    let timeout_secs = timeout_secs.unwrap_or(DEFAULT_COMMAND_TIMEOUT_SECS);
    let mut child = build_command(command, working_directory).spawn()?;
    let mut stdout_lines = BufReader::new(child.stdout.take().expect("piped stdout")).lines();
    let mut stderr_lines = BufReader::new(child.stderr.take().expect("piped stderr")).lines();

    let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
    let command_owned = command.to_string();

    tokio::spawn(async move {
        let deadline = tokio::time::sleep(Duration::from_secs(timeout_secs));
        tokio::pin!(deadline);

        let mut stdout_open = true;
        let mut stderr_open = include_stderr;
        let mut exit_code: Option<i32> = None;

        loop {
            if !stdout_open && !stderr_open && exit_code.is_some() {
                break;
            }
            tokio::select! {
                _ = &mut deadline => {
                    tracing::warn!(command = %command_owned, timeout_secs, "streaming command timed out, killing child");
                    let _ = child.start_kill();
                    break;
                }
                line = stdout_lines.next_line(), if stdout_open => {
                    match line {
                        Ok(Some(text)) => {
                            if tx.send(CommandStreamItem::Stdout(text)).await.is_err() {
                                let _ = child.start_kill();
                                return;
                            }
                        }
                        _ => stdout_open = false,
                    }
                }
                line = stderr_lines.next_line(), if stderr_open => {
                    match line {
                        Ok(Some(text)) => {
                            if tx.send(CommandStreamItem::Stderr(text)).await.is_err() {
                                let _ = child.start_kill();
                                return;
                            }
                        }
                        _ => stderr_open = false,
                    }
                }
                status = child.wait(), if exit_code.is_none() => {
                    exit_code = Some(status.ok().and_then(|s| s.code()).unwrap_or(-1));
                }
            }
        }

        let _ = tx
            .send(CommandStreamItem::Exit(exit_code.unwrap_or(-1)))
            .await;
    });

    Ok(rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runs_a_simple_command() {
        let result = execute_command("echo hello", None, None).await.unwrap();
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.stdout.trim(), "hello");
        assert!(result.success);
    }

    #[tokio::test]
    async fn reports_success_false_on_nonzero_exit() {
        let result = execute_command("exit 3", None, None).await.unwrap();
        assert_eq!(result.exit_code, Some(3));
        assert!(!result.success);
    }

    #[tokio::test]
    async fn rejects_denied_first_token() {
        let err = execute_command("rm -rf /tmp/whatever", None, None).await.unwrap_err();
        assert!(matches!(err, OpsError::ForbiddenCommand(_)));
    }

    #[tokio::test]
    async fn rejects_denied_substring_even_with_allowed_first_token() {
        let err = execute_command("echo hi && sudo reboot", None, None).await.unwrap_err();
        assert!(matches!(err, OpsError::ForbiddenCommand(_)));
    }

    #[tokio::test]
    async fn rejects_denied_first_token_case_insensitively() {
        let err = execute_command("RM -rf /tmp/whatever", None, None).await.unwrap_err();
        assert!(matches!(err, OpsError::ForbiddenCommand(_)));
        let err = execute_command("Dd if=/dev/sda of=/dev/null", None, None).await.unwrap_err();
        assert!(matches!(err, OpsError::ForbiddenCommand(_)));
    }

    #[tokio::test]
    async fn does_not_reject_tokens_that_merely_start_with_a_denied_word() {
        // "format-output" is not the `format` command; only an exact token
        // or `format ` prefix should be denied.
        assert!(deny_reason("format-output --help").is_none());
    }

    #[tokio::test]
    async fn kills_commands_that_exceed_the_timeout() {
        let err = execute_command("sleep 5", None, Some(1)).await.unwrap_err();
        assert!(matches!(err, OpsError::CommandTimeout(1)));
    }

    #[tokio::test]
    async fn honors_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = execute_command("pwd", Some(dir.path().to_str().unwrap()), None)
            .await
            .unwrap();
        assert_eq!(result.stdout.trim(), dir.path().to_str().unwrap());
    }

    #[tokio::test]
    async fn streams_stdout_and_stderr_lines_then_exit() {
        let mut rx = stream_command("printf 'a\\nb\\n'; printf 'err\\n' >&2", None, None, true)
            .await
            .unwrap();

        let mut items = Vec::new();
        while let Some(item) = rx.recv().await {
            items.push(item);
        }

        assert!(matches!(items.last(), Some(CommandStreamItem::Exit(0))));
        let stdout_lines: Vec<_> = items
            .iter()
            .filter_map(|i| match i {
                CommandStreamItem::Stdout(s) => Some(s.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(stdout_lines, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn excludes_stderr_when_not_requested() {
        let mut rx = stream_command("echo out; echo err >&2", None, None, false)
            .await
            .unwrap();
        let mut items = Vec::new();
        while let Some(item) = rx.recv().await {
            items.push(item);
        }
        assert!(!items.iter().any(|i| matches!(i, CommandStreamItem::Stderr(_))));
    }

    #[tokio::test]
    async fn forbidden_streaming_command_never_spawns() {
        let err = stream_command("rm -rf /", None, None, true).await.unwrap_err();
        assert!(matches!(err, OpsError::ForbiddenCommand(_)));
    }
}
