// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Running user shell commands (`should_execute`, command sensors)

use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Lines of stderr kept in error messages
const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{description} failed to start: {source}")]
    Spawn {
        description: String,
        source: std::io::Error,
    },
    #[error("{description} timed out after {}ms", timeout.as_millis())]
    Timeout {
        description: String,
        timeout: Duration,
    },
}

/// Run `command` through `sh -c` in `cwd`, killing it if `timeout` elapses.
///
/// A non-zero exit is not an error; callers inspect `Output::status`.
pub async fn run_shell(
    command: &str,
    cwd: &Path,
    env: &[(&str, &str)],
    timeout: Duration,
    description: &str,
) -> Result<Output, CommandError> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(command)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .kill_on_drop(true);
    for (key, value) in env {
        cmd.env(key, value);
    }

    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(CommandError::Spawn {
            description: description.to_string(),
            source,
        }),
        Err(_elapsed) => Err(CommandError::Timeout {
            description: description.to_string(),
            timeout,
        }),
    }
}

/// Last few lines of a process's stderr, for error messages.
pub fn stderr_tail(output: &Output) -> String {
    tail_lines(&String::from_utf8_lossy(&output.stderr), STDERR_TAIL_LINES)
}

pub fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.trim_end().lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

/// `exit status 3` or `killed by signal` for messages.
pub fn describe_status(output: &Output) -> String {
    match output.status.code() {
        Some(code) => format!("exit status {}", code),
        None => "killed by signal".to_string(),
    }
}

#[cfg(test)]
#[path = "user_command_tests.rs"]
mod tests;
