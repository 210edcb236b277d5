// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess helpers for CLI-backed adapters.

use crate::AdapterError;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Ceiling for a single git invocation.
pub const GIT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// Ceiling for a test/build run when the command carries no timeout.
pub const RUNNER_COMMAND_TIMEOUT: Duration = Duration::from_secs(600);

/// Run a command to completion with a timeout.
///
/// The child is killed if the timeout elapses (the future drop triggers
/// `kill_on_drop`). `label` names the operation in the timeout error.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    label: &str,
) -> Result<std::process::Output, AdapterError> {
    cmd.stdin(Stdio::null());
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(AdapterError::Io(e)),
        Err(_) => Err(AdapterError::Timeout(label.to_string())),
    }
}

/// Lossy UTF-8 view of process output, trimmed.
pub fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim_end().to_string()
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
