// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell-backed runner for `run-tests` and `build-project`.
//!
//! Commands run through `bash -c` in the session workspace with captured
//! output surfaced as `test-results`/`build-log` artifacts. A kind with no
//! configured command completes `failure, "unsupported"`.

use crate::subprocess::{run_with_timeout, text, RUNNER_COMMAND_TIMEOUT};
use crate::{Adapter, AdapterError, SessionContext};
use async_trait::async_trait;
use sb_core::{Artifact, ArtifactKind, Command, CommandIntent, CommandKind};
use std::time::Duration;

/// Shell commands the runner executes per intent.
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    pub test_command: Option<String>,
    pub build_command: Option<String>,
}

impl RunnerConfig {
    pub fn with_test_command(mut self, command: impl Into<String>) -> Self {
        self.test_command = Some(command.into());
        self
    }

    pub fn with_build_command(mut self, command: impl Into<String>) -> Self {
        self.build_command = Some(command.into());
        self
    }
}

#[derive(Debug)]
pub struct CommandRunner {
    config: RunnerConfig,
}

impl CommandRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    async fn run_shell(
        &self,
        ctx: &SessionContext,
        shell_command: String,
        timeout: Duration,
        artifact_kind: ArtifactKind,
        artifact_name: &str,
    ) -> Result<(), AdapterError> {
        let wrapped = format!("set -euo pipefail\n{shell_command}");
        let mut cmd = tokio::process::Command::new("bash");
        cmd.arg("-c").arg(&wrapped).current_dir(ctx.workspace_path());

        let output = tokio::select! {
            output = run_with_timeout(cmd, timeout, artifact_name) => output,
            _ = ctx.cancellation().cancelled() => {
                ctx.complete_failure("cancelled", Some("CANCELLED"));
                return Ok(());
            }
        };

        let output = match output {
            Ok(output) => output,
            Err(AdapterError::Timeout(_)) => {
                ctx.complete_failure("timeout", Some("TIMEOUT"));
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let mut report = text(&output.stdout);
        let stderr = text(&output.stderr);
        if !stderr.is_empty() {
            if !report.is_empty() {
                report.push('\n');
            }
            report.push_str(&stderr);
        }
        ctx.artifact(Artifact::inline(artifact_kind, artifact_name, report));

        let code = output.status.code().unwrap_or(-1);
        if output.status.success() {
            ctx.complete_success();
        } else {
            tracing::info!(exit_code = code, command = %shell_command, "runner command failed");
            ctx.complete_failure(format!("exited with code {code}"), Some("EXIT_NONZERO"));
        }
        Ok(())
    }
}

#[async_trait]
impl Adapter for CommandRunner {
    fn name(&self) -> &str {
        "command-runner"
    }

    fn can_handle(&self, command: &Command) -> bool {
        matches!(command.kind(), CommandKind::RunTests | CommandKind::BuildProject)
    }

    async fn handle(&self, command: &Command, ctx: &SessionContext) -> Result<(), AdapterError> {
        let timeout =
            command.timeout_ms().map(Duration::from_millis).unwrap_or(RUNNER_COMMAND_TIMEOUT);

        let (configured, selector, artifact_kind, artifact_name) = match &command.intent {
            CommandIntent::RunTests { selector, .. } => (
                self.config.test_command.as_ref(),
                selector.as_deref(),
                ArtifactKind::TestResults,
                "test-results.txt",
            ),
            CommandIntent::BuildProject { target, .. } => (
                self.config.build_command.as_ref(),
                target.as_deref(),
                ArtifactKind::BuildLog,
                "build.log",
            ),
            other => return Err(AdapterError::Unsupported(other.kind().to_string())),
        };

        let Some(base) = configured else {
            ctx.complete_failure("unsupported", Some("UNSUPPORTED"));
            return Ok(());
        };

        let shell_command = match selector {
            Some(selector) => format!("{base} {selector}"),
            None => base.clone(),
        };

        if ctx.live().dry_run {
            ctx.artifact(Artifact::inline(
                ArtifactKind::Log,
                "dry-run.log",
                shell_command,
            ));
            ctx.complete_success_with("dry run");
            return Ok(());
        }

        self.run_shell(ctx, shell_command, timeout, artifact_kind, artifact_name).await
    }
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;
