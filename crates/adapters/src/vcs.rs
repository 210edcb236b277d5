// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git CLI adapter for branch, commit, push, diff, and patch intents.
//!
//! All repository work happens inside the session workspace. The adapter
//! honors [`sb_core::LivePolicy`]: in dry-run mode it emits the same event
//! shapes without touching the repository, and `push` requires
//! `allow_push`.

use crate::subprocess::{run_with_timeout, text, GIT_COMMAND_TIMEOUT};
use crate::{Adapter, AdapterError, SessionContext};
use async_trait::async_trait;
use sb_core::{Artifact, ArtifactKind, Command, CommandIntent, CommandKind};

const PATCH_FILE: &str = ".switchboard.patch";

#[derive(Debug)]
pub struct GitAdapter;

impl GitAdapter {
    pub fn new() -> Self {
        Self
    }

    async fn git(
        &self,
        ctx: &SessionContext,
        args: &[String],
    ) -> Result<std::process::Output, AdapterError> {
        let mut cmd = tokio::process::Command::new("git");
        cmd.args(args).current_dir(ctx.workspace_path());
        run_with_timeout(cmd, GIT_COMMAND_TIMEOUT, "git").await
    }

    /// Run a sequence of git invocations, completing with failure on the
    /// first non-zero exit. Returns the last invocation's output when all
    /// succeed, `None` when a failure was already reported.
    async fn run_all(
        &self,
        ctx: &SessionContext,
        plans: &[Vec<String>],
    ) -> Result<Option<std::process::Output>, AdapterError> {
        let mut last = None;
        for args in plans {
            let output = self.git(ctx, args).await?;
            if !output.status.success() {
                let stderr = text(&output.stderr);
                tracing::warn!(args = ?args, %stderr, "git invocation failed");
                ctx.complete_failure(stderr.clone(), Some(classify_git_error(&stderr)));
                return Ok(None);
            }
            last = Some(output);
        }
        Ok(last)
    }

    fn dry_run_skip(&self, ctx: &SessionContext, plans: &[Vec<String>]) {
        let rendered: Vec<String> =
            plans.iter().map(|args| format!("git {}", args.join(" "))).collect();
        ctx.artifact(Artifact::inline(
            ArtifactKind::Log,
            "dry-run.log",
            rendered.join("\n"),
        ));
        ctx.complete_success_with("dry run");
    }
}

impl Default for GitAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for GitAdapter {
    fn name(&self) -> &str {
        "git"
    }

    fn can_handle(&self, command: &Command) -> bool {
        matches!(
            command.kind(),
            CommandKind::CreateBranch
                | CommandKind::ApplyPatch
                | CommandKind::Commit
                | CommandKind::Push
                | CommandKind::GetDiff
        )
    }

    async fn handle(&self, command: &Command, ctx: &SessionContext) -> Result<(), AdapterError> {
        match &command.intent {
            CommandIntent::CreateBranch { branch, start_point, .. } => {
                let plans = vec![create_branch_args(branch, start_point.as_deref())];
                if ctx.live().dry_run {
                    self.dry_run_skip(ctx, &plans);
                    return Ok(());
                }
                if self.run_all(ctx, &plans).await?.is_some() {
                    ctx.complete_success_with(format!("created branch {branch}"));
                }
            }

            CommandIntent::Commit { message, include_paths, .. } => {
                let plans = commit_plans(message, include_paths);
                if ctx.live().dry_run {
                    self.dry_run_skip(ctx, &plans);
                    return Ok(());
                }
                if self.run_all(ctx, &plans).await?.is_some() {
                    ctx.complete_success_with("committed");
                }
            }

            CommandIntent::Push { branch, set_upstream, .. } => {
                if !ctx.live().allow_push {
                    ctx.complete_failure("push disabled by live policy", Some("PUSH_DISABLED"));
                    return Ok(());
                }
                let plans = vec![push_args(branch, *set_upstream)];
                if ctx.live().dry_run {
                    self.dry_run_skip(ctx, &plans);
                    return Ok(());
                }
                if self.run_all(ctx, &plans).await?.is_some() {
                    ctx.complete_success_with(format!("pushed {branch}"));
                }
            }

            CommandIntent::GetDiff { base, staged, .. } => {
                let plans = vec![diff_args(base.as_deref(), *staged)];
                if ctx.live().dry_run {
                    self.dry_run_skip(ctx, &plans);
                    return Ok(());
                }
                if let Some(output) = self.run_all(ctx, &plans).await? {
                    ctx.artifact(
                        Artifact::inline(ArtifactKind::Diff, "changes.diff", text(&output.stdout))
                            .with_content_type("text/x-diff"),
                    );
                    ctx.complete_success();
                }
            }

            CommandIntent::ApplyPatch { patch, .. } => {
                if ctx.live().dry_run {
                    self.dry_run_skip(ctx, &[apply_args(PATCH_FILE)]);
                    return Ok(());
                }
                let patch_path = ctx.workspace_path().join(PATCH_FILE);
                tokio::fs::write(&patch_path, patch).await?;
                let output = self.git(ctx, &apply_args(PATCH_FILE)).await;
                // Leftover patch files confuse later diffs.
                let _ = tokio::fs::remove_file(&patch_path).await;
                let output = output?;
                if output.status.success() {
                    ctx.complete_success_with("patch applied");
                } else {
                    ctx.conflict(text(&output.stderr), Some(patch.clone()));
                    ctx.complete_failure("conflict", Some("CONFLICT"));
                }
            }

            other => {
                return Err(AdapterError::Unsupported(other.kind().to_string()));
            }
        }
        Ok(())
    }
}

fn classify_git_error(stderr: &str) -> &'static str {
    let lower = stderr.to_ascii_lowercase();
    if lower.contains("authentication failed") || lower.contains("could not read username") {
        "AUTH_ERROR"
    } else {
        "GIT_ERROR"
    }
}

fn create_branch_args(branch: &str, start_point: Option<&str>) -> Vec<String> {
    let mut args = vec!["switch".to_string(), "-c".to_string(), branch.to_string()];
    if let Some(start) = start_point {
        args.push(start.to_string());
    }
    args
}

fn commit_plans(message: &str, include_paths: &[String]) -> Vec<Vec<String>> {
    let mut add = vec!["add".to_string()];
    if include_paths.is_empty() {
        add.push("-A".to_string());
    } else {
        add.push("--".to_string());
        add.extend(include_paths.iter().cloned());
    }
    vec![add, vec!["commit".to_string(), "-m".to_string(), message.to_string()]]
}

fn push_args(branch: &str, set_upstream: bool) -> Vec<String> {
    let mut args = vec!["push".to_string()];
    if set_upstream {
        args.push("-u".to_string());
    }
    args.push("origin".to_string());
    args.push(branch.to_string());
    args
}

fn diff_args(base: Option<&str>, staged: bool) -> Vec<String> {
    let mut args = vec!["diff".to_string()];
    if staged {
        args.push("--staged".to_string());
    }
    if let Some(base) = base {
        args.push(base.to_string());
    }
    args
}

fn apply_args(patch_file: &str) -> Vec<String> {
    vec!["apply".to_string(), "--3way".to_string(), patch_file.to_string()]
}

#[cfg(test)]
#[path = "vcs_tests.rs"]
mod tests;
