// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command admission policy.
//!
//! A pure decision function over a command, a policy profile, and the
//! session history the manager has observed. Checks run in a fixed order;
//! the first match wins and names the rule it tripped.

use sb_core::{Command, CommandIntent, CommandKind, PolicyProfile};

/// Outcome of a policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Allow,
    Reject { reason: &'static str, rule: &'static str },
}

impl PolicyDecision {
    pub fn is_allow(self) -> bool {
        matches!(self, PolicyDecision::Allow)
    }
}

/// Session history the enforcer needs but does not own. The session
/// manager supplies it per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObservedHistory {
    /// A successful `run-tests` completed since the last commit.
    pub tests_passed_since_commit: bool,
    /// The session's approval flag is set.
    pub approved: bool,
}

/// Decide whether `command` is admitted under `profile`.
pub fn enforce(
    command: &Command,
    profile: &PolicyProfile,
    history: ObservedHistory,
) -> PolicyDecision {
    let kind = command.kind();

    if let Some(whitelist) = &profile.command_whitelist {
        if !whitelist.contains(&kind) {
            return reject("Policy violation", "Command not in whitelist");
        }
    }

    if let Some(blacklist) = &profile.command_blacklist {
        if blacklist.contains(&kind) {
            return reject("Policy violation", "Command in blacklist");
        }
    }

    if kind.mutates_branch() {
        if let Some(branch) = command.target_branch() {
            if profile.protected_branches.iter().any(|b| b == branch) {
                return reject("Protected branch", "Protected branch");
            }
        }
    }

    if kind == CommandKind::Commit {
        if let (Some(max), CommandIntent::Commit { include_paths, .. }) =
            (profile.max_files_per_commit, &command.intent)
        {
            if include_paths.len() > max {
                return reject("Too many files", "Max files per commit");
            }
        }
    }

    if kind == CommandKind::Push {
        if profile.require_tests_before_push && !history.tests_passed_since_commit {
            return reject("Tests required before push", "Tests required");
        }
        if profile.require_approval_for_push && !history.approved {
            return reject("Approval required", "Approval required");
        }
    }

    if kind == CommandKind::TransitionTicket {
        if let (Some(allowed), CommandIntent::TransitionTicket { to_state, .. }) =
            (&profile.allowed_work_item_transitions, &command.intent)
        {
            if !allowed.iter().any(|state| state == to_state) {
                return reject("Transition not allowed", "Allowed transitions");
            }
        }
    }

    PolicyDecision::Allow
}

fn reject(reason: &'static str, rule: &'static str) -> PolicyDecision {
    PolicyDecision::Reject { reason, rule }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
