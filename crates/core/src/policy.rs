// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Policy profiles and rate-limit configuration.
//!
//! A profile is a named bundle of admission rules applied to a session. The
//! engine's enforcer interprets these values; this module only defines them.

use crate::command::CommandKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Named admission rules for a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyProfile {
    pub name: String,

    /// When present, only these kinds are admitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_whitelist: Option<Vec<CommandKind>>,

    /// When present, these kinds are refused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_blacklist: Option<Vec<CommandKind>>,

    /// Branches that branch-mutating commands may not target.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protected_branches: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_files_per_commit: Option<usize>,

    /// Require an observed successful `run-tests` since the last commit
    /// before admitting `push`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub require_tests_before_push: bool,

    /// Require the session's approval flag before admitting `push`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub require_approval_for_push: bool,

    /// When present, `transition-ticket` may only move items into these
    /// states.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_work_item_transitions: Option<Vec<String>>,

    /// Session-level rate limits; absent means no session-level limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<RateLimits>,
}

impl PolicyProfile {
    /// A permissive profile with the given name and no restrictions.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn with_protected_branches<I, S>(mut self, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protected_branches = branches.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_limits(mut self, limits: RateLimits) -> Self {
        self.limits = Some(limits);
        self
    }
}

/// Token-bucket sizing. `calls_per_minute` is the refill rate, `burst` the
/// bucket capacity (defaults to `calls_per_minute` when absent).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calls_per_minute: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burst: Option<u32>,
    /// Per-kind caps, each realized as its own bucket with rate = cap/min
    /// and burst = cap.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub per_command_caps: HashMap<CommandKind, u32>,
}

impl RateLimits {
    pub fn per_minute(calls_per_minute: u32, burst: u32) -> Self {
        Self {
            calls_per_minute: Some(calls_per_minute),
            burst: Some(burst),
            per_command_caps: HashMap::new(),
        }
    }

    pub fn cap(mut self, kind: CommandKind, per_minute: u32) -> Self {
        self.per_command_caps.insert(kind, per_minute);
        self
    }
}

/// Whether adapters may touch the real world. The orchestrator never forces
/// real effects; adapters consult these flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivePolicy {
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
    #[serde(default)]
    pub allow_push: bool,
}

fn default_dry_run() -> bool {
    true
}

impl Default for LivePolicy {
    fn default() -> Self {
        Self { dry_run: true, allow_push: false }
    }
}

impl LivePolicy {
    /// Flags for a deployment that executes commands for real.
    pub fn live() -> Self {
        Self { dry_run: false, allow_push: false }
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
