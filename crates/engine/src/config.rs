// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator configuration.
//!
//! Everything the source kept in process-wide singletons (policy map,
//! global limits, live-policy flags) is an explicit value here, owned by
//! the orchestrator instance. One instance per process is the expected
//! deployment; several instances coexist for tests.

use crate::error::OrchestratorError;
use sb_adapters::AdapterSelection;
use sb_core::{ClaimConfig, LivePolicy, PolicyProfile, RateLimits};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorConfig {
    /// Named policy profiles sessions can be created against.
    #[serde(default)]
    pub profiles: HashMap<String, PolicyProfile>,

    /// Profile used when a caller names none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,

    /// Process-wide rate limits, layered before any session limits.
    #[serde(default)]
    pub global_limits: RateLimits,

    #[serde(default)]
    pub live: LivePolicy,

    #[serde(default)]
    pub claims: ClaimConfig,

    #[serde(default)]
    pub adapters: AdapterSelection,

    /// Root for provider-allocated session workspaces.
    #[serde(default = "default_workspace_root")]
    pub workspace_root: PathBuf,

    /// Ceiling on a single command's adapter handling.
    #[serde(default = "default_wall_clock_ms")]
    pub command_wall_clock_ms: u64,

    /// Bounded queue depth per event subscriber.
    #[serde(default = "default_subscriber_buffer")]
    pub subscriber_buffer: usize,
}

fn default_workspace_root() -> PathBuf {
    std::env::temp_dir().join("switchboard")
}

fn default_wall_clock_ms() -> u64 {
    60_000
}

fn default_subscriber_buffer() -> usize {
    64
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            profiles: HashMap::new(),
            default_profile: None,
            global_limits: RateLimits::default(),
            live: LivePolicy::default(),
            claims: ClaimConfig::default(),
            adapters: AdapterSelection::standard(),
            workspace_root: default_workspace_root(),
            command_wall_clock_ms: default_wall_clock_ms(),
            subscriber_buffer: default_subscriber_buffer(),
        }
    }
}

impl OrchestratorConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, OrchestratorError> {
        toml::from_str(input).map_err(|e| OrchestratorError::Config(e.to_string()))
    }

    /// Resolve a profile by name, falling back to `default_profile`.
    pub fn profile(&self, name: Option<&str>) -> Result<PolicyProfile, OrchestratorError> {
        let name = name
            .or(self.default_profile.as_deref())
            .ok_or_else(|| OrchestratorError::UnknownProfile("<none>".to_string()))?;
        self.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| OrchestratorError::UnknownProfile(name.to_string()))
    }

    pub fn command_wall_clock(&self) -> Duration {
        Duration::from_millis(self.command_wall_clock_ms)
    }

    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = root.into();
        self
    }

    pub fn with_wall_clock(mut self, wall_clock: Duration) -> Self {
        self.command_wall_clock_ms = wall_clock.as_millis() as u64;
        self
    }

    pub fn with_subscriber_buffer(mut self, buffer: usize) -> Self {
        self.subscriber_buffer = buffer;
        self
    }

    pub fn with_global_limits(mut self, limits: RateLimits) -> Self {
        self.global_limits = limits;
        self
    }

    pub fn with_profile(mut self, profile: PolicyProfile) -> Self {
        self.profiles.insert(profile.name.clone(), profile);
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
