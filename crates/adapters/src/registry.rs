// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named adapter construction.
//!
//! Deployments name adapters in config (`vcsAdapter = "git"`); the registry
//! resolves those names to instances. Insertion order is preserved because
//! registration order defines dispatch priority.

use crate::{Adapter, CommandRunner, GitAdapter, InMemoryTracker, RunnerConfig};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

type AdapterFactory = Box<dyn Fn() -> Arc<dyn Adapter> + Send + Sync>;

/// A name the registry cannot resolve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown adapter: {0}")]
pub struct UnknownAdapter(pub String);

/// Which adapter serves each orchestrator slot. Unset slots are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcs_adapter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_adapter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_items_adapter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal_adapter: Option<String>,
}

impl AdapterSelection {
    /// The selection used when config names nothing.
    pub fn standard() -> Self {
        Self {
            vcs_adapter: Some("git".to_string()),
            build_adapter: Some("command-runner".to_string()),
            work_items_adapter: Some("memory".to_string()),
            terminal_adapter: None,
        }
    }

    fn slots(&self) -> impl Iterator<Item = &String> {
        [
            self.vcs_adapter.as_ref(),
            self.build_adapter.as_ref(),
            self.work_items_adapter.as_ref(),
            self.terminal_adapter.as_ref(),
        ]
        .into_iter()
        .flatten()
    }
}

/// Registry of adapter constructors, keyed by name.
pub struct AdapterRegistry {
    factories: IndexMap<String, AdapterFactory>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self { factories: IndexMap::new() }
    }

    /// Registry pre-populated with the reference adapters.
    pub fn with_defaults(runner: RunnerConfig) -> Self {
        let mut registry = Self::new();
        registry.register("git", || Arc::new(GitAdapter::new()));
        registry.register("command-runner", move || Arc::new(CommandRunner::new(runner.clone())));
        registry.register("memory", || Arc::new(InMemoryTracker::new()));
        registry
    }

    /// Register a constructor under a name. Re-registering a name replaces
    /// the factory but keeps its original position.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Arc<dyn Adapter> + Send + Sync + 'static,
    ) {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Adapter>> {
        self.factories.get(name).map(|factory| factory())
    }

    /// Resolve a selection into an ordered adapter list (vcs, build,
    /// work-items, terminal). Unset slots are skipped; unknown names fail.
    pub fn select(&self, selection: &AdapterSelection) -> Result<Vec<Arc<dyn Adapter>>, UnknownAdapter> {
        selection
            .slots()
            .map(|name| self.resolve(name).ok_or_else(|| UnknownAdapter(name.clone())))
            .collect()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
