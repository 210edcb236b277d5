// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sb-adapters: Adapter contract and reference adapters.
//!
//! An adapter is a pluggable capability handling a subset of command kinds.
//! The engine selects the first registered adapter whose `can_handle`
//! accepts the command and invokes `handle` with a per-command
//! [`SessionContext`]; everything the adapter reports back travels as
//! events through the context.

pub mod build;
pub mod context;
pub mod registry;
pub mod subprocess;
pub mod vcs;
pub mod work_items;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

use async_trait::async_trait;
use sb_core::{Command, Correlation, EventKind};
use thiserror::Error;

pub use build::{CommandRunner, RunnerConfig};
pub use context::SessionContext;
pub use registry::{AdapterRegistry, AdapterSelection, UnknownAdapter};
pub use vcs::GitAdapter;
pub use work_items::InMemoryTracker;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{Behavior, FakeAdapter, RecordingSink};

/// Errors an adapter may surface to the engine.
///
/// The engine translates an `Err` from [`Adapter::handle`] into a
/// `command-completed(failure)` event carrying [`AdapterError::code`].
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    #[error("cancelled")]
    Cancelled,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}

impl AdapterError {
    /// Stable wire code for the event stream.
    pub fn code(&self) -> &'static str {
        match self {
            AdapterError::Auth(_) => "AUTH_ERROR",
            AdapterError::Conflict(_) => "CONFLICT",
            AdapterError::Timeout(_) => "TIMEOUT",
            AdapterError::Unsupported(_) => "UNSUPPORTED",
            AdapterError::Cancelled => "CANCELLED",
            AdapterError::Io(_) => "IO_ERROR",
            AdapterError::Other(_) => "ADAPTER_ERROR",
        }
    }
}

/// A pluggable handler for a subset of command kinds.
///
/// Implementations must emit a terminal `command-completed` through the
/// context before returning (or return an error and let the engine emit
/// it), and must not retain the context past `handle`'s return.
#[async_trait]
pub trait Adapter: Send + Sync + std::fmt::Debug {
    /// Stable name used by registries and logs.
    fn name(&self) -> &str;

    /// Whether this adapter serves the command. The first registered
    /// adapter that accepts wins.
    fn can_handle(&self, command: &Command) -> bool;

    /// Handle the command, reporting progress and outcome via `ctx`.
    async fn handle(&self, command: &Command, ctx: &SessionContext) -> Result<(), AdapterError>;
}

/// Where adapter emissions land. Implemented by the engine's session log;
/// adapters only ever see the trait.
pub trait EventSink: Send + Sync {
    fn emit(&self, kind: EventKind, correlation: Correlation);
}
