// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only session event log with ordered fan-out.
//!
//! The log is the single source of truth for a session; subscribers are
//! pump tasks that walk it at their own pace and forward into a bounded
//! per-subscriber channel. A slow subscriber fills only its own channel
//! and blocks only its own pump; appends never wait.

use parking_lot::RwLock;
use sb_adapters::EventSink;
use sb_core::{Correlation, Event, EventKind, SessionId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};

pub(crate) struct SessionLog {
    session_id: SessionId,
    events: RwLock<Vec<Event>>,
    notify: Notify,
}

impl SessionLog {
    pub(crate) fn new(session_id: SessionId) -> Self {
        Self { session_id, events: RwLock::new(Vec::new()), notify: Notify::new() }
    }

    /// Atomic append; wakes every waiting pump.
    pub(crate) fn append(&self, event: Event) {
        debug_assert_eq!(event.correlation.session_id, self.session_id);
        self.events.write().push(event);
        self.notify.notify_waiters();
    }

    pub(crate) fn len(&self) -> usize {
        self.events.read().len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<Event> {
        self.events.read().get(index).cloned()
    }

    pub(crate) fn snapshot(&self) -> Vec<Event> {
        self.events.read().clone()
    }
}

impl EventSink for SessionLog {
    fn emit(&self, kind: EventKind, correlation: Correlation) {
        tracing::debug!(session = %self.session_id, event = kind.name(), "emit");
        self.append(Event::new(correlation, kind));
    }
}

/// Where a subscription starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubscribeFrom {
    /// Replay every event already in the log, then stream live.
    #[default]
    Birth,
    /// Stream only events appended after subscription.
    Now,
}

/// A lazy, ordered sequence of one session's events.
///
/// Dropping the stream unsubscribes: the pump notices the closed channel
/// and exits.
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::Receiver<Event>,
}

impl EventStream {
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// `next` with a deadline; `None` on timeout or a closed stream.
    pub async fn next_timeout(&mut self, timeout: Duration) -> Option<Event> {
        tokio::time::timeout(timeout, self.rx.recv()).await.ok().flatten()
    }

    /// Collect the next `n` events, waiting up to `timeout` for each.
    pub async fn take(&mut self, n: usize, timeout: Duration) -> Vec<Event> {
        let mut events = Vec::with_capacity(n);
        for _ in 0..n {
            match self.next_timeout(timeout).await {
                Some(event) => events.push(event),
                None => break,
            }
        }
        events
    }
}

pub(crate) fn subscribe(log: Arc<SessionLog>, from: SubscribeFrom, buffer: usize) -> EventStream {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    let start = match from {
        SubscribeFrom::Birth => 0,
        SubscribeFrom::Now => log.len(),
    };
    tokio::spawn(pump(log, start, tx));
    EventStream { rx }
}

/// Forward log entries from `index` onward into the subscriber channel, in
/// log order, waiting for appends as needed.
async fn pump(log: Arc<SessionLog>, mut index: usize, tx: mpsc::Sender<Event>) {
    loop {
        match log.get(index) {
            Some(event) => {
                if tx.send(event).await.is_err() {
                    // Subscriber dropped its stream.
                    break;
                }
                index += 1;
            }
            None => {
                let notified = log.notify.notified();
                tokio::pin!(notified);
                // Register interest before the re-check so an append
                // between the two cannot be missed.
                notified.as_mut().enable();
                if log.len() > index {
                    continue;
                }
                notified.await;
            }
        }
    }
}
