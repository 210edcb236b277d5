// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process work-item tracker.
//!
//! Serves ticket intents from an in-memory store. Wire protocols and
//! authentication belong to real tracker clients outside this crate; this
//! adapter gives deployments and tests a complete tracker without either.

use crate::{Adapter, AdapterError, SessionContext};
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;
use sb_core::{Command, CommandIntent, CommandKind, EventKind, WorkItemDetails};

#[derive(Debug)]
pub struct InMemoryTracker {
    items: Mutex<IndexMap<String, WorkItemDetails>>,
}

impl InMemoryTracker {
    pub fn new() -> Self {
        Self { items: Mutex::new(IndexMap::new()) }
    }

    /// Tracker pre-populated with items, preserving their order for
    /// backlog queries.
    pub fn seeded(items: impl IntoIterator<Item = WorkItemDetails>) -> Self {
        let tracker = Self::new();
        {
            let mut map = tracker.items.lock();
            for item in items {
                map.insert(item.id.clone(), item);
            }
        }
        tracker
    }

    pub fn insert(&self, item: WorkItemDetails) {
        self.items.lock().insert(item.id.clone(), item);
    }

    pub fn get(&self, id: &str) -> Option<WorkItemDetails> {
        self.items.lock().get(id).cloned()
    }
}

impl Default for InMemoryTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for InMemoryTracker {
    fn name(&self) -> &str {
        "memory"
    }

    fn can_handle(&self, command: &Command) -> bool {
        matches!(
            command.kind(),
            CommandKind::TransitionTicket
                | CommandKind::Comment
                | CommandKind::SetAssignee
                | CommandKind::QueryBacklog
                | CommandKind::QueryWorkItem
        )
    }

    async fn handle(&self, command: &Command, ctx: &SessionContext) -> Result<(), AdapterError> {
        match &command.intent {
            CommandIntent::TransitionTicket { work_item, to_state } => {
                let mut items = self.items.lock();
                match items.get_mut(&work_item.id) {
                    Some(item) => {
                        tracing::debug!(id = %work_item.id, from = %item.state, to = %to_state, "ticket transition");
                        item.state = to_state.clone();
                        drop(items);
                        ctx.complete_success_with(format!("{} -> {to_state}", work_item.id));
                    }
                    None => {
                        drop(items);
                        ctx.complete_failure("work item not found", Some("NOT_FOUND"));
                    }
                }
            }

            CommandIntent::Comment { work_item, body } => {
                let mut items = self.items.lock();
                match items.get_mut(&work_item.id) {
                    Some(item) => {
                        item.comments.push(body.clone());
                        drop(items);
                        ctx.complete_success();
                    }
                    None => {
                        drop(items);
                        ctx.complete_failure("work item not found", Some("NOT_FOUND"));
                    }
                }
            }

            CommandIntent::SetAssignee { work_item, assignee } => {
                let mut items = self.items.lock();
                match items.get_mut(&work_item.id) {
                    Some(item) => {
                        item.assignee = Some(assignee.clone());
                        drop(items);
                        ctx.complete_success();
                    }
                    None => {
                        drop(items);
                        ctx.complete_failure("work item not found", Some("NOT_FOUND"));
                    }
                }
            }

            CommandIntent::QueryBacklog { filter, limit } => {
                let items = self.items.lock();
                let mut matched: Vec<_> = items
                    .values()
                    .filter(|item| match filter {
                        Some(filter) => {
                            item.state == *filter || item.title.contains(filter.as_str())
                        }
                        None => true,
                    })
                    .map(WorkItemDetails::summary)
                    .collect();
                drop(items);
                if let Some(limit) = limit {
                    matched.truncate(*limit);
                }
                ctx.emit(EventKind::BacklogQueried { items: matched });
                ctx.complete_success();
            }

            CommandIntent::QueryWorkItem { work_item } => {
                match self.get(&work_item.id) {
                    Some(details) => {
                        ctx.emit(EventKind::WorkItemQueried { details });
                        ctx.complete_success();
                    }
                    None => ctx.complete_failure("work item not found", Some("NOT_FOUND")),
                }
            }

            other => return Err(AdapterError::Unsupported(other.kind().to_string())),
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "work_items_tests.rs"]
mod tests;
