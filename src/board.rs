// --------------------------------------------------
// The task store.
//
// TaskStore owns the board's only task collection. All changes go through
// `dispatch`, one action at a time; reads get either the raw collection or
// a column in display order. Callers that share a store across tasks wrap
// it in SharedStore so there is still a single writer.
// --------------------------------------------------

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::action::Action;
use crate::error::Skip;
use crate::logic;
use crate::models::{Status, Task};
use crate::ordering;

pub type SharedStore = Arc<Mutex<TaskStore>>;

// Receives a snapshot after every applied action, and `clear` on reset.
// Best effort: implementations log their own failures and the in-memory
// collection stays authoritative either way.
pub trait Persist: Send {
    fn persist(&mut self, tasks: &[Task]);
    fn clear(&mut self);
}

// Result of a dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    Applied,
    Skipped(Skip),
}

impl Dispatched {
    pub fn is_applied(&self) -> bool {
        matches!(self, Dispatched::Applied)
    }
}

#[derive(Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    persist: Option<Box<dyn Persist>>,
    skipped: u64,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_persist(persist: impl Persist + 'static) -> Self {
        let mut store = Self::new();
        store.persist = Some(Box::new(persist));
        store
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    pub fn dispatch(&mut self, action: Action) -> Dispatched {
        self.dispatch_at(action, Utc::now())
    }

    // Dispatch with an explicit clock reading.
    pub fn dispatch_at(&mut self, action: Action, now: DateTime<Utc>) -> Dispatched {
        let kind = action.kind();
        let hydrating = matches!(action, Action::HydrateFromStorage(_));

        match logic::reduce(&self.tasks, action, now) {
            Ok(next) => {
                self.tasks = next;
                tracing::debug!(action = kind, total = self.tasks.len(), "action applied");

                if hydrating && !ordering::is_dense(&self.tasks) {
                    tracing::warn!(
                        total = self.tasks.len(),
                        "hydrated tasks have gaps or duplicates in column order; kept as stored"
                    );
                }

                if let Some(persist) = self.persist.as_mut() {
                    persist.persist(&self.tasks);
                }
                Dispatched::Applied
            }
            Err(skip) => {
                self.skipped += 1;
                tracing::debug!(action = kind, reason = %skip, "action skipped");
                Dispatched::Skipped(skip)
            }
        }
    }

    // Empty the board and drop the saved copy. Returns how many tasks went.
    pub fn reset(&mut self) -> usize {
        let removed = self.tasks.len();
        self.tasks.clear();
        if let Some(persist) = self.persist.as_mut() {
            persist.clear();
        }
        tracing::info!(removed, "board reset");
        removed
    }

    // Whole collection in storage order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    // One column, display-ready (ascending order_index)
    pub fn tasks_by_status(&self, status: Status) -> Vec<Task> {
        ordering::sorted_column(&self.tasks, status)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    // Number of dispatches that turned out to be no-ops
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}
