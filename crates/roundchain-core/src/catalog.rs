//! Task catalog and chain.
//!
//! The catalog maps task identifiers to a name and a target duration. The
//! chain is the ordered list of task-slots run once per round. Both are
//! plain values here; keeping them in step with the result matrix is the
//! job of [`crate::session::Session`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Upper bound for the number of task-slots in a chain.
pub const MAX_CHAIN_LEN: usize = 25;

/// Opaque, stable task identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    /// Target duration in whole seconds.
    pub target_sec: u64,
}

impl Task {
    pub fn new(name: impl Into<String>, target_sec: u64) -> Self {
        Self {
            id: TaskId::generate(),
            name: name.into(),
            target_sec,
        }
    }

    pub fn with_id(id: impl Into<TaskId>, name: impl Into<String>, target_sec: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            target_sec,
        }
    }
}

/// Mapping from task identifier to task definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskCatalog {
    tasks: HashMap<TaskId, Task>,
}

impl TaskCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a task, keyed by its id.
    pub fn upsert(&mut self, task: Task) {
        self.tasks.insert(task.id.clone(), task);
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn get_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(id)
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn remove(&mut self, id: &TaskId) -> Option<Task> {
        self.tasks.remove(id)
    }

    /// Target of a task, `0` for ids the catalog does not know.
    pub fn target_sec(&self, id: &TaskId) -> u64 {
        self.tasks.get(id).map(|t| t.target_sec).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }
}

impl FromIterator<Task> for TaskCatalog {
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for task in iter {
            catalog.upsert(task);
        }
        catalog
    }
}

/// Ordered task-slots, 1..=[`MAX_CHAIN_LEN`] long once owned by a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chain {
    slots: Vec<TaskId>,
}

impl Chain {
    /// Build a chain, dropping slots past [`MAX_CHAIN_LEN`].
    pub fn new(mut slots: Vec<TaskId>) -> Self {
        slots.truncate(MAX_CHAIN_LEN);
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= MAX_CHAIN_LEN
    }

    pub fn get(&self, slot: usize) -> Option<&TaskId> {
        self.slots.get(slot)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TaskId> {
        self.slots.iter()
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.slots.contains(id)
    }

    pub fn last_index(&self) -> usize {
        self.slots.len().saturating_sub(1)
    }

    /// Append a slot. Returns `false` when the chain is already full.
    pub(crate) fn push(&mut self, id: TaskId) -> bool {
        if self.is_full() {
            return false;
        }
        self.slots.push(id);
        true
    }

    /// Remove a slot. Refuses to remove the only slot.
    pub(crate) fn remove(&mut self, slot: usize) -> Option<TaskId> {
        if self.slots.len() <= 1 || slot >= self.slots.len() {
            return None;
        }
        Some(self.slots.remove(slot))
    }

    /// Move a slot, clamping both indices into range.
    pub(crate) fn move_slot(&mut self, from: usize, to: usize) -> bool {
        if self.slots.is_empty() {
            return false;
        }
        let last = self.last_index();
        let (from, to) = (from.min(last), to.min(last));
        if from == to {
            return false;
        }
        let id = self.slots.remove(from);
        self.slots.insert(to, id);
        true
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a TaskId;
    type IntoIter = std::slice::Iter<'a, TaskId>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}
