//! Result matrix: one row per round, one cell per task-slot.
//!
//! Every mutation replaces whole cells or rows through `&mut self`, so a
//! reader can never see a row whose length disagrees with the chain the
//! session is holding.

use serde::{Deserialize, Serialize};

/// Upper bound for the number of rounds in a session.
pub const MAX_ROUNDS: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Incomplete,
    CompleteAt,
    CompleteUnder,
    CompleteOver,
    Skipped,
}

impl TaskStatus {
    /// Classify a finished task by comparing actual against target seconds.
    pub fn classify(actual_sec: u64, target_sec: u64) -> Self {
        match actual_sec.cmp(&target_sec) {
            std::cmp::Ordering::Less => TaskStatus::CompleteUnder,
            std::cmp::Ordering::Equal => TaskStatus::CompleteAt,
            std::cmp::Ordering::Greater => TaskStatus::CompleteOver,
        }
    }

    pub fn is_complete(self) -> bool {
        matches!(
            self,
            TaskStatus::CompleteAt | TaskStatus::CompleteUnder | TaskStatus::CompleteOver
        )
    }
}

/// Outcome stored in one cell.
///
/// `actual_sec` is present exactly when the status is not `Incomplete`;
/// the constructors are the only way to build one, which keeps that pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    status: TaskStatus,
    actual_sec: Option<u64>,
}

impl TaskResult {
    pub const INCOMPLETE: TaskResult = TaskResult {
        status: TaskStatus::Incomplete,
        actual_sec: None,
    };

    pub const SKIPPED: TaskResult = TaskResult {
        status: TaskStatus::Skipped,
        actual_sec: Some(0),
    };

    /// A completion, classified against `target_sec`.
    pub fn completed(actual_sec: u64, target_sec: u64) -> Self {
        Self {
            status: TaskStatus::classify(actual_sec, target_sec),
            actual_sec: Some(actual_sec),
        }
    }

    /// An exact completion regardless of how long the task really ran.
    pub fn completed_at(target_sec: u64) -> Self {
        Self {
            status: TaskStatus::CompleteAt,
            actual_sec: Some(target_sec),
        }
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn actual_sec(&self) -> Option<u64> {
        self.actual_sec
    }

    /// Repair a cell read from storage so the status/actual pairing holds.
    fn normalized(self) -> Self {
        match (self.status, self.actual_sec) {
            (TaskStatus::Incomplete, _) => Self::INCOMPLETE,
            (TaskStatus::Skipped, _) => Self::SKIPPED,
            (status, actual) => Self {
                status,
                actual_sec: Some(actual.unwrap_or(0)),
            },
        }
    }
}

impl Default for TaskResult {
    fn default() -> Self {
        Self::INCOMPLETE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultMatrix {
    rows: Vec<Vec<TaskResult>>,
}

impl ResultMatrix {
    /// Fresh matrix of `rounds` x `chain_len` incomplete cells.
    ///
    /// `rounds` is clamped into `1..=MAX_ROUNDS`.
    pub fn new(rounds: usize, chain_len: usize) -> Self {
        let rounds = rounds.clamp(1, MAX_ROUNDS);
        Self {
            rows: vec![vec![TaskResult::INCOMPLETE; chain_len]; rounds],
        }
    }

    pub fn rounds(&self) -> usize {
        self.rows.len()
    }

    /// Cells per row (all rows share it).
    pub fn row_len(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    pub fn row(&self, round: usize) -> Option<&[TaskResult]> {
        self.rows.get(round).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[TaskResult]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn cell(&self, round: usize, slot: usize) -> Option<TaskResult> {
        self.rows.get(round)?.get(slot).copied()
    }

    /// Replace one cell. Out-of-range coordinates are ignored.
    pub(crate) fn set(&mut self, round: usize, slot: usize, result: TaskResult) {
        if let Some(cell) = self.rows.get_mut(round).and_then(|r| r.get_mut(slot)) {
            *cell = result;
        }
    }

    /// Pad or truncate every row to `len` cells.
    pub(crate) fn resize_rows(&mut self, len: usize) {
        for row in &mut self.rows {
            row.resize(len, TaskResult::INCOMPLETE);
        }
    }

    /// Grow (with incomplete rows) or shrink to `rounds`, clamped to
    /// `1..=MAX_ROUNDS`. Returns the resulting count.
    pub(crate) fn set_rounds(&mut self, rounds: usize) -> usize {
        let rounds = rounds.clamp(1, MAX_ROUNDS);
        let len = self.row_len();
        self.rows.resize_with(rounds, || vec![TaskResult::INCOMPLETE; len]);
        rounds
    }

    /// Reset every cell to incomplete.
    pub(crate) fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(TaskResult::INCOMPLETE);
        }
    }

    /// Check that every row has `chain_len` cells and fix cell pairings.
    pub(crate) fn validate(&mut self, chain_len: usize) -> Result<(), crate::ValidationError> {
        if self.rows.is_empty() {
            self.rows.push(vec![TaskResult::INCOMPLETE; chain_len]);
        }
        self.rows.truncate(MAX_ROUNDS);
        for (round, row) in self.rows.iter_mut().enumerate() {
            if row.len() != chain_len {
                return Err(crate::ValidationError::RowLength {
                    round,
                    len: row.len(),
                    chain_len,
                });
            }
            for cell in row.iter_mut() {
                *cell = cell.normalized();
            }
        }
        Ok(())
    }
}
