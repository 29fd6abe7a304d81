//! Read-side aggregates, recomputed on every call.
//!
//! Remaining values clamp at zero; time beyond the target is reported
//! separately through [`SessionState::overtime_secs`].

use super::SessionState;
use crate::catalog::{Chain, TaskCatalog};
use crate::matrix::{ResultMatrix, TaskStatus};

/// Sum of targets in `round`, leaving out slots skipped in that round.
pub fn round_target(catalog: &TaskCatalog, chain: &Chain, matrix: &ResultMatrix, round: usize) -> u64 {
    let Some(row) = matrix.row(round) else {
        return 0;
    };
    chain
        .iter()
        .zip(row)
        .filter(|(_, cell)| cell.status() != TaskStatus::Skipped)
        .map(|(id, _)| catalog.target_sec(id))
        .fold(0, u64::saturating_add)
}

pub fn session_target(catalog: &TaskCatalog, chain: &Chain, matrix: &ResultMatrix) -> u64 {
    (0..matrix.rounds())
        .map(|r| round_target(catalog, chain, matrix, r))
        .fold(0, u64::saturating_add)
}

/// Sum of recorded actual seconds in `round`. Skipped cells add zero.
pub fn round_elapsed_actual(matrix: &ResultMatrix, round: usize) -> u64 {
    matrix
        .row(round)
        .map(|row| row.iter().filter_map(|c| c.actual_sec()).fold(0, u64::saturating_add))
        .unwrap_or(0)
}

impl SessionState {
    /// Elapsed seconds of the current task. Zero once the session is complete.
    pub fn elapsed_secs(&self, now_ms: u64) -> u64 {
        if self.complete {
            0
        } else {
            self.clock.elapsed_secs(now_ms)
        }
    }

    /// Current task's target plus any rollover it received.
    pub fn effective_target_secs(&self) -> u64 {
        self.target_at(self.position.slot)
            .saturating_add(self.rollover_offset_secs)
    }

    pub fn remaining_for_current_task(&self, now_ms: u64) -> u64 {
        if self.complete {
            return 0;
        }
        self.effective_target_secs()
            .saturating_sub(self.elapsed_secs(now_ms))
    }

    pub fn remaining_for_round(&self, now_ms: u64) -> u64 {
        let round = self.position.round;
        let spent = self
            .actual_excluding_current(round)
            .saturating_add(self.elapsed_secs(now_ms));
        self.round_target(round).saturating_sub(spent)
    }

    pub fn remaining_for_session(&self, now_ms: u64) -> u64 {
        let spent = (0..self.matrix.rounds())
            .map(|r| self.actual_excluding_current(r))
            .fold(0, u64::saturating_add)
            .saturating_add(self.elapsed_secs(now_ms));
        self.session_target().saturating_sub(spent)
    }

    pub fn is_overtime(&self, now_ms: u64) -> bool {
        self.overtime_secs(now_ms) > 0
    }

    /// Seconds past the effective target, zero when within it.
    pub fn overtime_secs(&self, now_ms: u64) -> u64 {
        self.elapsed_secs(now_ms)
            .saturating_sub(self.effective_target_secs())
    }

    pub fn round_target(&self, round: usize) -> u64 {
        round_target(&self.catalog, &self.chain, &self.matrix, round)
    }

    pub fn session_target(&self) -> u64 {
        session_target(&self.catalog, &self.chain, &self.matrix)
    }

    pub fn round_elapsed_actual(&self, round: usize) -> u64 {
        round_elapsed_actual(&self.matrix, round)
    }

    /// Actuals of `round`, without the cell under the live clock. Once the
    /// session is complete the clock is gone and every cell counts.
    fn actual_excluding_current(&self, round: usize) -> u64 {
        let Some(row) = self.matrix.row(round) else {
            return 0;
        };
        row.iter()
            .enumerate()
            .filter(|(slot, _)| {
                self.complete || round != self.position.round || *slot != self.position.slot
            })
            .filter_map(|(_, c)| c.actual_sec())
            .fold(0, u64::saturating_add)
    }
}
