use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Policy, Position, RunState, SessionState};
use crate::catalog::TaskId;
use crate::events::timestamp;
use crate::matrix::TaskStatus;
use crate::timer::{slot_color, DisplayColor, SlotActivity};

/// One cell as renderers see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotView {
    pub task_id: TaskId,
    pub name: String,
    pub target_secs: u64,
    pub status: TaskStatus,
    pub actual_secs: Option<u64>,
    pub color: DisplayColor,
}

/// Everything a host needs to draw one frame, computed from a single
/// wall-clock reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub position: Position,
    pub rounds: usize,
    pub chain_len: usize,
    pub run_state: RunState,
    pub complete: bool,
    pub policy: Policy,
    pub task_id: TaskId,
    pub task_name: String,
    pub target_secs: u64,
    pub rollover_secs: u64,
    pub effective_target_secs: u64,
    pub elapsed_secs: u64,
    pub remaining_task_secs: u64,
    pub remaining_round_secs: u64,
    pub remaining_session_secs: u64,
    pub overtime: bool,
    pub overtime_secs: u64,
    pub round_target_secs: u64,
    pub session_target_secs: u64,
    /// `grid[round][slot]`
    pub grid: Vec<Vec<SlotView>>,
    pub at: DateTime<Utc>,
}

impl SessionState {
    pub fn snapshot(&self, now_ms: u64) -> SessionSnapshot {
        let current = self.current_task();
        let overtime = self.is_overtime(now_ms);
        let active = !self.complete && self.run_state != RunState::Idle;

        let grid = self
            .matrix
            .rows()
            .enumerate()
            .map(|(round, row)| {
                self.chain
                    .iter()
                    .zip(row)
                    .enumerate()
                    .map(|(slot, (id, cell))| {
                        let task = self.catalog.get(id);
                        let activity = if active && self.position == Position::new(round, slot) {
                            if overtime {
                                SlotActivity::OverTarget
                            } else {
                                SlotActivity::UnderTarget
                            }
                        } else {
                            SlotActivity::Inactive
                        };
                        SlotView {
                            task_id: id.clone(),
                            name: task.map(|t| t.name.clone()).unwrap_or_default(),
                            target_secs: task.map(|t| t.target_sec).unwrap_or(0),
                            status: cell.status(),
                            actual_secs: cell.actual_sec(),
                            color: slot_color(cell.status(), activity),
                        }
                    })
                    .collect()
            })
            .collect();

        SessionSnapshot {
            position: self.position,
            rounds: self.matrix.rounds(),
            chain_len: self.chain.len(),
            run_state: self.run_state,
            complete: self.complete,
            policy: self.policy,
            task_id: self.current_task_id().clone(),
            task_name: current.map(|t| t.name.clone()).unwrap_or_default(),
            target_secs: current.map(|t| t.target_sec).unwrap_or(0),
            rollover_secs: self.rollover_offset_secs,
            effective_target_secs: self.effective_target_secs(),
            elapsed_secs: self.elapsed_secs(now_ms),
            remaining_task_secs: self.remaining_for_current_task(now_ms),
            remaining_round_secs: self.remaining_for_round(now_ms),
            remaining_session_secs: self.remaining_for_session(now_ms),
            overtime,
            overtime_secs: self.overtime_secs(now_ms),
            round_target_secs: self.round_target(self.position.round),
            session_target_secs: self.session_target(),
            grid,
            at: timestamp(now_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Task;

    const T0: u64 = 1_700_000_000_000;

    fn colors(snap: &SessionSnapshot, round: usize) -> Vec<DisplayColor> {
        snap.grid[round].iter().map(|v| v.color).collect()
    }

    #[test]
    fn colors_follow_progress() {
        let mut s = SessionState::from_tasks(
            vec![
                Task::with_id("a", "A", 10),
                Task::with_id("b", "B", 10),
                Task::with_id("c", "C", 10),
            ],
            1,
            Policy::default(),
        )
        .unwrap();

        let idle = s.snapshot(T0);
        assert_eq!(colors(&idle, 0), vec![DisplayColor::Gray; 3]);

        s.start(T0);
        s.next(T0 + 20_000); // over target
        let snap = s.snapshot(T0 + 25_000);
        assert_eq!(
            colors(&snap, 0),
            vec![DisplayColor::Orange, DisplayColor::Yellow, DisplayColor::Gray]
        );

        let late = s.snapshot(T0 + 40_000);
        assert_eq!(late.grid[0][1].color, DisplayColor::Red);
        assert!(late.overtime);
        assert_eq!(late.overtime_secs, 10);
        assert_eq!(late.remaining_task_secs, 0);
    }

    #[test]
    fn snapshot_serializes_for_hosts() {
        let s = SessionState::default();
        let json = serde_json::to_value(s.snapshot(T0)).unwrap();
        assert_eq!(json["run_state"], "idle");
        assert_eq!(json["task_name"], "Task 1");
        assert_eq!(json["grid"][0][0]["color"], "gray");
    }
}
