//! Chain, catalog and round edits.
//!
//! Each edit changes the chain and the result matrix together inside one
//! `&mut self` call. Cells are addressed by slot index, so a length change
//! pads or truncates at the end of every row.

use tracing::{info, warn};

use super::{check_chain, Position, RunState, SessionState};
use crate::catalog::{Chain, Task, TaskId};
use crate::error::Result;
use crate::events::{timestamp, Event};
use crate::matrix::ResultMatrix;
use crate::template::SessionTemplate;

impl SessionState {
    /// Create a task and append a slot for it. `None` when the chain is full.
    pub fn add_task(&mut self, name: impl Into<String>, target_sec: u64) -> Option<TaskId> {
        if self.chain.is_full() {
            warn!(len = self.chain.len(), "chain is full, task not added");
            return None;
        }
        let task = Task::new(name, target_sec);
        let id = task.id.clone();
        self.catalog.upsert(task);
        self.add_slot(&id).then_some(id)
    }

    /// Append another slot for a task already in the catalog.
    pub fn add_slot(&mut self, id: &TaskId) -> bool {
        if !self.catalog.contains(id) || !self.chain.push(id.clone()) {
            warn!(task = %id, "slot not added");
            return false;
        }
        self.matrix.resize_rows(self.chain.len());
        true
    }

    /// Remove a slot. The only remaining slot cannot be removed.
    ///
    /// The task is dropped from the catalog once no slot references it.
    pub fn remove_slot(&mut self, slot: usize, now_ms: u64) -> bool {
        let Some(id) = self.chain.remove(slot) else {
            warn!(slot, len = self.chain.len(), "slot not removed");
            return false;
        };
        if !self.chain.contains(&id) {
            self.catalog.remove(&id);
        }
        self.matrix.resize_rows(self.chain.len());
        self.reclamp(now_ms);
        true
    }

    /// Reorder slots. Cells stay at their indices.
    pub fn move_slot(&mut self, from: usize, to: usize) -> bool {
        self.chain.move_slot(from, to)
    }

    /// Rename and/or retime a task. Identity is unchanged.
    pub fn edit_task(&mut self, id: &TaskId, name: Option<String>, target_sec: Option<u64>) -> bool {
        let Some(task) = self.catalog.get_mut(id) else {
            return false;
        };
        if let Some(name) = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
            task.name = name;
        }
        if let Some(target) = target_sec {
            task.target_sec = target;
        }
        true
    }

    /// Edit the task under the current position. A blank name keeps the old one.
    pub fn edit_current(&mut self, name: impl Into<String>, target_sec: u64) -> bool {
        let id = self.current_task_id().clone();
        self.edit_task(&id, Some(name.into()), Some(target_sec))
    }

    /// Grow or shrink the number of rounds, clamped to `1..=25`.
    pub fn set_rounds(&mut self, rounds: usize, now_ms: u64) -> usize {
        let applied = self.matrix.set_rounds(rounds);
        if applied != rounds {
            warn!(requested = rounds, applied, "round count clamped");
        }
        if self.complete && self.position.round + 1 < applied {
            // New rounds reopen a finished session at its next round.
            self.complete = false;
            self.enter(Position::new(self.position.round + 1, 0), 0, now_ms);
            self.pause(now_ms);
        }
        self.reclamp(now_ms);
        applied
    }

    /// Clear all results and return to `(0, 0)`, idle.
    pub fn restart_session(&mut self, now_ms: u64) -> Vec<Event> {
        self.matrix.clear();
        self.reset_run(now_ms)
    }

    /// Replace the chain with a template's and restart.
    ///
    /// Template tasks are merged into the catalog by id; catalog entries no
    /// longer referenced by any slot are dropped.
    ///
    /// # Errors
    /// Fails, leaving the session untouched, if the template chain is empty
    /// or names a task neither the template nor the catalog knows.
    pub fn load_template(&mut self, template: &SessionTemplate, now_ms: u64) -> Result<Vec<Event>> {
        let mut catalog = self.catalog.clone();
        for task in &template.tasks {
            catalog.upsert(task.clone());
        }
        let chain = Chain::new(template.chain.clone());
        check_chain(&catalog, &chain)?;

        let unused: Vec<TaskId> = catalog
            .iter()
            .filter(|t| !chain.contains(&t.id))
            .map(|t| t.id.clone())
            .collect();
        for id in unused {
            catalog.remove(&id);
        }

        self.catalog = catalog;
        self.chain = chain;
        self.matrix = ResultMatrix::new(template.rounds_count, self.chain.len());
        info!(name = %template.name, slots = self.chain.len(), rounds = self.matrix.rounds(), "template loaded");

        let mut events = self.reset_run(now_ms);
        events.push(Event::TemplateLoaded {
            name: template.name.clone(),
            at: timestamp(now_ms),
        });
        Ok(events)
    }

    /// Capture the chain, its tasks and the round count as a template.
    pub fn to_template(&self, name: impl Into<String>, now_ms: u64) -> SessionTemplate {
        let mut tasks: Vec<Task> = Vec::new();
        for id in &self.chain {
            if tasks.iter().any(|t| &t.id == id) {
                continue;
            }
            if let Some(task) = self.catalog.get(id) {
                tasks.push(task.clone());
            }
        }
        SessionTemplate::new(
            name,
            tasks,
            self.chain.iter().cloned().collect(),
            self.matrix.rounds(),
            timestamp(now_ms),
        )
    }

    fn reset_run(&mut self, now_ms: u64) -> Vec<Event> {
        self.position = Position::default();
        self.run_state = RunState::Idle;
        self.clock.clear();
        self.rollover_offset_secs = 0;
        self.auto_latch = false;
        self.has_rung = false;
        self.complete = false;
        vec![Event::SessionReset {
            at: timestamp(now_ms),
        }]
    }

    /// Pull the position back into range after a shrink. Landing on a
    /// different cell starts that cell from zero.
    fn reclamp(&mut self, now_ms: u64) {
        let clamped = self.position.clamped(self.matrix.rounds(), self.chain.len());
        if clamped == self.position {
            return;
        }
        self.position = clamped;
        self.rollover_offset_secs = 0;
        self.auto_latch = false;
        self.has_rung = false;
        self.clock.reset(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MAX_CHAIN_LEN;
    use crate::matrix::{TaskResult, TaskStatus, MAX_ROUNDS};
    use crate::session::Policy;

    const T0: u64 = 1_700_000_000_000;

    fn secs(s: u64) -> u64 {
        T0 + s * 1000
    }

    fn abc(rounds: usize) -> SessionState {
        SessionState::from_tasks(
            vec![
                Task::with_id("a", "A", 60),
                Task::with_id("b", "B", 120),
                Task::with_id("c", "C", 180),
            ],
            rounds,
            Policy::default(),
        )
        .unwrap()
    }

    #[test]
    fn add_task_pads_every_row() {
        let mut s = abc(2);
        s.skip(T0);
        let id = s.add_task("D", 30).unwrap();
        assert_eq!(s.chain().len(), 4);
        assert_eq!(s.chain().get(3), Some(&id));
        for row in s.matrix().rows() {
            assert_eq!(row.len(), 4);
            assert_eq!(row[3], TaskResult::INCOMPLETE);
        }
        assert_eq!(s.matrix().cell(0, 0), Some(TaskResult::SKIPPED));
    }

    #[test]
    fn add_task_clamps_at_max_len() {
        let mut s = abc(1);
        while s.chain().len() < MAX_CHAIN_LEN {
            assert!(s.add_task("x", 1).is_some());
        }
        let catalog_len = s.catalog().len();
        assert!(s.add_task("overflow", 1).is_none());
        assert_eq!(s.chain().len(), MAX_CHAIN_LEN);
        assert_eq!(s.catalog().len(), catalog_len);
        assert_eq!(s.matrix().row_len(), MAX_CHAIN_LEN);
    }

    #[test]
    fn add_slot_requires_known_task() {
        let mut s = abc(1);
        assert!(!s.add_slot(&TaskId::from("ghost")));
        assert!(s.add_slot(&TaskId::from("a")));
        assert_eq!(s.chain().len(), 4);
        assert_eq!(s.round_target(0), 60 + 120 + 180 + 60);
    }

    #[test]
    fn remove_last_slot_is_rejected() {
        let mut s = SessionState::from_tasks(vec![Task::with_id("a", "A", 60)], 1, Policy::default())
            .unwrap();
        assert!(!s.remove_slot(0, T0));
        assert_eq!(s.chain().len(), 1);
        assert_eq!(s.matrix().row_len(), 1);
    }

    #[test]
    fn remove_slot_truncates_rows_and_clamps_position() {
        let mut s = abc(2);
        s.start(T0);
        s.next(secs(10));
        s.next(secs(20));
        assert_eq!(s.position(), Position::new(0, 2));

        assert!(s.remove_slot(2, secs(30)));
        assert_eq!(s.chain().len(), 2);
        assert!(!s.catalog().contains(&TaskId::from("c")));
        assert_eq!(s.position(), Position::new(0, 1));
        for row in s.matrix().rows() {
            assert_eq!(row.len(), 2);
        }
        // Landing on another cell restarts its clock.
        assert_eq!(s.elapsed_secs(secs(31)), 1);
    }

    #[test]
    fn remove_slot_keeps_task_still_referenced() {
        let mut s = abc(1);
        s.add_slot(&TaskId::from("a"));
        assert!(s.remove_slot(0, T0));
        assert!(s.catalog().contains(&TaskId::from("a")));
    }

    #[test]
    fn move_slot_keeps_row_length() {
        let mut s = abc(1);
        assert!(s.move_slot(2, 0));
        assert_eq!(s.chain().get(0), Some(&TaskId::from("c")));
        assert_eq!(s.matrix().row_len(), 3);
    }

    #[test]
    fn edit_current_renames_and_retimes() {
        let mut s = abc(1);
        assert!(s.edit_current("Warmup", 90));
        let task = s.current_task().unwrap();
        assert_eq!(task.name, "Warmup");
        assert_eq!(task.target_sec, 90);
        assert_eq!(task.id, TaskId::from("a"));

        assert!(s.edit_current("   ", 45));
        assert_eq!(s.current_task().unwrap().name, "Warmup");
        assert_eq!(s.current_task().unwrap().target_sec, 45);
    }

    #[test]
    fn set_rounds_grows_and_shrinks() {
        let mut s = abc(1);
        s.skip(T0);
        assert_eq!(s.set_rounds(3, T0), 3);
        assert_eq!(s.matrix().cell(0, 0), Some(TaskResult::SKIPPED));
        assert_eq!(s.matrix().row(2).unwrap().len(), 3);
        assert_eq!(s.set_rounds(99, T0), MAX_ROUNDS);
        assert_eq!(s.set_rounds(0, T0), 1);
    }

    #[test]
    fn set_rounds_reopens_completed_session() {
        let mut s = abc(1);
        s.start(T0);
        for i in 1..=3 {
            s.next(secs(i * 10));
        }
        assert!(s.is_complete());
        s.set_rounds(2, secs(40));
        assert!(!s.is_complete());
        assert_eq!(s.position(), Position::new(1, 0));
        assert_eq!(s.run_state(), RunState::Paused);
    }

    #[test]
    fn shrinking_rounds_clamps_position() {
        let mut s = abc(3);
        s.start(T0);
        for i in 1..=6 {
            s.next(secs(i * 10));
        }
        assert_eq!(s.position(), Position::new(2, 0));
        s.set_rounds(1, secs(70));
        assert_eq!(s.position(), Position::new(0, 0));
    }

    #[test]
    fn restart_session_clears_everything() {
        let mut s = abc(2);
        s.start(T0);
        s.next(secs(10));
        s.skip(secs(20));
        s.restart_session(secs(30));
        assert_eq!(s.position(), Position::new(0, 0));
        assert_eq!(s.run_state(), RunState::Idle);
        assert!(s
            .matrix()
            .rows()
            .all(|row| row.iter().all(|c| c.status() == TaskStatus::Incomplete)));
        assert_eq!(s.elapsed_secs(secs(40)), 0);
    }

    #[test]
    fn load_template_replaces_chain_and_resets() {
        let mut s = abc(1);
        s.start(T0);
        s.next(secs(10));

        let tpl = SessionTemplate::new(
            "pair",
            vec![Task::with_id("x", "X", 10), Task::with_id("a", "A renamed", 70)],
            vec![TaskId::from("x"), TaskId::from("a")],
            4,
            chrono::Utc::now(),
        );
        let events = s.load_template(&tpl, secs(20)).unwrap();
        assert!(events.iter().any(|e| matches!(e, Event::TemplateLoaded { .. })));
        assert_eq!(s.chain().len(), 2);
        assert_eq!(s.rounds(), 4);
        assert_eq!(s.matrix().row_len(), 2);
        assert_eq!(s.position(), Position::new(0, 0));
        assert_eq!(s.run_state(), RunState::Idle);
        assert_eq!(s.catalog().get(&TaskId::from("a")).unwrap().name, "A renamed");
        assert!(!s.catalog().contains(&TaskId::from("b")));
    }

    #[test]
    fn load_template_rejects_empty_chain_without_changes() {
        let mut s = abc(1);
        let before = s.clone();
        let tpl = SessionTemplate::new("empty", vec![], vec![], 1, chrono::Utc::now());
        assert!(s.load_template(&tpl, T0).is_err());
        assert_eq!(s, before);
    }

    #[test]
    fn to_template_lists_each_task_once() {
        let mut s = abc(2);
        s.add_slot(&TaskId::from("a"));
        let tpl = s.to_template("mine", T0);
        assert_eq!(tpl.tasks.len(), 3);
        assert_eq!(tpl.chain.len(), 4);
        assert_eq!(tpl.rounds_count, 2);

        let mut other = SessionState::default();
        other.load_template(&tpl, T0).unwrap();
        assert_eq!(other.chain(), s.chain());
        assert_eq!(other.session_target(), s.session_target());
    }
}
