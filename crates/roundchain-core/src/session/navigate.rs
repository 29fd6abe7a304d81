//! Navigation commands: run state, completion and position changes.

use tracing::{debug, info};

use super::{Position, RunState, SessionState};
use crate::events::{timestamp, Event};
use crate::matrix::TaskResult;

impl SessionState {
    /// Start or resume timing. No-op while running or after completion.
    pub fn start(&mut self, now_ms: u64) -> Vec<Event> {
        if self.complete || self.run_state == RunState::Running {
            return Vec::new();
        }
        self.clock.start(now_ms);
        self.run_state = RunState::Running;
        debug!(round = self.position.round, slot = self.position.slot, "timer started");
        vec![Event::Started {
            round: self.position.round,
            slot: self.position.slot,
            at: timestamp(now_ms),
        }]
    }

    /// Freeze elapsed time. No-op unless running.
    pub fn pause(&mut self, now_ms: u64) -> Vec<Event> {
        if self.run_state != RunState::Running {
            return Vec::new();
        }
        self.clock.pause(now_ms);
        self.run_state = RunState::Paused;
        vec![Event::Paused {
            elapsed_secs: self.clock.elapsed_secs(now_ms),
            at: timestamp(now_ms),
        }]
    }

    /// Clear the current cell and time the current task again from zero.
    pub fn restart_current(&mut self, now_ms: u64) -> Vec<Event> {
        if self.complete {
            return Vec::new();
        }
        let Position { round, slot } = self.position;
        self.matrix.set(round, slot, TaskResult::INCOMPLETE);
        self.clock.restart(now_ms);
        self.run_state = RunState::Running;
        self.auto_latch = false;
        self.has_rung = false;
        debug!(round, slot, "task restarted");
        vec![Event::TaskRestarted {
            round,
            slot,
            at: timestamp(now_ms),
        }]
    }

    /// Record a completion for the current cell, classified against the
    /// current task's target. Does not move or touch the run state.
    pub fn complete(&mut self, actual_sec: u64, now_ms: u64) -> Vec<Event> {
        let Position { round, slot } = self.position;
        let result = TaskResult::completed(actual_sec, self.target_at(slot));
        self.matrix.set(round, slot, result);
        debug!(round, slot, actual_sec, status = ?result.status(), "task completed");
        vec![Event::TaskCompleted {
            round,
            slot,
            status: result.status(),
            actual_secs: actual_sec,
            at: timestamp(now_ms),
        }]
    }

    /// Finish the current task with the elapsed time and move forward.
    ///
    /// With rollover enabled, unused time moves to the next slot of the same
    /// round. It never crosses into the next round.
    pub fn next(&mut self, now_ms: u64) -> Vec<Event> {
        if self.complete {
            return Vec::new();
        }
        let elapsed = self.clock.elapsed_secs(now_ms);
        let remaining = self.remaining_for_current_task(now_ms);
        let rollover = if self.policy.rollover && remaining > 0 && !self.is_last_slot() {
            remaining
        } else {
            0
        };

        let mut events = self.complete(elapsed, now_ms);
        events.extend(self.advance(rollover, now_ms));
        events
    }

    /// Mark the current cell skipped and move forward. Skipped tasks never
    /// donate time.
    pub fn skip(&mut self, now_ms: u64) -> Vec<Event> {
        if self.complete {
            return Vec::new();
        }
        let Position { round, slot } = self.position;
        self.matrix.set(round, slot, TaskResult::SKIPPED);
        debug!(round, slot, "task skipped");

        let mut events = vec![Event::TaskSkipped {
            round,
            slot,
            at: timestamp(now_ms),
        }];
        events.extend(self.advance(0, now_ms));
        events
    }

    /// Step back one slot, undoing its result. At the very first slot the
    /// task restarts in place.
    pub fn previous(&mut self, now_ms: u64) -> Vec<Event> {
        if self.complete {
            return Vec::new();
        }
        let Position { round, slot } = self.position;
        let target = if slot > 0 {
            Position::new(round, slot - 1)
        } else if round > 0 {
            Position::new(round - 1, self.chain.last_index())
        } else {
            self.position
        };

        self.matrix.set(round, slot, TaskResult::INCOMPLETE);
        self.matrix.set(target.round, target.slot, TaskResult::INCOMPLETE);
        self.enter(target, 0, now_ms);
        debug!(round = target.round, slot = target.slot, "stepped back");

        vec![Event::SteppedBack {
            round: target.round,
            slot: target.slot,
            at: timestamp(now_ms),
        }]
    }

    /// Per-poll check. Fires the time-up alert once per entry and, with
    /// auto-continue enabled, finishes the task exactly at target and moves
    /// on, at most once per position.
    pub fn tick(&mut self, now_ms: u64) -> Vec<Event> {
        if self.complete
            || self.run_state != RunState::Running
            || self.remaining_for_current_task(now_ms) > 0
        {
            return Vec::new();
        }

        let Position { round, slot } = self.position;
        let mut events = Vec::new();
        if !self.has_rung {
            self.has_rung = true;
            events.push(Event::TimeUp {
                round,
                slot,
                at: timestamp(now_ms),
            });
        }

        if self.policy.auto_continue && !self.auto_latch {
            self.auto_latch = true;
            let target = self.target_at(slot);
            let result = TaskResult::completed_at(target);
            self.matrix.set(round, slot, result);
            debug!(round, slot, "auto-continue");
            events.push(Event::AutoContinued {
                round,
                slot,
                at: timestamp(now_ms),
            });
            events.push(Event::TaskCompleted {
                round,
                slot,
                status: result.status(),
                actual_secs: target,
                at: timestamp(now_ms),
            });
            events.extend(self.advance(0, now_ms));
        }
        events
    }

    /// Forward step shared by next, skip and auto-continue. The current cell
    /// has already been written.
    fn advance(&mut self, rollover: u64, now_ms: u64) -> Vec<Event> {
        let Position { round, slot } = self.position;
        let mut events = Vec::new();

        if !self.is_last_slot() {
            events.extend(self.enter(Position::new(round, slot + 1), rollover, now_ms));
        } else if !self.is_last_round() {
            info!(round, "round completed");
            events.push(Event::RoundCompleted {
                round,
                at: timestamp(now_ms),
            });
            events.extend(self.enter(Position::new(round + 1, 0), 0, now_ms));
        } else {
            self.run_state = RunState::Idle;
            self.complete = true;
            self.clock.clear();
            self.rollover_offset_secs = 0;
            self.auto_latch = false;
            self.has_rung = false;
            info!(rounds = self.matrix.rounds(), "session completed");
            events.push(Event::SessionCompleted {
                at: timestamp(now_ms),
            });
        }
        events
    }

    /// Make `position` current with a fresh running clock.
    pub(super) fn enter(&mut self, position: Position, rollover: u64, now_ms: u64) -> Vec<Event> {
        self.position = position;
        self.rollover_offset_secs = rollover;
        self.clock.restart(now_ms);
        self.run_state = RunState::Running;
        self.auto_latch = false;
        self.has_rung = false;

        let mut events = vec![Event::TaskEntered {
            round: position.round,
            slot: position.slot,
            rollover_secs: rollover,
            at: timestamp(now_ms),
        }];
        if rollover > 0 {
            debug!(secs = rollover, "rollover applied");
            events.push(Event::RolloverApplied {
                secs: rollover,
                at: timestamp(now_ms),
            });
        }
        events
    }
}
