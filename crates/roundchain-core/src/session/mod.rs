//! Session timer engine.
//!
//! [`SessionState`] is the whole engine context: catalog, chain, result
//! matrix, position, run state, clock, rollover offset and latches. Every
//! command takes the current wall-clock reading explicitly, so the state is
//! a deterministic function of the commands applied and the times they were
//! applied at.
//!
//! [`Session`] owns a state plus a [`TimeSource`] and reads "now" for each
//! command. Hosts poll [`Session::tick`] on a short interval; the engine
//! never schedules anything itself.
//!
//! ## Navigation
//!
//! ```text
//! idle --start--> running --pause--> paused --start--> running
//! next / skip / auto-continue: (r, t) -> (r, t+1) -> (r+1, 0) -> complete (idle)
//! previous:                    (r, t) -> (r, t-1) -> (r-1, last) -> (0, 0) in place
//! ```

mod aggregate;
mod edit;
mod navigate;
mod snapshot;

pub use aggregate::{round_elapsed_actual, round_target, session_target};
pub use snapshot::{SessionSnapshot, SlotView};

use serde::{Deserialize, Serialize};

use crate::catalog::{Chain, Task, TaskCatalog, TaskId, MAX_CHAIN_LEN};
use crate::error::{CoreError, Result, ValidationError};
use crate::events::Event;
use crate::matrix::{ResultMatrix, TaskResult};
use crate::template::SessionTemplate;
use crate::timer::{Clock, TimeSource, WallClock};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Paused,
}

/// Current `(round, slot)` coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub round: usize,
    pub slot: usize,
}

impl Position {
    pub fn new(round: usize, slot: usize) -> Self {
        Self { round, slot }
    }

    /// Clamp into `[0, rounds-1] x [0, chain_len-1]`.
    pub fn clamped(self, rounds: usize, chain_len: usize) -> Self {
        Self {
            round: self.round.min(rounds.saturating_sub(1)),
            slot: self.slot.min(chain_len.saturating_sub(1)),
        }
    }
}

/// Navigation policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// Finish and advance automatically once remaining time hits zero.
    #[serde(default)]
    pub auto_continue: bool,
    /// Donate unused time of a finished task to the next task in the round.
    #[serde(default)]
    pub rollover: bool,
}

/// Complete engine context.
///
/// Deserializing goes through [`SessionState::validated`], so a stored or
/// hand-edited state can never hold a dangling chain or an out-of-range
/// position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredState")]
pub struct SessionState {
    catalog: TaskCatalog,
    chain: Chain,
    matrix: ResultMatrix,
    position: Position,
    run_state: RunState,
    clock: Clock,
    rollover_offset_secs: u64,
    auto_latch: bool,
    has_rung: bool,
    complete: bool,
    policy: Policy,
}

/// Wire shape of [`SessionState`] before validation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredState {
    catalog: TaskCatalog,
    chain: Chain,
    matrix: ResultMatrix,
    #[serde(default)]
    position: Position,
    #[serde(default)]
    run_state: RunState,
    #[serde(default)]
    clock: Clock,
    #[serde(default)]
    rollover_offset_secs: u64,
    #[serde(default)]
    auto_latch: bool,
    #[serde(default)]
    has_rung: bool,
    #[serde(default)]
    complete: bool,
    #[serde(default)]
    policy: Policy,
}

impl TryFrom<StoredState> for SessionState {
    type Error = CoreError;

    fn try_from(raw: StoredState) -> Result<Self> {
        Self {
            catalog: raw.catalog,
            chain: raw.chain,
            matrix: raw.matrix,
            position: raw.position,
            run_state: raw.run_state,
            clock: raw.clock,
            rollover_offset_secs: raw.rollover_offset_secs,
            auto_latch: raw.auto_latch,
            has_rung: raw.has_rung,
            complete: raw.complete,
            policy: raw.policy,
        }
        .validated()
    }
}

impl SessionState {
    /// Build a fresh, idle session.
    ///
    /// # Errors
    /// Returns a validation error if the chain is empty or references a task
    /// missing from the catalog.
    pub fn new(catalog: TaskCatalog, chain: Chain, rounds: usize, policy: Policy) -> Result<Self> {
        check_chain(&catalog, &chain)?;
        let matrix = ResultMatrix::new(rounds, chain.len());
        Ok(Self {
            catalog,
            chain,
            matrix,
            position: Position::default(),
            run_state: RunState::Idle,
            clock: Clock::default(),
            rollover_offset_secs: 0,
            auto_latch: false,
            has_rung: false,
            complete: false,
            policy,
        })
    }

    /// Session whose chain runs `tasks` in the given order.
    pub fn from_tasks(tasks: Vec<Task>, rounds: usize, policy: Policy) -> Result<Self> {
        let chain = Chain::new(tasks.iter().map(|t| t.id.clone()).collect());
        Self::new(tasks.into_iter().collect(), chain, rounds, policy)
    }

    /// Re-check a state that came from storage.
    ///
    /// Repairs what can be repaired silently (position range, cell pairing)
    /// and rejects what cannot (empty chain, dangling ids, ragged rows).
    pub fn validated(mut self) -> Result<Self> {
        check_chain(&self.catalog, &self.chain)?;
        self.matrix.validate(self.chain.len())?;
        if self.chain.len() > MAX_CHAIN_LEN {
            self.chain = Chain::new(self.chain.iter().cloned().collect());
            self.matrix.resize_rows(self.chain.len());
        }
        self.position = self.position.clamped(self.matrix.rounds(), self.chain.len());
        if self.run_state == RunState::Running && !self.clock.is_running() {
            self.run_state = RunState::Paused;
        }
        Ok(self)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn catalog(&self) -> &TaskCatalog {
        &self.catalog
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn matrix(&self) -> &ResultMatrix {
        &self.matrix
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn rounds(&self) -> usize {
        self.matrix.rounds()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Extra seconds donated to the current task by its predecessor.
    pub fn rollover_offset_secs(&self) -> u64 {
        self.rollover_offset_secs
    }

    pub fn current_task_id(&self) -> &TaskId {
        // Chain is never empty and position is always clamped into it.
        &self.chain.iter().as_slice()[self.position.slot]
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.catalog.get(self.current_task_id())
    }

    pub fn current_cell(&self) -> TaskResult {
        self.matrix
            .cell(self.position.round, self.position.slot)
            .unwrap_or_default()
    }

    pub fn set_policy(&mut self, policy: Policy) {
        self.policy = policy;
    }

    fn is_last_slot(&self) -> bool {
        self.position.slot >= self.chain.last_index()
    }

    fn is_last_round(&self) -> bool {
        self.position.round + 1 >= self.matrix.rounds()
    }

    fn target_at(&self, slot: usize) -> u64 {
        self.chain
            .get(slot)
            .map(|id| self.catalog.target_sec(id))
            .unwrap_or(0)
    }
}

impl Default for SessionState {
    /// One five-minute task, one round, no policies.
    fn default() -> Self {
        let task = Task::new("Task 1", 300);
        let chain = Chain::new(vec![task.id.clone()]);
        let catalog: TaskCatalog = std::iter::once(task).collect();
        let matrix = ResultMatrix::new(1, 1);
        Self {
            catalog,
            chain,
            matrix,
            position: Position::default(),
            run_state: RunState::Idle,
            clock: Clock::default(),
            rollover_offset_secs: 0,
            auto_latch: false,
            has_rung: false,
            complete: false,
            policy: Policy::default(),
        }
    }
}

fn check_chain(catalog: &TaskCatalog, chain: &Chain) -> Result<(), ValidationError> {
    if chain.is_empty() {
        return Err(ValidationError::EmptyChain);
    }
    if let Some((slot, id)) = chain.iter().enumerate().find(|(_, id)| !catalog.contains(id)) {
        return Err(ValidationError::UnknownTask {
            slot,
            task_id: id.to_string(),
        });
    }
    Ok(())
}

/// A session bound to a time source.
///
/// Thin owner over [`SessionState`]: each command reads the time source
/// once and forwards to the state.
#[derive(Debug, Clone)]
pub struct Session<S: TimeSource = WallClock> {
    state: SessionState,
    time: S,
}

impl Session<WallClock> {
    pub fn with_wall_clock(state: SessionState) -> Self {
        Self::new(state, WallClock)
    }
}

impl<S: TimeSource> Session<S> {
    pub fn new(state: SessionState, time: S) -> Self {
        Self { state, time }
    }

    /// Attach a time source to a stored state after validating it.
    pub fn restore(state: SessionState, time: S) -> Result<Self> {
        Ok(Self::new(state.validated()?, time))
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn now_ms(&self) -> u64 {
        self.time.now_ms()
    }

    // ── Navigation ───────────────────────────────────────────────────

    pub fn start(&mut self) -> Vec<Event> {
        let now = self.now_ms();
        self.state.start(now)
    }

    pub fn pause(&mut self) -> Vec<Event> {
        let now = self.now_ms();
        self.state.pause(now)
    }

    pub fn restart_current(&mut self) -> Vec<Event> {
        let now = self.now_ms();
        self.state.restart_current(now)
    }

    pub fn complete(&mut self, actual_sec: u64) -> Vec<Event> {
        let now = self.now_ms();
        self.state.complete(actual_sec, now)
    }

    pub fn next(&mut self) -> Vec<Event> {
        let now = self.now_ms();
        self.state.next(now)
    }

    pub fn skip(&mut self) -> Vec<Event> {
        let now = self.now_ms();
        self.state.skip(now)
    }

    pub fn previous(&mut self) -> Vec<Event> {
        let now = self.now_ms();
        self.state.previous(now)
    }

    pub fn tick(&mut self) -> Vec<Event> {
        let now = self.now_ms();
        self.state.tick(now)
    }

    // ── Editing ──────────────────────────────────────────────────────

    pub fn add_task(&mut self, name: impl Into<String>, target_sec: u64) -> Option<TaskId> {
        self.state.add_task(name, target_sec)
    }

    pub fn add_slot(&mut self, id: &TaskId) -> bool {
        self.state.add_slot(id)
    }

    pub fn remove_slot(&mut self, slot: usize) -> bool {
        let now = self.now_ms();
        self.state.remove_slot(slot, now)
    }

    pub fn move_slot(&mut self, from: usize, to: usize) -> bool {
        self.state.move_slot(from, to)
    }

    pub fn edit_task(&mut self, id: &TaskId, name: Option<String>, target_sec: Option<u64>) -> bool {
        self.state.edit_task(id, name, target_sec)
    }

    pub fn edit_current(&mut self, name: impl Into<String>, target_sec: u64) -> bool {
        self.state.edit_current(name, target_sec)
    }

    pub fn set_rounds(&mut self, rounds: usize) -> usize {
        let now = self.now_ms();
        self.state.set_rounds(rounds, now)
    }

    pub fn set_policy(&mut self, policy: Policy) {
        self.state.set_policy(policy);
    }

    pub fn restart_session(&mut self) -> Vec<Event> {
        let now = self.now_ms();
        self.state.restart_session(now)
    }

    pub fn load_template(&mut self, template: &SessionTemplate) -> Result<Vec<Event>> {
        let now = self.now_ms();
        self.state.load_template(template, now)
    }

    pub fn to_template(&self, name: impl Into<String>) -> SessionTemplate {
        self.state.to_template(name, self.now_ms())
    }

    // ── Aggregates ───────────────────────────────────────────────────

    pub fn elapsed_secs(&self) -> u64 {
        self.state.elapsed_secs(self.now_ms())
    }

    pub fn effective_target_secs(&self) -> u64 {
        self.state.effective_target_secs()
    }

    pub fn remaining_for_current_task(&self) -> u64 {
        self.state.remaining_for_current_task(self.now_ms())
    }

    pub fn remaining_for_round(&self) -> u64 {
        self.state.remaining_for_round(self.now_ms())
    }

    pub fn remaining_for_session(&self) -> u64 {
        self.state.remaining_for_session(self.now_ms())
    }

    pub fn is_overtime(&self) -> bool {
        self.state.is_overtime(self.now_ms())
    }

    pub fn overtime_secs(&self) -> u64 {
        self.state.overtime_secs(self.now_ms())
    }

    pub fn round_target(&self, round: usize) -> u64 {
        self.state.round_target(round)
    }

    pub fn session_target(&self) -> u64 {
        self.state.session_target()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot(self.now_ms())
    }
}
