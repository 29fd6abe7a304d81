//! # Roundchain Core Library
//!
//! Core logic for Roundchain, a timer that runs a chain of named tasks over
//! a number of rounds. The CLI binary is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Session engine**: a wall-clock-based state machine over a rounds x
//!   slots result matrix. The caller polls `tick()`; the engine never runs
//!   timers of its own
//! - **Catalog / Chain**: task definitions and their run order
//! - **Aggregates**: round and session targets, remaining time, overtime
//! - **Storage**: SQLite for session state and templates, TOML for config
//!
//! ## Key Components
//!
//! - [`Session`]: engine bound to a time source
//! - [`SessionState`]: the serializable engine context
//! - [`SessionTemplate`]: portable chain + rounds description
//! - [`Database`], [`Config`]: persistence

pub mod catalog;
pub mod error;
pub mod events;
pub mod format;
pub mod matrix;
pub mod session;
pub mod storage;
pub mod template;
pub mod timer;

pub use catalog::{Chain, Task, TaskCatalog, TaskId, MAX_CHAIN_LEN};
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use events::Event;
pub use format::{format_secs, parse_secs};
pub use matrix::{ResultMatrix, TaskResult, TaskStatus, MAX_ROUNDS};
pub use session::{Policy, Position, RunState, Session, SessionSnapshot, SessionState, SlotView};
pub use storage::{Config, Database};
pub use template::SessionTemplate;
pub use timer::{Clock, DisplayColor, ManualClock, TimeSource, WallClock};
