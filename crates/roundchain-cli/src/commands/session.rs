//! Session timer commands.
//!
//! Every invocation loads the stored session, applies one command against
//! the wall clock and stores the result. `watch` is the long-running host
//! loop that polls the engine; it reloads the stored session before every
//! poll so commands issued from another shell are picked up, and writes
//! back only when a poll changed something.

use clap::Subcommand;
use roundchain_core::{format_secs, Config, Database, Policy, Session, WallClock};
use std::time::{Duration, Instant};
use tracing::info;

use super::{load_session, print_json, print_outcome, save_session, CmdResult};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Print the current snapshot as JSON
    Status,
    /// Start or resume the timer
    Start,
    /// Pause the timer
    Pause,
    /// Restart the current task from zero
    Restart,
    /// Finish the current task and move on
    Next,
    /// Skip the current task
    Skip,
    /// Go back one task, undoing its result
    Previous,
    /// Run one poll (time-up alert, auto-continue)
    Tick,
    /// Poll continuously until the session completes
    Watch {
        /// Stop after this many seconds
        #[arg(long = "for")]
        for_secs: Option<u64>,
        /// Override the polling interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Clear all results and return to the first task
    Reset,
    /// Discard the stored session; the next command starts from config defaults
    Clear,
    /// Set the number of rounds (1-25)
    Rounds { count: usize },
    /// Show or change navigation policies
    Policy {
        #[arg(long)]
        auto_continue: Option<bool>,
        #[arg(long)]
        rollover: Option<bool>,
    },
}

pub fn run(action: SessionAction) -> CmdResult {
    let db = Database::open()?;
    let mut session = load_session(&db)?;

    match action {
        SessionAction::Status => {
            print_json(&session.snapshot())?;
            return Ok(());
        }
        SessionAction::Start => {
            let events = session.start();
            print_outcome(&events, &session)?;
        }
        SessionAction::Pause => {
            let events = session.pause();
            print_outcome(&events, &session)?;
        }
        SessionAction::Restart => {
            let events = session.restart_current();
            print_outcome(&events, &session)?;
        }
        SessionAction::Next => {
            let events = session.next();
            print_outcome(&events, &session)?;
        }
        SessionAction::Skip => {
            let events = session.skip();
            print_outcome(&events, &session)?;
        }
        SessionAction::Previous => {
            let events = session.previous();
            print_outcome(&events, &session)?;
        }
        SessionAction::Tick => {
            let events = session.tick();
            print_outcome(&events, &session)?;
        }
        SessionAction::Watch {
            for_secs,
            interval_ms,
        } => return watch(&db, for_secs, interval_ms),
        SessionAction::Clear => {
            db.clear_session()?;
            info!("stored session cleared");
            println!("ok");
            return Ok(());
        }
        SessionAction::Reset => {
            let events = session.restart_session();
            print_outcome(&events, &session)?;
        }
        SessionAction::Rounds { count } => {
            let applied = session.set_rounds(count);
            print_json(&serde_json::json!({ "rounds": applied }))?;
        }
        SessionAction::Policy {
            auto_continue,
            rollover,
        } => {
            let current = session.state().policy();
            let policy = Policy {
                auto_continue: auto_continue.unwrap_or(current.auto_continue),
                rollover: rollover.unwrap_or(current.rollover),
            };
            session.set_policy(policy);
            print_json(&policy)?;
        }
    }

    save_session(&db, &session)?;
    Ok(())
}

fn watch(db: &Database, for_secs: Option<u64>, interval_ms: Option<u64>) -> CmdResult {
    let interval = interval_ms
        .unwrap_or_else(|| Config::load_or_default().session.tick_interval_ms)
        .max(1);
    let deadline = for_secs.map(|s| Instant::now() + Duration::from_secs(s));
    info!(interval_ms = interval, "watch loop started");

    let mut last_line = String::new();
    loop {
        let mut session = load_session(db)?;
        let events = session.tick();
        if !events.is_empty() {
            for event in &events {
                println!("{}", serde_json::to_string(event)?);
            }
            save_session(db, &session)?;
        }

        let line = status_line(&session);
        if line != last_line {
            eprintln!("{line}");
            last_line = line;
        }

        let done = session.state().is_complete()
            || deadline.is_some_and(|d| Instant::now() >= d);
        if done {
            return Ok(());
        }
        std::thread::sleep(Duration::from_millis(interval));
    }
}

fn status_line(session: &Session<WallClock>) -> String {
    let snap = session.snapshot();
    let clock = if snap.overtime {
        format!("+{}", format_secs(snap.overtime_secs))
    } else {
        format_secs(snap.remaining_task_secs)
    };
    format!(
        "round {}/{} task {}/{} {} {} (round {}, session {}){}",
        snap.position.round + 1,
        snap.rounds,
        snap.position.slot + 1,
        snap.chain_len,
        snap.task_name,
        clock,
        format_secs(snap.remaining_round_secs),
        format_secs(snap.remaining_session_secs),
        if snap.complete { " done" } else { "" },
    )
}
