pub mod config;
pub mod fmt;
pub mod session;
pub mod task;
pub mod template;

use roundchain_core::{Config, Database, Event, Session, SessionState, WallClock};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Stored session, or a fresh one built from config defaults.
pub fn load_session(db: &Database) -> Result<Session<WallClock>, Box<dyn std::error::Error>> {
    let state = match db.load_session()? {
        Some(state) => state,
        None => {
            let config = Config::load_or_default();
            let mut state = SessionState::default();
            state.set_policy(config.policy());
            let rounds = config.session.default_rounds as usize;
            state.set_rounds(rounds, 0);
            state
        }
    };
    Ok(Session::with_wall_clock(state))
}

pub fn save_session(db: &Database, session: &Session<WallClock>) -> CmdResult {
    db.save_session(session.state())?;
    Ok(())
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Events followed by the resulting snapshot, as one JSON object.
pub fn print_outcome(events: &[Event], session: &Session<WallClock>) -> CmdResult {
    print_json(&serde_json::json!({
        "events": events,
        "snapshot": session.snapshot(),
    }))
}
