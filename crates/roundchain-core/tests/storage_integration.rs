//! Integration tests for on-disk session and template storage.

use roundchain_core::{
    Database, ManualClock, Policy, Position, Session, SessionState, SessionTemplate, Task, TaskId,
};
use tempfile::TempDir;

const T0: u64 = 1_700_000_000_000;

#[test]
fn session_resumes_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("roundchain.db");
    let clock = ManualClock::new(T0);

    {
        let db = Database::open_at(&path).unwrap();
        let state = SessionState::from_tasks(
            vec![Task::with_id("a", "A", 120), Task::with_id("b", "B", 60)],
            2,
            Policy::default(),
        )
        .unwrap();
        let mut session = Session::new(state, clock.clone());
        session.start();
        clock.advance_secs(45);
        session.next();
        clock.advance_secs(15);
        db.save_session(session.state()).unwrap();
    }

    // Time keeps passing while nothing is loaded.
    clock.advance_secs(5);

    let db = Database::open_at(&path).unwrap();
    let state = db.load_session().unwrap().unwrap();
    let session = Session::restore(state, clock.clone()).unwrap();
    assert_eq!(session.state().position(), Position::new(0, 1));
    assert_eq!(session.elapsed_secs(), 20);
    assert_eq!(session.state().matrix().cell(0, 0).unwrap().actual_sec(), Some(45));
}

#[test]
fn saved_template_loads_into_a_live_session() {
    let dir = TempDir::new().unwrap();
    let db = Database::open_at(&dir.path().join("roundchain.db")).unwrap();

    let template = SessionTemplate::new(
        "Intervals",
        vec![Task::with_id("run", "Run", 90), Task::with_id("walk", "Walk", 30)],
        vec![TaskId::from("run"), TaskId::from("walk")],
        5,
        chrono::Utc::now(),
    );
    db.save_template(&template).unwrap();

    let loaded = db.get_template("Intervals").unwrap().unwrap();
    let mut session = Session::new(SessionState::default(), ManualClock::new(T0));
    session.start();
    session.load_template(&loaded).unwrap();

    assert_eq!(session.state().rounds(), 5);
    assert_eq!(session.state().chain().len(), 2);
    assert_eq!(session.session_target(), 5 * 120);
    assert_eq!(session.state().catalog().len(), 2);
}

#[test]
fn template_with_dangling_chain_is_rejected() {
    let template = SessionTemplate::new(
        "Broken",
        vec![Task::with_id("a", "A", 10)],
        vec![TaskId::from("a"), TaskId::from("missing")],
        1,
        chrono::Utc::now(),
    );
    let mut session = Session::new(SessionState::default(), ManualClock::new(T0));
    let before = session.state().clone();
    assert!(session.load_template(&template).is_err());
    assert_eq!(session.state(), &before);
}
