//! End-to-end session scenarios driven by a manual clock.

use roundchain_core::{
    Event, ManualClock, Policy, Position, RunState, Session, SessionState, Task, TaskId,
    TaskStatus,
};

const T0: u64 = 1_700_000_000_000;

fn session(tasks: Vec<Task>, rounds: usize, policy: Policy) -> (Session<ManualClock>, ManualClock) {
    let clock = ManualClock::new(T0);
    let state = SessionState::from_tasks(tasks, rounds, policy).unwrap();
    (Session::new(state, clock.clone()), clock)
}

fn a_b() -> Vec<Task> {
    vec![Task::with_id("a", "A", 180), Task::with_id("b", "B", 300)]
}

#[test]
fn rollover_extends_next_task_target() {
    let (mut s, clock) = session(a_b(), 1, Policy { rollover: true, auto_continue: false });
    s.start();
    clock.advance_secs(100);
    let events = s.next();

    assert_eq!(s.state().position(), Position::new(0, 1));
    assert_eq!(s.effective_target_secs(), 380);
    assert_eq!(s.remaining_for_current_task(), 380);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::RolloverApplied { secs: 80, .. })));

    // The donated time is the task's window, and goes away with it.
    clock.advance_secs(50);
    s.next();
    assert!(s.state().is_complete());
    assert_eq!(s.state().rollover_offset_secs(), 0);
}

#[test]
fn skip_in_one_round_leaves_the_other_alone() {
    let (mut s, _clock) = session(a_b(), 2, Policy::default());
    s.start();
    s.skip();
    assert_eq!(s.round_target(0), 300);
    assert_eq!(s.round_target(1), 480);
}

#[test]
fn completion_status_at_and_over() {
    let (mut s, clock) = session(a_b(), 1, Policy::default());
    s.start();
    clock.advance_secs(180);
    s.next();
    let cell = s.state().matrix().cell(0, 0).unwrap();
    assert_eq!(cell.status(), TaskStatus::CompleteAt);
    assert_eq!(cell.actual_sec(), Some(180));

    s.previous();
    clock.advance_secs(200);
    s.next();
    let cell = s.state().matrix().cell(0, 0).unwrap();
    assert_eq!(cell.status(), TaskStatus::CompleteOver);
    assert_eq!(cell.actual_sec(), Some(200));
}

#[test]
fn final_next_ends_the_session() {
    let (mut s, clock) = session(a_b(), 2, Policy::default());
    s.start();
    let mut seen_round_complete = 0;
    let mut seen_session_complete = 0;
    for _ in 0..4 {
        clock.advance_secs(30);
        for e in s.next() {
            match e {
                Event::RoundCompleted { .. } => seen_round_complete += 1,
                Event::SessionCompleted { .. } => seen_session_complete += 1,
                _ => {}
            }
        }
    }
    assert_eq!(seen_round_complete, 1);
    assert_eq!(seen_session_complete, 1);
    assert_eq!(s.state().run_state(), RunState::Idle);
    assert_eq!(s.state().position(), Position::new(1, 1));

    clock.advance_secs(30);
    assert!(s.next().is_empty());
    assert!(s.skip().is_empty());
    assert_eq!(s.state().position(), Position::new(1, 1));

    s.restart_session();
    assert_eq!(s.state().position(), Position::new(0, 0));
    assert!(!s.state().is_complete());
}

#[test]
fn auto_continue_walks_the_whole_chain() {
    let tasks = vec![
        Task::with_id("a", "A", 2),
        Task::with_id("b", "B", 3),
    ];
    let (mut s, clock) = session(tasks, 2, Policy { auto_continue: true, rollover: false });
    s.start();

    let mut auto = 0;
    // Poll every 50 ms, the way a host loop would.
    for _ in 0..400 {
        clock.advance_ms(50);
        auto += s
            .tick()
            .iter()
            .filter(|e| matches!(e, Event::AutoContinued { .. }))
            .count();
        if s.state().is_complete() {
            break;
        }
    }

    assert!(s.state().is_complete());
    assert_eq!(auto, 4);
    for row in s.state().matrix().rows() {
        assert!(row.iter().all(|c| c.status() == TaskStatus::CompleteAt));
    }
    assert_eq!(s.remaining_for_session(), 0);
}

#[test]
fn pause_survives_long_gaps() {
    let (mut s, clock) = session(a_b(), 1, Policy { auto_continue: true, rollover: false });
    s.start();
    clock.advance_secs(60);
    s.pause();
    clock.advance_secs(10_000);
    assert!(s.tick().is_empty());
    assert_eq!(s.elapsed_secs(), 60);
    s.start();
    clock.advance_secs(10);
    assert_eq!(s.elapsed_secs(), 70);
    assert_eq!(s.remaining_for_current_task(), 110);
}

#[test]
fn previous_forgets_consumed_rollover() {
    let (mut s, clock) = session(
        vec![
            Task::with_id("a", "A", 100),
            Task::with_id("b", "B", 100),
            Task::with_id("c", "C", 100),
        ],
        1,
        Policy { rollover: true, auto_continue: false },
    );
    s.start();
    clock.advance_secs(40);
    s.next(); // B gets 60
    clock.advance_secs(10);
    s.next(); // C gets 150
    assert_eq!(s.state().rollover_offset_secs(), 150);

    s.previous();
    assert_eq!(s.state().position(), Position::new(0, 1));
    assert_eq!(s.state().rollover_offset_secs(), 0);
    assert_eq!(s.effective_target_secs(), 100);
}

#[test]
fn chain_edits_keep_matrix_in_step() {
    let (mut s, _clock) = session(a_b(), 3, Policy::default());
    s.start();
    s.skip();

    let c = s.add_task("C", 60).unwrap();
    assert_eq!(s.state().matrix().row_len(), 3);
    assert!(s.add_slot(&TaskId::from("a")));
    assert_eq!(s.state().matrix().row_len(), 4);

    assert!(s.remove_slot(3));
    assert!(s.remove_slot(2));
    assert!(!s.state().catalog().contains(&c));
    for row in s.state().matrix().rows() {
        assert_eq!(row.len(), s.state().chain().len());
    }
    assert_eq!(s.state().matrix().cell(0, 0).unwrap().status(), TaskStatus::Skipped);
}

#[test]
fn template_roundtrip_through_a_session() {
    let (mut s, _clock) = session(a_b(), 2, Policy::default());
    let tpl = s.to_template("Routine");

    let (mut other, _c) = session(vec![Task::with_id("z", "Z", 5)], 1, Policy::default());
    other.start();
    other.load_template(&tpl).unwrap();
    assert_eq!(other.state().run_state(), RunState::Idle);
    assert_eq!(other.session_target(), s.session_target());

    s.edit_current("Stretch", 200);
    assert_eq!(s.state().current_task().unwrap().name, "Stretch");
    assert_eq!(s.round_target(0), 500);
}
