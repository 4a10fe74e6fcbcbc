// Integration tests (native) for the `desk-duty` crate.
// These drive the public core API only; nothing here touches the browser.

use desk_duty::{
    DifficultyParameters, GameLoop, Phase, Session, SupervisorState, TickOutcome, Tuning,
    WorkerState,
};
use rand::rngs::mock::StepRng;

// Rolls every peep / absent duration at the top of its range.
fn slow_supervisor() -> StepRng {
    StepRng::new(u64::MAX, 0)
}

// ... and at the bottom.
fn eager_supervisor() -> StepRng {
    StepRng::new(0, 0)
}

fn ready_session(rng: &mut StepRng) -> Session {
    let mut s = Session::new(Tuning::default(), rng).unwrap();
    s.tick(150.0, rng);
    assert!(s.worker().is_ready_for_action());
    s
}

#[test]
fn press_hold_release_scenario() {
    let mut rng = slow_supervisor();
    let mut s = ready_session(&mut rng);

    s.on_press(&mut rng);
    assert_eq!(s.phase(), Phase::Playing);
    assert_eq!(s.worker().state(), WorkerState::Work);
    assert_eq!(s.supervisor().state(), SupervisorState::Absent);
    assert_eq!(s.active_ms(), 0.0);

    let mut relaxed_at = None;
    for step in 1..=100 {
        s.tick(16.0, &mut rng);
        if relaxed_at.is_none() && s.worker().state() == WorkerState::Relax {
            relaxed_at = Some(step * 16);
        }
    }
    assert_eq!(relaxed_at, Some(1504), "gave out on the first tick past 1500 ms");
    assert_eq!(s.active_ms(), 1600.0);
    assert_eq!(s.phase(), Phase::Playing);

    let before = s.worker().time_in_state();
    s.on_release(&mut rng);
    assert_eq!(s.worker().state(), WorkerState::Relax);
    assert_eq!(s.worker().time_in_state(), before, "release was a no-op");
}

#[test]
fn peep_while_relaxing_is_caught_on_that_tick() {
    let mut rng = eager_supervisor();
    let mut s = ready_session(&mut rng);
    s.on_press(&mut rng);
    s.on_release(&mut rng);

    // absent 500 ms + rise 3000/7 ms, so peep starts on the tick after ~928.6 ms
    let mut caught_at = None;
    for step in 1..=200 {
        if s.tick(10.0, &mut rng) == TickOutcome::Caught {
            caught_at = Some(step * 10);
            break;
        }
        assert_ne!(s.supervisor().state(), SupervisorState::Peep);
    }
    assert_eq!(caught_at, Some(940));
    assert_eq!(s.phase(), Phase::Summary);
    assert_eq!(s.worker().state(), WorkerState::Cry);
    assert_eq!(s.supervisor().state(), SupervisorState::Mad);
}

#[test]
fn summary_is_stable_until_restart() {
    let mut rng = eager_supervisor();
    let mut s = ready_session(&mut rng);
    s.on_press(&mut rng);
    s.on_release(&mut rng);
    while s.tick(10.0, &mut rng) != TickOutcome::Caught {}

    let frozen = s.active_ms();
    for _ in 0..500 {
        assert_eq!(s.tick(16.0, &mut rng), TickOutcome::Continue);
    }
    assert_eq!(s.active_ms(), frozen);
    assert_eq!(s.supervisor().state(), SupervisorState::Mad);
    assert_eq!(s.worker().state(), WorkerState::Cry);
    assert_eq!(s.phase(), Phase::Summary);
}

#[test]
fn restart_resets_clock_and_supervisor_whatever_the_summary_length() {
    for summary_ms in [3_001.0, 10_000.0, 250_000.0] {
        let mut rng = eager_supervisor();
        let mut s = ready_session(&mut rng);
        s.on_press(&mut rng);
        s.on_release(&mut rng);
        while s.tick(10.0, &mut rng) != TickOutcome::Caught {}
        s.tick(summary_ms, &mut rng);

        s.on_press(&mut rng);
        assert_eq!(s.phase(), Phase::Playing);
        assert_eq!(s.active_ms(), 0.0);
        assert_eq!(s.hours_survived(), 0);
        assert_eq!(s.supervisor().state(), SupervisorState::Absent);
        assert_eq!(s.supervisor().time_in_state(), 0.0);
        assert_eq!(s.worker().state(), WorkerState::Work);
    }
}

#[test]
fn difficulty_follows_active_hours() {
    let mut rng = slow_supervisor();
    let tuning = Tuning {
        max_work_ms: f64::MAX,
        ..Tuning::default()
    };
    let mut s = Session::new(tuning, &mut rng).unwrap();
    s.tick(150.0, &mut rng);
    s.on_press(&mut rng);

    for _ in 0..(10 * 2_000 / 20) {
        assert_eq!(s.tick(20.0, &mut rng), TickOutcome::Continue);
    }
    assert_eq!(s.hours_survived(), 10);
    assert_eq!(
        *s.supervisor().table().difficulty(),
        DifficultyParameters::for_hour(10)
    );
    assert_eq!(s.status_text(), "You survived work for 10 hours...");
}

#[test]
fn loop_drives_the_session_from_timestamps() {
    let mut rng = slow_supervisor();
    let session = Session::new(Tuning::default(), &mut rng).unwrap();
    let mut lp = GameLoop::new(session, Box::new(slow_supervisor()));

    let mut now = 5_000.0;
    assert!(lp.request_frame());
    lp.frame(now);
    for _ in 0..10 {
        now += 16.0;
        assert!(lp.request_frame());
        lp.frame(now);
    }
    assert_eq!(lp.session().worker().time_in_state(), 160.0);

    lp.press();
    assert_eq!(lp.session().phase(), Phase::Playing);
    now += 16.0;
    lp.frame(now);
    lp.release();
    assert_eq!(lp.session().worker().state(), WorkerState::Relax);
    assert_eq!(lp.session().active_ms(), 16.0);
}
