//! End-to-end game flow through `GameService`: bus → registry → scoring
//! → pour → deferred stops, with time injected by the test.

use std::time::Duration;

use bumperbar::app::events::AppEvent;
use bumperbar::drivers::pump::PumpState;
use bumperbar::error::{ActuatorError, Error, PumpStateError};

use super::mock_board::{Board, RecordingSink, two_pump_config};

const fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn hit(board: &Board, code: u32) {
    board.bus.drive(code);
}

#[test]
fn five_hundred_hits_pour_three_to_one() {
    let config = two_pump_config();
    let board = Board::for_config(&config);
    let mut svc = board.service(&config);
    let mut sink = RecordingSink::new();
    svc.start(&mut sink).unwrap();

    hit(&board, 1);
    for _ in 0..500 {
        svc.handle_interrupt(Duration::ZERO, &mut sink).unwrap();
    }
    board.bus.release();
    assert_eq!(svc.bumper_hits(1), Some(500));

    let d = svc.drinks().find("D").unwrap();
    assert_eq!(svc.drinks().score(d), 500);
    assert_eq!(svc.drinks().compute_pour_time(500), ms(5_000));

    sink.take();
    let poured = svc.pour_winner(ms(10_000), &mut sink).unwrap();
    assert_eq!(poured.drink, d);
    assert_eq!(poured.pour_time, ms(5_000));

    let a = board.pump_line(&config, "A");
    let b = board.pump_line(&config, "B");
    assert!(a.is_set() && b.is_set());
    assert_eq!(
        sink.events,
        vec![
            AppEvent::PumpStarted { pump: "A".try_into().unwrap(), run_for: ms(3_750) },
            AppEvent::PumpStarted { pump: "B".try_into().unwrap(), run_for: ms(1_250) },
            AppEvent::Poured { drink: "D".try_into().unwrap(), score: 500, total: ms(5_000) },
        ]
    );

    // B's share ends first; A keeps running until its own deadline.
    assert_eq!(svc.tick(ms(11_249), &mut sink), 0);
    assert_eq!(svc.tick(ms(11_250), &mut sink), 1);
    assert!(!b.is_set());
    assert!(a.is_set());
    assert_eq!(svc.next_deadline(), Some(ms(13_750)));

    assert_eq!(svc.tick(ms(14_000), &mut sink), 1);
    assert!(!a.is_set());
    assert!(!svc.pumps().any_running());
    assert_eq!(svc.next_deadline(), None);
    assert_eq!(sink.failures(), 0);
}

#[test]
fn big_score_is_capped_at_max_pour() {
    let config = two_pump_config();
    let board = Board::for_config(&config);
    let mut svc = board.service(&config);
    let mut sink = RecordingSink::new();

    hit(&board, 1);
    for _ in 0..2000 {
        svc.handle_interrupt(Duration::ZERO, &mut sink).unwrap();
    }
    let poured = svc.pour_winner(Duration::ZERO, &mut sink).unwrap();
    assert_eq!(poured.pour_time, ms(10_000));
    assert_eq!(poured.report.pumps[0].result, Ok(ms(7_500)));
    assert_eq!(poured.report.pumps[1].result, Ok(ms(2_500)));
}

#[test]
fn no_hits_no_pour() {
    let config = two_pump_config();
    let board = Board::for_config(&config);
    let mut svc = board.service(&config);
    let mut sink = RecordingSink::new();

    assert_eq!(svc.drinks().determine_winner(), None);
    assert!(svc.pour_winner(Duration::ZERO, &mut sink).is_none());
    assert!(sink.events.is_empty());
    assert!(!svc.pumps().any_running());
    assert_eq!(svc.next_deadline(), None);
}

#[test]
fn scores_persist_until_explicit_reset() {
    let config = two_pump_config();
    let board = Board::for_config(&config);
    let mut svc = board.service(&config);
    let mut sink = RecordingSink::new();

    hit(&board, 2);
    svc.handle_interrupt(Duration::ZERO, &mut sink).unwrap();
    let e = svc.drinks().find("E").unwrap();
    svc.pour_winner(Duration::ZERO, &mut sink).unwrap();
    assert_eq!(svc.drinks().score(e), 1);

    sink.take();
    svc.reset_round(&mut sink);
    assert_eq!(svc.drinks().total_score(), 0);
    assert_eq!(sink.events[0], AppEvent::RoundReset);
    assert_eq!(sink.count(|ev| matches!(ev, AppEvent::ScoreChanged { score: 0, .. })), 2);
}

#[test]
fn tie_goes_to_first_configured_drink() {
    let config = two_pump_config();
    let board = Board::for_config(&config);
    let mut svc = board.service(&config);
    let mut sink = RecordingSink::new();

    for code in [2, 1, 2, 1] {
        hit(&board, code);
        svc.handle_interrupt(Duration::ZERO, &mut sink).unwrap();
    }
    let d = svc.drinks().find("D").unwrap();
    assert_eq!(svc.drinks().determine_winner(), Some(d));
}

#[test]
fn busy_pump_refuses_and_others_still_pour() {
    let config = two_pump_config();
    let board = Board::for_config(&config);
    let mut svc = board.service(&config);
    let mut sink = RecordingSink::new();

    hit(&board, 1);
    svc.handle_interrupt(Duration::ZERO, &mut sink).unwrap();
    svc.pour_winner(Duration::ZERO, &mut sink).unwrap();
    sink.take();

    // Second pour while A and B are both still running.
    let poured = svc.pour_winner(ms(100), &mut sink).unwrap();
    assert_eq!(poured.report.started(), 0);
    assert_eq!(
        sink.count(|e| *e == AppEvent::ActionFailed(Error::Pump(PumpStateError::NotIdle))),
        2
    );

    // The service is still live.
    hit(&board, 2);
    assert!(svc.handle_interrupt(ms(200), &mut sink).unwrap().is_some());
}

#[test]
fn noise_codes_are_counted_and_ignored() {
    let config = two_pump_config();
    let board = Board::for_config(&config);
    let mut svc = board.service(&config);
    let mut sink = RecordingSink::new();

    for code in [3, 5, 7, 0] {
        hit(&board, code);
        assert_eq!(svc.handle_interrupt(Duration::ZERO, &mut sink), Ok(None));
    }
    assert_eq!(svc.unrecognised_count(), 3);
    assert_eq!(svc.drinks().total_score(), 0);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::UnrecognisedCode(_))), 3);
}

#[test]
fn pour_on_hit_runs_paired_pump_directly() {
    let mut config = two_pump_config();
    config.bumpers[0].pour_on_hit = true;
    let board = Board::for_config(&config);
    let mut svc = board.service(&config);
    let mut sink = RecordingSink::new();

    hit(&board, 1);
    let out = svc.handle_interrupt(Duration::ZERO, &mut sink).unwrap().unwrap();
    assert_eq!(out.pour, Some(Ok(ms(5_000))));
    assert!(board.pump_line(&config, "A").is_set());

    // Held down: the second read is refused by the interlock, not queued.
    let out = svc.handle_interrupt(ms(10), &mut sink).unwrap().unwrap();
    assert_eq!(out.pour, Some(Err(Error::Pump(PumpStateError::NotIdle))));
    assert_eq!(svc.next_deadline(), Some(ms(5_000)));
}

#[test]
fn cooldown_holds_pump_after_stop() {
    let mut config = two_pump_config();
    config.pumps[0].cooldown_ms = Some(2_000);
    config.bumpers[0].pour_on_hit = true;
    let board = Board::for_config(&config);
    let mut svc = board.service(&config);
    let mut sink = RecordingSink::new();

    hit(&board, 1);
    svc.handle_interrupt(Duration::ZERO, &mut sink).unwrap();
    svc.tick(ms(5_000), &mut sink);

    let a = svc.pumps().find("A").unwrap();
    assert_eq!(svc.pumps().get(a).unwrap().state(), PumpState::Cooldown);
    assert!(!board.pump_line(&config, "A").is_set());

    let out = svc.handle_interrupt(ms(6_000), &mut sink).unwrap().unwrap();
    assert_eq!(out.pour, Some(Err(Error::Pump(PumpStateError::NotIdle))));

    svc.tick(ms(7_000), &mut sink);
    assert_eq!(svc.pumps().get(a).unwrap().state(), PumpState::Idle);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::PumpIdle { .. })), 1);
}

#[test]
fn failed_stop_is_retried_until_it_lands() {
    let mut config = two_pump_config();
    config.bumpers[0].pour_on_hit = true;
    let board = Board::for_config(&config);
    let mut svc = board.service(&config);
    let mut sink = RecordingSink::new();

    hit(&board, 1);
    svc.handle_interrupt(Duration::ZERO, &mut sink).unwrap();

    let line = board.pump_line(&config, "A");
    line.fail_writes(true);
    assert_eq!(svc.tick(ms(5_000), &mut sink), 1);
    assert!(line.is_set());
    assert!(svc.pumps().any_running());
    assert_eq!(
        sink.count(|e| *e == AppEvent::ActionFailed(Error::Actuator(ActuatorError::GpioWriteFailed))),
        1
    );
    assert_eq!(svc.next_deadline(), Some(ms(5_010)));

    line.fail_writes(false);
    assert_eq!(svc.tick(ms(5_010), &mut sink), 1);
    assert!(!line.is_set());
    assert!(!svc.pumps().any_running());
}

#[test]
fn points_per_bumper_feed_the_score() {
    let mut config = two_pump_config();
    config.bumpers[1].points = 10;
    let board = Board::for_config(&config);
    let mut svc = board.service(&config);
    let mut sink = RecordingSink::new();

    hit(&board, 2);
    svc.handle_interrupt(Duration::ZERO, &mut sink).unwrap();
    hit(&board, 1);
    svc.handle_interrupt(Duration::ZERO, &mut sink).unwrap();

    let e = svc.drinks().find("E").unwrap();
    assert_eq!(svc.drinks().score(e), 10);
    assert_eq!(svc.drinks().total_score(), 11);
    assert_eq!(svc.drinks().determine_winner(), Some(e));
}
