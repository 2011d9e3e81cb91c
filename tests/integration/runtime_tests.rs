//! Runtime tasks on a real executor and reactor clock: interrupt edge →
//! debounce → dispatch, and deferred stops fired by the timer task.

use std::time::Duration;

use bumperbar::adapters::time::{HostClock, ReactorSleep};
use bumperbar::app::events::AppEvent;
use bumperbar::app::ports::{Clock, SleepPort};
use bumperbar::input::interrupt::InterruptSignal;
use bumperbar::runtime::{self, Station};

use super::mock_board::{Board, RecordingSink, fast_config};

fn run<F: core::future::Future<Output = ()>>(executor: &edge_executor::LocalExecutor<'_, 8>, f: F) {
    futures_lite::future::block_on(executor.run(f));
}

#[test]
fn edge_is_debounced_then_dispatched() {
    static IRQ: InterruptSignal = InterruptSignal::new();

    let config = fast_config();
    let board = Board::for_config(&config);
    let station = Station::new(board.service(&config), RecordingSink::new()).shared();
    let clock = HostClock::new();

    let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();
    executor
        .spawn(runtime::interrupt_loop(station.clone(), &IRQ, clock, ReactorSleep))
        .detach();

    run(&executor, async {
        board.bus.drive(2);
        IRQ.notify();
        // Bounce: a second edge while the first is settling.
        IRQ.notify();
        ReactorSleep.sleep(Duration::from_millis(20)).await;
        board.bus.release();
    });

    let st = station.borrow();
    assert_eq!(st.service.bumper_hits(2), Some(1));
    assert_eq!(
        st.sink.count(|e| matches!(e, AppEvent::ElementHit { code: 2, .. })),
        1
    );
}

#[test]
fn timer_task_stops_pumps_after_pour() {
    static IRQ: InterruptSignal = InterruptSignal::new();

    let config = fast_config();
    let board = Board::for_config(&config);
    let station = Station::new(board.service(&config), RecordingSink::new()).shared();
    let clock = HostClock::new();

    let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();
    executor
        .spawn(runtime::interrupt_loop(station.clone(), &IRQ, clock, ReactorSleep))
        .detach();
    executor
        .spawn(runtime::timer_loop(station.clone(), clock, ReactorSleep))
        .detach();

    let a = board.pump_line(&config, "A").clone();
    run(&executor, async {
        board.bus.drive(1);
        IRQ.notify();
        ReactorSleep.sleep(Duration::from_millis(10)).await;
        board.bus.release();

        station.borrow_mut().end_round(clock.now());
        assert!(a.is_set());
        runtime::wait_idle(&station, &ReactorSleep).await;
    });

    assert!(!a.is_set());
    let st = station.borrow();
    assert!(!st.service.pumps().any_running());
    assert_eq!(st.service.drinks().total_score(), 0);
    assert_eq!(st.sink.count(|e| matches!(e, AppEvent::PumpIdle { .. })), 2);
    assert_eq!(st.sink.failures(), 0);
}

#[test]
fn pump_stops_fire_while_interrupt_settles() {
    static IRQ: InterruptSignal = InterruptSignal::new();

    let mut config = fast_config();
    config.debounce_us = 100_000;
    config.bumpers[0].pour_on_hit = true;
    let board = Board::for_config(&config);
    let station = Station::new(board.service(&config), RecordingSink::new()).shared();
    let clock = HostClock::new();

    let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();
    executor
        .spawn(runtime::interrupt_loop(station.clone(), &IRQ, clock, ReactorSleep))
        .detach();
    executor
        .spawn(runtime::timer_loop(station.clone(), clock, ReactorSleep))
        .detach();

    let a = board.pump_line(&config, "A").clone();
    run(&executor, async {
        // Start A directly: its 30 ms stop lands inside the next debounce.
        board.bus.drive(1);
        station.borrow_mut().service_interrupt(clock.now());
        board.bus.release();
        assert!(a.is_set());

        board.bus.drive(2);
        IRQ.notify();
        ReactorSleep.sleep(Duration::from_millis(60)).await;
        {
            let st = station.borrow();
            assert!(!a.is_set());
            assert_eq!(st.sink.count(|e| matches!(e, AppEvent::PumpIdle { .. })), 1);
            assert_eq!(st.service.bumper_hits(2), Some(0));
        }

        ReactorSleep.sleep(Duration::from_millis(90)).await;
        board.bus.release();
    });

    let st = station.borrow();
    assert_eq!(st.service.bumper_hits(2), Some(1));
    let idle = st.sink.events.iter().position(|e| matches!(e, AppEvent::PumpIdle { .. }));
    let hit = st
        .sink
        .events
        .iter()
        .position(|e| matches!(e, AppEvent::ElementHit { code: 2, .. }));
    assert!(idle.unwrap() < hit.unwrap());
}
