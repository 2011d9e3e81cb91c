//! Cooperative single-thread runtime.
//!
//! Three tasks share one [`Station`] on an `edge-executor`
//! `LocalExecutor`.  They never run in parallel, so the scores and pump
//! states need no locking; a `RefCell` borrow is never held across an
//! `.await`.
//!
//! ```text
//!  ┌────────────────────────────────────────────────────────────┐
//!  │  futures_lite::future::block_on                            │
//!  │  ┌──────────────────────────────────────────────────────┐  │
//!  │  │  edge_executor::LocalExecutor                        │  │
//!  │  │                                                      │  │
//!  │  │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐   │  │
//!  │  │  │ Interrupt   │  │ Timers      │  │ Round       │   │  │
//!  │  │  │ wake-on-ISR │  │ 1ms ⏱       │  │ length ⏱    │   │  │
//!  │  │  │ + debounce  │  │ fire due    │  │ pour, reset │   │  │
//!  │  │  └─────────────┘  └─────────────┘  └─────────────┘   │  │
//!  │  └──────────────────────────────────────────────────────┘  │
//!  └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The debounce sleep yields to the executor, so pending pump stops keep
//! firing while an interrupt settles.

use core::cell::RefCell;
use core::time::Duration;
use std::rc::Rc;

use embedded_hal::digital::{InputPin, OutputPin};
use log::{debug, info, warn};

use crate::app::ports::{Clock, EventSink, SleepPort};
use crate::app::service::GameService;
use crate::input::interrupt::InterruptSignal;

/// How often the timer task checks for due actions.
pub const TIMER_POLL: Duration = Duration::from_millis(1);

/// The service together with the sink its events go to.
pub struct Station<I, O, S> {
    pub service: GameService<I, O>,
    pub sink: S,
}

pub type SharedStation<I, O, S> = Rc<RefCell<Station<I, O, S>>>;

impl<I: InputPin, O: OutputPin, S: EventSink> Station<I, O, S> {
    pub fn new(service: GameService<I, O>, sink: S) -> Self {
        Self { service, sink }
    }

    pub fn shared(self) -> SharedStation<I, O, S> {
        Rc::new(RefCell::new(self))
    }

    /// Read and dispatch the bus once.  Errors are reported, not returned.
    pub fn service_interrupt(&mut self, now: Duration) {
        if let Err(e) = self.service.handle_interrupt(now, &mut self.sink) {
            warn!("Runtime: interrupt dropped ({})", e);
        }
    }

    /// Fire due deferred actions.
    pub fn service_timers(&mut self, now: Duration) -> usize {
        self.service.tick(now, &mut self.sink)
    }

    /// Pour the winner, then clear the scores for the next round.
    pub fn end_round(&mut self, now: Duration) {
        match self.service.pour_winner(now, &mut self.sink) {
            Some(poured) => info!(
                "Runtime: round over, {} of {} pumps started",
                poured.report.started(),
                poured.report.pumps.len()
            ),
            None => info!("Runtime: round over, no winner"),
        }
        self.service.reset_round(&mut self.sink);
    }
}

/// Wait for interrupt edges, debounce, then dispatch.
pub async fn interrupt_loop<I, O, S>(
    station: SharedStation<I, O, S>,
    irq: &InterruptSignal,
    clock: impl Clock,
    sleep: impl SleepPort,
) where
    I: InputPin,
    O: OutputPin,
    S: EventSink,
{
    let debounce = station.borrow().service.debounce();
    loop {
        irq.wait().await;
        sleep.sleep(debounce).await;
        // Edges during the debounce are covered by the read below.
        if irq.take_pending() {
            debug!("Runtime: coalesced edges while settling");
        }
        station.borrow_mut().service_interrupt(clock.now());
    }
}

/// Fire deferred pump actions as they come due.
pub async fn timer_loop<I, O, S>(
    station: SharedStation<I, O, S>,
    clock: impl Clock,
    sleep: impl SleepPort,
) where
    I: InputPin,
    O: OutputPin,
    S: EventSink,
{
    loop {
        station.borrow_mut().service_timers(clock.now());
        sleep.sleep(TIMER_POLL).await;
    }
}

/// Fixed-length rounds: every `length`, pour the winner and reset.
pub async fn round_loop<I, O, S>(
    station: SharedStation<I, O, S>,
    length: Duration,
    clock: impl Clock,
    sleep: impl SleepPort,
) where
    I: InputPin,
    O: OutputPin,
    S: EventSink,
{
    info!("Runtime: rounds every {:?}", length);
    loop {
        sleep.sleep(length).await;
        station.borrow_mut().end_round(clock.now());
    }
}

/// Sleep until no pump is running or cooling down and no action is pending.
pub async fn wait_idle<I, O, S>(station: &SharedStation<I, O, S>, sleep: &impl SleepPort)
where
    I: InputPin,
    O: OutputPin,
    S: EventSink,
{
    while station.borrow().service.next_deadline().is_some() {
        sleep.sleep(TIMER_POLL).await;
    }
}
