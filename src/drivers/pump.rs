//! Dispensing pump driver (relay or MOSFET on one digital output).
//!
//! Each [`Pump`] exclusively owns its actuator line and is the only thing
//! allowed to drive it.  State is tracked from what was *commanded*; there
//! is no flow feedback.
//!
//! ## State machine
//!
//! ```text
//!            run(d)                  deferred stop
//!   Idle ───────────────▶ Running ─────────────────▶ Idle
//!                                  │
//!                                  │ (cooldown configured)
//!                                  ▼
//!                              Cooldown ──end_cooldown──▶ Idle
//! ```
//!
//! ## Safety contract
//!
//! - `run` is refused unless the pump is `Idle`; nothing is queued.
//! - The run duration is always clamped into `[min_run, max_run]`, and
//!   the stop is scheduled *before* the actuator is driven on, so a pump
//!   can never be left running without a pending stop.
//! - The stop is only ever fired by the timer queue.

use core::time::Duration;

use embedded_hal::digital::{Error as _, OutputPin};
use log::{error, info, warn};

use crate::config::{make_name, Name};
use crate::error::{ActuatorError, ConfigError, Error, PumpStateError, Result};
use crate::timer::{TimerAction, TimerQueue};

/// Delay before retrying a stop whose actuator write failed.
pub const STOP_RETRY_DELAY: Duration = Duration::from_millis(10);

/// Index of a pump inside its [`PumpBank`](super::pump_bank::PumpBank).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PumpId(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
    Idle,
    Running,
    Cooldown,
}

/// Run-time bounds for one pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpTiming {
    default_run: Duration,
    min_run: Duration,
    max_run: Duration,
    cooldown: Option<Duration>,
}

impl PumpTiming {
    /// Requires `0 < min_run <= default_run <= max_run`.
    pub fn new(
        default_run: Duration,
        min_run: Duration,
        max_run: Duration,
    ) -> core::result::Result<Self, ConfigError> {
        if min_run.is_zero() {
            return Err(ConfigError::InvalidTiming("min run time must be positive"));
        }
        if min_run > max_run {
            return Err(ConfigError::InvalidTiming("min run time above max"));
        }
        if default_run < min_run || default_run > max_run {
            return Err(ConfigError::InvalidTiming("default run time outside bounds"));
        }
        Ok(Self {
            default_run,
            min_run,
            max_run,
            cooldown: None,
        })
    }

    /// Add a rest period after every run.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    /// Resolve a run request: fall back to the default, then clamp.
    pub fn effective(&self, requested: Option<Duration>) -> Duration {
        requested
            .unwrap_or(self.default_run)
            .clamp(self.min_run, self.max_run)
    }

    pub fn default_run(&self) -> Duration {
        self.default_run
    }

    pub fn min_run(&self) -> Duration {
        self.min_run
    }

    pub fn max_run(&self) -> Duration {
        self.max_run
    }

    pub fn cooldown(&self) -> Option<Duration> {
        self.cooldown
    }
}

/// Transition hooks, so callers can layer policy (cooldown lights,
/// telemetry, flow accounting) on top of the pump state machine.
pub trait PumpHooks {
    fn on_enter_running(&mut self, _pump: PumpId, _name: &str, _run_for: Duration) {}
    fn on_enter_idle(&mut self, _pump: PumpId, _name: &str) {}
}

/// Hooks that do nothing.
pub struct NoHooks;

impl PumpHooks for NoHooks {}

/// Everything a pump transition needs from its caller: the current time,
/// the queue that will fire the deferred stop, and the hooks to notify.
pub struct Actuation<'a> {
    pub now: Duration,
    pub timers: &'a mut TimerQueue,
    pub hooks: &'a mut dyn PumpHooks,
}

pub struct Pump<O> {
    id: PumpId,
    name: Name,
    actuator: O,
    timing: PumpTiming,
    state: PumpState,
    runs: u32,
}

impl<O: OutputPin> Pump<O> {
    /// Take ownership of `actuator` and drive it off.
    pub fn new(id: PumpId, name: &str, mut actuator: O, timing: PumpTiming) -> Result<Self> {
        let name = make_name(name)?;
        actuator.set_low().map_err(|e| {
            error!("Pump '{}': initial off failed ({:?})", name, e.kind());
            ActuatorError::GpioWriteFailed
        })?;
        Ok(Self {
            id,
            name,
            actuator,
            timing,
            state: PumpState::Idle,
            runs: 0,
        })
    }

    /// Start a bounded run.  Returns the effective (clamped) duration.
    ///
    /// Non-blocking: the stop is scheduled on `act.timers` and fires later.
    pub fn run(&mut self, requested: Option<Duration>, act: &mut Actuation<'_>) -> Result<Duration> {
        if self.state != PumpState::Idle {
            warn!("Pump '{}': run refused in {:?}", self.name, self.state);
            return Err(PumpStateError::NotIdle.into());
        }

        let run_for = self.timing.effective(requested);
        if requested.is_some_and(|r| r != run_for) {
            info!(
                "Pump '{}': requested {:?} clamped to {:?}",
                self.name, requested, run_for
            );
        }

        let stop = TimerAction::StopPump(self.id);
        act.timers.after(act.now, run_for, stop)?;
        if let Err(e) = self.actuator.set_high() {
            error!("Pump '{}': actuator on failed ({:?})", self.name, e.kind());
            act.timers.cancel(stop);
            return Err(ActuatorError::GpioWriteFailed.into());
        }

        self.state = PumpState::Running;
        self.runs = self.runs.saturating_add(1);
        info!("Pump '{}': running for {:?}", self.name, run_for);
        act.hooks.on_enter_running(self.id, &self.name, run_for);
        Ok(run_for)
    }

    /// Deferred stop.  Only the timer queue calls this.
    pub(crate) fn stop(&mut self, act: &mut Actuation<'_>) -> Result<()> {
        if self.state != PumpState::Running {
            error!("Pump '{}': stop fired in {:?}", self.name, self.state);
            return Err(PumpStateError::NotRunning.into());
        }

        if let Err(e) = self.actuator.set_low() {
            error!(
                "Pump '{}': actuator off failed ({:?}), retrying in {:?}",
                self.name,
                e.kind(),
                STOP_RETRY_DELAY
            );
            act.timers
                .after(act.now, STOP_RETRY_DELAY, TimerAction::StopPump(self.id))?;
            return Err(ActuatorError::GpioWriteFailed.into());
        }

        match self.timing.cooldown {
            Some(cooldown) => {
                match act
                    .timers
                    .after(act.now, cooldown, TimerAction::EndCooldown(self.id))
                {
                    Ok(_) => {
                        self.state = PumpState::Cooldown;
                        info!("Pump '{}': stopped, cooling down {:?}", self.name, cooldown);
                    }
                    Err(e) => {
                        warn!("Pump '{}': cooldown not scheduled ({}), going idle", self.name, e);
                        self.enter_idle(act);
                    }
                }
            }
            None => self.enter_idle(act),
        }
        Ok(())
    }

    /// Deferred end of cooldown.  Only the timer queue calls this.
    pub(crate) fn end_cooldown(&mut self, act: &mut Actuation<'_>) -> Result<()> {
        if self.state != PumpState::Cooldown {
            error!("Pump '{}': cooldown end fired in {:?}", self.name, self.state);
            return Err(Error::Pump(PumpStateError::NotCoolingDown));
        }
        self.enter_idle(act);
        Ok(())
    }

    fn enter_idle(&mut self, act: &mut Actuation<'_>) {
        self.state = PumpState::Idle;
        info!("Pump '{}': idle", self.name);
        act.hooks.on_enter_idle(self.id, &self.name);
    }

    /// Commanded state, never a hardware read-back.
    pub fn is_running(&self) -> bool {
        self.state == PumpState::Running
    }

    pub fn state(&self) -> PumpState {
        self.state
    }

    pub fn id(&self) -> PumpId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timing(&self) -> &PumpTiming {
        &self.timing
    }

    /// Successful runs since construction.
    pub fn runs(&self) -> u32 {
        self.runs
    }
}
