//! Game service: the hexagonal core.
//!
//! [`GameService`] owns the decoder, the element registry, the pumps,
//! the drink controller, and the deferred-action queue.  It exposes a
//! clean, synchronous API: time is passed in, events flow out through the
//! [`EventSink`] injected at each call, and hardware is reached only
//! through `embedded-hal` pins handed over at construction.
//!
//! ```text
//!  code lines ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │          GameService          │
//!  interrupt ───▶ │ Decoder · Registry · Drinks   │
//!  tick(now) ───▶ │ PumpBank · TimerQueue         │ ──▶ pump actuators
//!                 └──────────────────────────────┘
//! ```
//!
//! Every runtime failure is reported as [`AppEvent::ActionFailed`] and
//! the call returns normally, so the dispatch loop never dies because one
//! pump misbehaved.

use core::time::Duration;

use embedded_hal::digital::{Error as _, InputPin, OutputPin};
use log::{debug, error, info, warn};

use crate::config::{MachineConfig, Name};
use crate::drivers::pump::{Actuation, PumpHooks, PumpId};
use crate::drivers::pump_bank::PumpBank;
use crate::error::{ActuatorError, ConfigError, Result};
use crate::game::drink::MAX_RECIPE;
use crate::game::{Bumper, Drink, DrinkController, DrinkId, HitOutcome, Poured};
use crate::input::decoder::InputDecoder;
use crate::registry::ElementRegistry;
use crate::timer::TimerQueue;

use super::events::AppEvent;
use super::ports::EventSink;

fn event_name(name: &str) -> Name {
    // Names were length-checked when the element was built.
    Name::try_from(name).unwrap_or_default()
}

// ───────────────────────────────────────────────────────────────
// Pump hooks → events
// ───────────────────────────────────────────────────────────────

/// Forwards pump transitions to the event sink.
struct SinkHooks<'a, S> {
    sink: &'a mut S,
}

impl<S: EventSink> PumpHooks for SinkHooks<'_, S> {
    fn on_enter_running(&mut self, _pump: PumpId, name: &str, run_for: Duration) {
        self.sink.emit(&AppEvent::PumpStarted {
            pump: event_name(name),
            run_for,
        });
    }

    fn on_enter_idle(&mut self, _pump: PumpId, name: &str) {
        self.sink.emit(&AppEvent::PumpIdle {
            pump: event_name(name),
        });
    }
}

// ───────────────────────────────────────────────────────────────
// GameService
// ───────────────────────────────────────────────────────────────

pub struct GameService<I, O> {
    decoder: InputDecoder<I>,
    registry: ElementRegistry<Bumper>,
    pumps: PumpBank<O>,
    drinks: DrinkController,
    timers: TimerQueue,
    /// Gates power to the whole actuator bank.
    master: Option<O>,
    enabled: bool,
    debounce: Duration,
    round_length: Option<Duration>,
}

impl<I: InputPin, O: OutputPin> GameService<I, O> {
    /// Validate `config` and wire everything.
    ///
    /// `input` and `output` turn a GPIO number into a pin.  Nothing is
    /// partially wired: any configuration error aborts construction.
    pub fn from_config(
        config: &MachineConfig,
        mut input: impl FnMut(u8) -> I,
        mut output: impl FnMut(u8) -> O,
    ) -> Result<Self> {
        config.validate()?;

        let decoder = InputDecoder::new(
            config.code_lines.iter().map(|&line| input(line)),
            config.active_level,
        )?;

        let mut pumps = PumpBank::new();
        for p in &config.pumps {
            pumps.add(&p.name, output(p.actuator), p.timing()?)?;
        }

        let mut drinks = DrinkController::from_config(&config.pour)?;
        for d in &config.drinks {
            let mut recipe = heapless::Vec::<(PumpId, f32), MAX_RECIPE>::new();
            for (pump, weight) in &d.recipe {
                let id = pumps.find(pump).ok_or(ConfigError::UnknownPump)?;
                recipe
                    .push((id, *weight))
                    .map_err(|_| ConfigError::CapacityExceeded("recipe pumps"))?;
            }
            drinks.add_drink(Drink::new(&d.name, &recipe)?)?;
        }

        let mut registry = ElementRegistry::new();
        for b in &config.bumpers {
            let pump = pumps.find(&b.pump).ok_or(ConfigError::UnknownPump)?;
            let mut bumper = Bumper::new(&b.name, b.element_code, pump)?
                .with_points(b.points)
                .with_pour_on_hit(b.pour_on_hit);
            if let Some(drink) = &b.drink {
                bumper = bumper.with_drink(drinks.find(drink).ok_or(ConfigError::UnknownDrink)?);
            }
            if !decoder.can_encode(b.element_code) {
                return Err(ConfigError::CodeOutOfRange {
                    code: b.element_code,
                    lines: decoder.line_count(),
                }
                .into());
            }
            registry.register(b.element_code, bumper)?;
        }

        let master = match config.master_enable_line {
            Some(line) => {
                let mut pin = output(line);
                drive(&mut pin, false)?;
                Some(pin)
            }
            None => None,
        };

        info!(
            "GameService: {} code lines, {} bumpers, {} pumps, {} drinks",
            decoder.line_count(),
            registry.len(),
            pumps.len(),
            drinks.len()
        );

        Ok(Self {
            decoder,
            registry,
            pumps,
            drinks,
            timers: TimerQueue::new(),
            master,
            enabled: false,
            debounce: config.debounce(),
            round_length: config.round_length(),
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Power the actuator bank.  Dispatch does not depend on this; hits are
    /// handled whenever the interrupt task calls in.
    pub fn start(&mut self, sink: &mut impl EventSink) -> Result<()> {
        self.enable(sink)?;
        sink.emit(&AppEvent::Started);
        info!("GameService started");
        Ok(())
    }

    /// Drive the master enable line on.
    pub fn enable(&mut self, sink: &mut impl EventSink) -> Result<()> {
        self.set_master(true, sink)
    }

    /// Drive the master enable line off.  Pending stops still fire.
    pub fn disable(&mut self, sink: &mut impl EventSink) -> Result<()> {
        self.set_master(false, sink)
    }

    fn set_master(&mut self, on: bool, sink: &mut impl EventSink) -> Result<()> {
        if let Some(pin) = self.master.as_mut() {
            drive(pin, on)?;
        }
        self.enabled = on;
        info!("GameService: master {}", if on { "enabled" } else { "disabled" });
        sink.emit(&AppEvent::MasterEnabled(on));
        Ok(())
    }

    // ── Event handling ────────────────────────────────────────

    /// Read the bus (after the caller's debounce) and dispatch the code.
    ///
    /// Returns the hit outcome, or `None` for idle and unrecognised codes.
    /// Only a failed bus read is an error.
    pub fn handle_interrupt(
        &mut self,
        now: Duration,
        sink: &mut impl EventSink,
    ) -> Result<Option<HitOutcome>> {
        let code = self.decoder.read_code().inspect_err(|e| {
            sink.emit(&AppEvent::ActionFailed((*e).into()));
        })?;
        debug!("GameService: interrupt read code {}", code);

        if code == 0 {
            return Ok(None);
        }
        let Some(bumper) = self.registry.dispatch(code) else {
            sink.emit(&AppEvent::UnrecognisedCode(code));
            return Ok(None);
        };

        let outcome = {
            let mut hooks = SinkHooks { sink: &mut *sink };
            let mut act = Actuation {
                now,
                timers: &mut self.timers,
                hooks: &mut hooks,
            };
            bumper.on_hit(&mut self.drinks, &mut self.pumps, &mut act)
        };

        sink.emit(&AppEvent::ElementHit {
            code,
            bumper: event_name(bumper.name()),
            hits: outcome.hits,
        });
        if let Some((drink, score)) = outcome.scored {
            self.emit_score(drink, score, sink);
        }
        if let Some(Err(e)) = outcome.pour {
            sink.emit(&AppEvent::ActionFailed(e));
        }
        Ok(Some(outcome))
    }

    /// Fire every deferred action due at `now`, earliest first.
    /// Returns how many fired.
    pub fn tick(&mut self, now: Duration, sink: &mut impl EventSink) -> usize {
        let mut fired = 0;
        while let Some(action) = self.timers.pop_due(now) {
            fired += 1;
            let result = {
                let mut hooks = SinkHooks { sink: &mut *sink };
                let mut act = Actuation {
                    now,
                    timers: &mut self.timers,
                    hooks: &mut hooks,
                };
                self.pumps.fire(action, &mut act)
            };
            if let Err(e) = result {
                error!("GameService: {:?} failed ({})", action, e);
                sink.emit(&AppEvent::ActionFailed(e));
            }
        }
        fired
    }

    /// Pour the current winner.  `None` if nothing has scored.
    ///
    /// Scores are kept; call [`reset_round`](Self::reset_round) to clear them.
    pub fn pour_winner(&mut self, now: Duration, sink: &mut impl EventSink) -> Option<Poured> {
        let poured = {
            let mut hooks = SinkHooks { sink: &mut *sink };
            let mut act = Actuation {
                now,
                timers: &mut self.timers,
                hooks: &mut hooks,
            };
            self.drinks.pour_winner(&mut self.pumps, &mut act)
        }?;

        for failure in poured.report.failures() {
            if let Err(e) = failure.result {
                sink.emit(&AppEvent::ActionFailed(e));
            }
        }
        if let Some(drink) = self.drinks.drink(poured.drink) {
            sink.emit(&AppEvent::Poured {
                drink: event_name(drink.name()),
                score: poured.score,
                total: poured.pour_time,
            });
        }
        Some(poured)
    }

    /// Clear all scores for the next round.
    pub fn reset_round(&mut self, sink: &mut impl EventSink) {
        self.drinks.reset_round();
        sink.emit(&AppEvent::RoundReset);
        for (id, _, score) in self.drinks.iter() {
            self.emit_score(id, score, sink);
        }
    }

    fn emit_score(&self, drink: DrinkId, score: u32, sink: &mut impl EventSink) {
        if let Some(d) = self.drinks.drink(drink) {
            sink.emit(&AppEvent::ScoreChanged {
                drink: event_name(d.name()),
                score,
                total: self.drinks.total_score(),
            });
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Earliest pending deferred action, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn round_length(&self) -> Option<Duration> {
        self.round_length
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn pumps(&self) -> &PumpBank<O> {
        &self.pumps
    }

    pub fn drinks(&self) -> &DrinkController {
        &self.drinks
    }

    pub fn registry(&self) -> &ElementRegistry<Bumper> {
        &self.registry
    }

    /// Hits recorded on the bumper owning `code`.
    pub fn bumper_hits(&self, code: u32) -> Option<u32> {
        self.registry.get(code).map(Bumper::hits)
    }

    pub fn unrecognised_count(&self) -> u32 {
        self.registry.unrecognised_count()
    }

    /// Widest code the bus can carry.
    pub fn max_code(&self) -> u32 {
        self.decoder.max_code()
    }
}

fn drive<O: OutputPin>(pin: &mut O, on: bool) -> Result<()> {
    let result = if on { pin.set_high() } else { pin.set_low() };
    result.map_err(|e| {
        warn!("GameService: master enable write failed ({:?})", e.kind());
        ActuatorError::GpioWriteFailed.into()
    })
}
