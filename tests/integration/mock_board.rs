//! Simulated cabinet for integration tests.
//!
//! One [`SimLine`] per configured GPIO, plus a sink that records every
//! event so tests can assert on the full history.

use std::collections::{BTreeMap, HashMap};

use bumperbar::adapters::sim_gpio::{SimBus, SimLine};
use bumperbar::app::events::AppEvent;
use bumperbar::app::ports::EventSink;
use bumperbar::app::service::GameService;
use bumperbar::config::{
    BumperConfig, DrinkConfig, MachineConfig, PourConfig, PumpConfig, RoundConfig,
};

// ── Recording sink ────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<AppEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn failures(&self) -> usize {
        self.count(|e| matches!(e, AppEvent::ActionFailed(_)))
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Board ─────────────────────────────────────────────────────

pub struct Board {
    pub lines: HashMap<u8, SimLine>,
    pub bus: SimBus,
}

#[allow(dead_code)]
impl Board {
    pub fn for_config(config: &MachineConfig) -> Self {
        let mut lines = HashMap::new();
        for n in config
            .code_lines
            .iter()
            .copied()
            .chain(config.master_enable_line)
            .chain(config.pumps.iter().map(|p| p.actuator))
        {
            lines.insert(n, SimLine::new());
        }
        let bus = SimBus::from_lines(config.code_lines.iter().map(|n| lines[n].clone()).collect());
        Self { lines, bus }
    }

    pub fn service(&self, config: &MachineConfig) -> GameService<SimLine, SimLine> {
        GameService::from_config(config, |n| self.lines[&n].clone(), |n| self.lines[&n].clone())
            .expect("valid test config")
    }

    /// Actuator line of the pump named `name`.
    pub fn pump_line(&self, config: &MachineConfig, name: &str) -> &SimLine {
        let pump = config
            .pumps
            .iter()
            .find(|p| p.name == name)
            .expect("pump in config");
        &self.lines[&pump.actuator]
    }
}

// ── Configs ───────────────────────────────────────────────────

fn pump(name: &str, actuator: u8, default_ms: u64, min_ms: u64, max_ms: u64) -> PumpConfig {
    PumpConfig {
        name: name.into(),
        actuator,
        default_run_ms: default_ms,
        min_run_ms: min_ms,
        max_run_ms: max_ms,
        cooldown_ms: None,
    }
}

/// Two pumps `A`/`B` (1..10 s, default 5 s), one drink `D = {A: 3, B: 1}`,
/// bumper `left` (code 1) scoring `D`, pour 1..10 s at 0.01 s per point.
pub fn two_pump_config() -> MachineConfig {
    MachineConfig {
        code_lines: vec![4, 17, 27],
        interrupt_line: 3,
        master_enable_line: Some(2),
        active_level: Default::default(),
        debounce_us: 1000,
        pumps: vec![
            pump("A", 14, 5_000, 1_000, 10_000),
            pump("B", 15, 5_000, 1_000, 10_000),
        ],
        bumpers: vec![
            BumperConfig {
                name: "left".into(),
                element_code: 1,
                pump: "A".into(),
                drink: Some("D".into()),
                points: 1,
                pour_on_hit: false,
            },
            BumperConfig {
                name: "right".into(),
                element_code: 2,
                pump: "B".into(),
                drink: Some("E".into()),
                points: 1,
                pour_on_hit: false,
            },
        ],
        drinks: vec![
            DrinkConfig {
                name: "D".into(),
                recipe: BTreeMap::from([("A".into(), 3.0), ("B".into(), 1.0)]),
            },
            DrinkConfig {
                name: "E".into(),
                recipe: BTreeMap::from([("B".into(), 1.0)]),
            },
        ],
        pour: PourConfig {
            min_pour_ms: 1_000,
            max_pour_ms: 10_000,
            coefficient: 0.01,
        },
        round: RoundConfig::default(),
    }
}

/// Millisecond-scale timings for tests that run on a real clock.
#[allow(dead_code)]
pub fn fast_config() -> MachineConfig {
    let mut c = two_pump_config();
    c.pumps = vec![pump("A", 14, 30, 10, 50), pump("B", 15, 30, 10, 50)];
    c.pour = PourConfig {
        min_pour_ms: 10,
        max_pour_ms: 50,
        coefficient: 0.01,
    };
    c
}
