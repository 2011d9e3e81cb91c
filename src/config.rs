//! Machine configuration parameters
//!
//! Everything setup needs to wire the machine: which GPIO lines form the
//! encoded sensor bus, which line raises the interrupt, the pumps, the
//! bumpers, the drink recipes, and the pour-time formula.
//! Values can be loaded from JSON via [`ConfigPort`](crate::app::ports::ConfigPort).
//!
//! [`MachineConfig::validate`] rejects bad values instead of clamping them;
//! the service refuses to start on any error.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use log::error;
use serde::{Deserialize, Serialize};

use crate::drivers::pump::PumpTiming;
use crate::error::ConfigError;
use crate::input::decoder::MAX_CODE_LINES;
use crate::input::interrupt::DEBOUNCE;

/// Maximum length of a pump, bumper, or drink name.
pub const NAME_LEN: usize = 24;

/// Fixed-capacity name used throughout the runtime structures.
pub type Name = heapless::String<NAME_LEN>;

/// Copy `s` into a [`Name`], rejecting names that do not fit.
pub fn make_name(s: &str) -> Result<Name, ConfigError> {
    Name::try_from(s).map_err(|_| {
        error!("Config: name '{}' longer than {} bytes", s, NAME_LEN);
        ConfigError::CapacityExceeded("name characters")
    })
}

/// Which logic level means "this sensor line is active".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveLevel {
    /// Pull-down wiring: a struck bumper drives the line high.
    #[default]
    High,
    /// Pull-up wiring: a struck bumper pulls the line low.
    Low,
}

/// Top-level machine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineConfig {
    // --- Sensor bus ---
    /// Code lines, least significant bit first.
    pub code_lines: Vec<u8>,
    /// Line that signals "some element changed state".
    pub interrupt_line: u8,
    /// Optional output gating power to the whole actuator bank.
    #[serde(default)]
    pub master_enable_line: Option<u8>,
    #[serde(default)]
    pub active_level: ActiveLevel,
    /// Settle time between the interrupt edge and reading the code lines.
    #[serde(default = "default_debounce_us")]
    pub debounce_us: u32,

    // --- Game elements ---
    pub pumps: Vec<PumpConfig>,
    pub bumpers: Vec<BumperConfig>,
    pub drinks: Vec<DrinkConfig>,

    // --- Scoring ---
    pub pour: PourConfig,
    #[serde(default)]
    pub round: RoundConfig,
}

/// One pump and the actuator line it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpConfig {
    pub name: String,
    pub actuator: u8,
    pub default_run_ms: u64,
    pub min_run_ms: u64,
    pub max_run_ms: u64,
    /// Rest period after each run before the pump accepts another.
    #[serde(default)]
    pub cooldown_ms: Option<u64>,
}

/// One bumper: the code it reports on the bus and what a hit does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BumperConfig {
    pub name: String,
    pub element_code: u32,
    pub pump: String,
    /// Drink credited with this bumper's points.
    #[serde(default)]
    pub drink: Option<String>,
    #[serde(default = "default_points")]
    pub points: u32,
    /// Run the paired pump for its default time on every hit.
    #[serde(default)]
    pub pour_on_hit: bool,
}

/// A named recipe: pump name to raw (un-normalised) ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrinkConfig {
    pub name: String,
    pub recipe: BTreeMap<String, f32>,
}

/// Score-to-pour-time formula: `clamp(score * coefficient, min, max)` seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PourConfig {
    pub min_pour_ms: u64,
    pub max_pour_ms: u64,
    /// Seconds of pour per point of score.
    pub coefficient: f64,
}

/// Application round policy.  `None` leaves round ends to the operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundConfig {
    #[serde(default)]
    pub length_ms: Option<u64>,
}

fn default_debounce_us() -> u32 {
    DEBOUNCE.as_micros() as u32
}

fn default_points() -> u32 {
    1
}

impl PumpConfig {
    /// Validated run-time bounds for this pump.
    pub fn timing(&self) -> Result<PumpTiming, ConfigError> {
        let timing = PumpTiming::new(
            Duration::from_millis(self.default_run_ms),
            Duration::from_millis(self.min_run_ms),
            Duration::from_millis(self.max_run_ms),
        )
        .inspect_err(|e| error!("Config: pump '{}': {}", self.name, e))?;
        match self.cooldown_ms {
            Some(0) => Err(ConfigError::InvalidTiming("cooldown must be positive")),
            Some(ms) => Ok(timing.with_cooldown(Duration::from_millis(ms))),
            None => Ok(timing),
        }
    }
}

impl PourConfig {
    pub fn min(&self) -> Duration {
        Duration::from_millis(self.min_pour_ms)
    }

    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_pour_ms)
    }
}

impl MachineConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_micros(u64::from(self.debounce_us))
    }

    pub fn round_length(&self) -> Option<Duration> {
        self.round.length_ms.map(Duration::from_millis)
    }

    /// Cross-check every section.  The first problem found is returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.code_lines.len() > MAX_CODE_LINES {
            return Err(ConfigError::CapacityExceeded("code lines"));
        }
        self.validate_lines()?;

        unique_names(self.pumps.iter().map(|p| p.name.as_str()))?;
        unique_names(self.bumpers.iter().map(|b| b.name.as_str()))?;
        unique_names(self.drinks.iter().map(|d| d.name.as_str()))?;

        for pump in &self.pumps {
            make_name(&pump.name)?;
            pump.timing()?;
        }

        let lines = self.code_lines.len() as u8;
        let mut codes = BTreeSet::new();
        for bumper in &self.bumpers {
            make_name(&bumper.name)?;
            let code = bumper.element_code;
            if code == 0 {
                error!("Config: bumper '{}' uses reserved code 0", bumper.name);
                return Err(ConfigError::ReservedElementCode);
            }
            if u64::from(code) >= 1u64 << lines {
                error!("Config: bumper '{}' code {} needs more than {} lines", bumper.name, code, lines);
                return Err(ConfigError::CodeOutOfRange { code, lines });
            }
            if !codes.insert(code) {
                error!("Config: bumper '{}' reuses code {}", bumper.name, code);
                return Err(ConfigError::DuplicateElementCode(code));
            }
            if !self.has_pump(&bumper.pump) {
                error!("Config: bumper '{}' names unknown pump '{}'", bumper.name, bumper.pump);
                return Err(ConfigError::UnknownPump);
            }
            if let Some(drink) = &bumper.drink {
                if !self.drinks.iter().any(|d| &d.name == drink) {
                    error!("Config: bumper '{}' names unknown drink '{}'", bumper.name, drink);
                    return Err(ConfigError::UnknownDrink);
                }
            }
        }

        for drink in &self.drinks {
            make_name(&drink.name)?;
            for (pump, weight) in &drink.recipe {
                if !self.has_pump(pump) {
                    error!("Config: drink '{}' names unknown pump '{}'", drink.name, pump);
                    return Err(ConfigError::UnknownPump);
                }
                if !weight.is_finite() || *weight < 0.0 {
                    error!("Config: drink '{}' weight {} for '{}'", drink.name, weight, pump);
                    return Err(ConfigError::InvalidWeight);
                }
            }
            let total: f64 = drink.recipe.values().copied().map(f64::from).sum();
            if !total.is_finite() {
                error!("Config: drink '{}' weights overflow", drink.name);
                return Err(ConfigError::InvalidWeight);
            }
            if total <= 0.0 {
                error!("Config: drink '{}' has no positive weights", drink.name);
                return Err(ConfigError::NonPositiveRecipe);
            }
        }

        if self.pour.max_pour_ms == 0 {
            return Err(ConfigError::InvalidPour("max pour time must be positive"));
        }
        if self.pour.min_pour_ms > self.pour.max_pour_ms {
            return Err(ConfigError::InvalidPour("min pour time above max"));
        }
        if !self.pour.coefficient.is_finite() || self.pour.coefficient <= 0.0 {
            return Err(ConfigError::InvalidPour("coefficient must be positive"));
        }
        if self.round.length_ms == Some(0) {
            return Err(ConfigError::InvalidPour("round length must be positive"));
        }
        Ok(())
    }

    fn has_pump(&self, name: &str) -> bool {
        self.pumps.iter().any(|p| p.name == name)
    }

    /// Every GPIO line has exactly one role.
    fn validate_lines(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        let all = self
            .code_lines
            .iter()
            .copied()
            .chain(core::iter::once(self.interrupt_line))
            .chain(self.master_enable_line)
            .chain(self.pumps.iter().map(|p| p.actuator));
        for line in all {
            if !seen.insert(line) {
                error!("Config: GPIO {} assigned more than once", line);
                return Err(ConfigError::LineInUse(line));
            }
        }
        Ok(())
    }
}

fn unique_names<'a>(names: impl Iterator<Item = &'a str>) -> Result<(), ConfigError> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            error!("Config: name '{}' used twice", name);
            return Err(ConfigError::DuplicateName);
        }
    }
    Ok(())
}

impl Default for MachineConfig {
    fn default() -> Self {
        let pump = |name: &str, actuator| PumpConfig {
            name: name.into(),
            actuator,
            default_run_ms: 5_000,
            min_run_ms: 1_000,
            max_run_ms: 10_000,
            cooldown_ms: None,
        };
        let bumper = |name: &str, element_code, drink: &str| BumperConfig {
            name: name.into(),
            element_code,
            pump: name.into(),
            drink: Some(drink.into()),
            points: 1,
            pour_on_hit: false,
        };
        let drink = |name: &str, recipe: &[(&str, f32)]| DrinkConfig {
            name: name.into(),
            recipe: recipe.iter().map(|(p, w)| ((*p).into(), *w)).collect(),
        };

        Self {
            // Sensor bus
            code_lines: vec![4, 17, 27, 22, 10, 9, 11, 0, 5, 6, 13, 19, 26],
            interrupt_line: 3,
            master_enable_line: Some(2),
            active_level: ActiveLevel::High,
            debounce_us: default_debounce_us(), // 1 ms

            // Game elements
            pumps: vec![
                pump("vodka", 14),
                pump("rum", 15),
                pump("whiskey", 18),
                pump("mixer", 23),
            ],
            bumpers: vec![
                bumper("vodka", 1, "vodka tonic"),
                bumper("rum", 2, "rum and cola"),
                bumper("whiskey", 4, "whiskey"),
            ],
            drinks: vec![
                drink("vodka tonic", &[("vodka", 1.0), ("mixer", 3.0)]),
                drink("rum and cola", &[("rum", 1.0), ("mixer", 2.0)]),
                drink("whiskey", &[("whiskey", 1.0)]),
            ],

            // Scoring
            pour: PourConfig {
                min_pour_ms: 1_000,
                max_pour_ms: 10_000,
                coefficient: 1.0 / 10_000.0,
            },
            round: RoundConfig::default(),
        }
    }
}
