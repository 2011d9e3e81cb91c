//! Drink recipes.
//!
//! A [`Drink`] is a weighting over pumps.  Raw ratios are normalised once
//! at construction so the stored weights always sum to 1; a pour of total
//! duration `T` then asks each pump for `T * weight`.
//!
//! ```text
//!   {vodka: 1, mixer: 3}  ──normalise──▶  {vodka: 0.25, mixer: 0.75}
//!   pour(8 s)             ──────────────▶ vodka.run(2 s), mixer.run(6 s)
//! ```
//!
//! Every pump is started independently; each pump's own interlock and
//! clamp still apply, and one pump refusing does not stop the others.

use core::time::Duration;

use embedded_hal::digital::OutputPin;
use log::{info, warn};

use crate::config::{make_name, Name};
use crate::drivers::pump::{Actuation, PumpId};
use crate::drivers::pump_bank::PumpBank;
use crate::error::{ConfigError, Result};

/// Maximum number of pumps in one recipe.
pub const MAX_RECIPE: usize = 8;

/// Index of a drink inside its [`DrinkController`](super::controller::DrinkController).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrinkId(pub u8);

#[derive(Debug, Clone, PartialEq)]
pub struct Drink {
    name: Name,
    /// Normalised weights, in the order given at construction.
    recipe: heapless::Vec<(PumpId, f64), MAX_RECIPE>,
}

impl Drink {
    /// Build a drink from raw, non-negative ratios.
    ///
    /// Zero-weight entries are accepted but dropped rather than stored as a
    /// zero share, which every pump would otherwise raise to its minimum
    /// run time.  Weights are summed and normalised in `f64`, so even
    /// `f32::MAX` ratios keep the stored weights summing to 1.
    pub fn new(name: &str, raw: &[(PumpId, f32)]) -> core::result::Result<Self, ConfigError> {
        let name = make_name(name)?;

        let mut total = 0.0f64;
        for (i, (pump, weight)) in raw.iter().enumerate() {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(ConfigError::InvalidWeight);
            }
            if raw[..i].iter().any(|(p, _)| p == pump) {
                return Err(ConfigError::DuplicateRecipePump);
            }
            total += f64::from(*weight);
        }
        if !total.is_finite() {
            warn!("Drink '{}': weights overflow", name);
            return Err(ConfigError::InvalidWeight);
        }
        if total <= 0.0 {
            warn!("Drink '{}': weights sum to {}", name, total);
            return Err(ConfigError::NonPositiveRecipe);
        }

        let mut recipe = heapless::Vec::new();
        for &(pump, weight) in raw.iter().filter(|(_, w)| *w > 0.0) {
            recipe
                .push((pump, f64::from(weight) / total))
                .map_err(|_| ConfigError::CapacityExceeded("recipe pumps"))?;
        }
        Ok(Self { name, recipe })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn recipe(&self) -> &[(PumpId, f64)] {
        &self.recipe
    }

    /// Normalised weight of `pump`, if it is part of the recipe.
    pub fn weight(&self, pump: PumpId) -> Option<f64> {
        self.recipe.iter().find(|(p, _)| *p == pump).map(|(_, w)| *w)
    }

    /// Split `total` across the recipe.  Shares too large for a
    /// `Duration` saturate; the pump clamp caps them anyway.
    pub fn portions(&self, total: Duration) -> impl Iterator<Item = (PumpId, Duration)> + '_ {
        let secs = total.as_secs_f64();
        self.recipe.iter().map(move |&(pump, weight)| {
            let share = Duration::try_from_secs_f64(secs * weight).unwrap_or(Duration::MAX);
            (pump, share)
        })
    }

    /// Start every pump in the recipe for its share of `total`.
    pub fn pour<O: OutputPin>(
        &self,
        total: Duration,
        pumps: &mut PumpBank<O>,
        act: &mut Actuation<'_>,
    ) -> PourReport {
        info!("Drink '{}': pouring {:?}", self.name, total);
        let outcomes = self
            .portions(total)
            .map(|(pump, share)| {
                let result = pumps.run(pump, Some(share), act);
                if let Err(e) = result {
                    warn!("Drink '{}': {:?} not started ({})", self.name, pump, e);
                }
                PumpPour {
                    pump,
                    requested: share,
                    result,
                }
            })
            .collect();
        PourReport { pumps: outcomes }
    }
}

/// What happened to one pump during a pour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PumpPour {
    pub pump: PumpId,
    /// Share of the total before the pump's own clamp.
    pub requested: Duration,
    /// Effective run time, or why the pump refused.
    pub result: Result<Duration>,
}

/// Per-pump outcome of a [`Drink::pour`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PourReport {
    pub pumps: heapless::Vec<PumpPour, MAX_RECIPE>,
}

impl PourReport {
    /// Number of pumps that actually started.
    pub fn started(&self) -> usize {
        self.pumps.iter().filter(|p| p.result.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &PumpPour> {
        self.pumps.iter().filter(|p| p.result.is_err())
    }

    pub fn all_started(&self) -> bool {
        self.started() == self.pumps.len()
    }
}
