//! Drink controller: scoring, winner selection, and pour time.
//!
//! Sole owner of the per-drink scores.  Bumpers submit score deltas
//! through [`DrinkController::record_points`]; nothing else mutates them.
//!
//! ## Pour time
//!
//! ```text
//!   raw  = score * coefficient            (seconds)
//!   pour = median(min_pour, raw, max_pour)
//! ```
//!
//! The median of three with ordered bounds is exactly `clamp`.
//!
//! ## Rounds
//!
//! Scores are never cleared implicitly.  Whoever owns round policy calls
//! [`DrinkController::reset_round`] after a pour has been dispatched.

use core::time::Duration;

use embedded_hal::digital::OutputPin;
use log::{debug, info};

use super::drink::{Drink, DrinkId, PourReport};
use crate::config::PourConfig;
use crate::drivers::pump::Actuation;
use crate::drivers::pump_bank::PumpBank;
use crate::error::ConfigError;

/// Maximum number of drinks on the menu.
pub const MAX_DRINKS: usize = 8;

/// Middle value of three.  With `lo <= hi`, `median_of_three(lo, x, hi)`
/// equals `x.clamp(lo, hi)`.
pub fn median_of_three<T: Ord>(a: T, b: T, c: T) -> T {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if c <= lo {
        lo
    } else if c >= hi {
        hi
    } else {
        c
    }
}

/// Result of a dispatched [`DrinkController::pour_winner`].
#[derive(Debug, Clone, PartialEq)]
pub struct Poured {
    pub drink: DrinkId,
    pub score: u32,
    pub pour_time: Duration,
    pub report: PourReport,
}

struct Entry {
    drink: Drink,
    score: u32,
}

pub struct DrinkController {
    /// Registration order doubles as tie-break order.
    entries: heapless::Vec<Entry, MAX_DRINKS>,
    min_pour: Duration,
    max_pour: Duration,
    coefficient: f64,
}

impl DrinkController {
    pub fn new(min_pour: Duration, max_pour: Duration, coefficient: f64) -> core::result::Result<Self, ConfigError> {
        if max_pour.is_zero() {
            return Err(ConfigError::InvalidPour("max pour time must be positive"));
        }
        if min_pour > max_pour {
            return Err(ConfigError::InvalidPour("min pour time above max"));
        }
        if !coefficient.is_finite() || coefficient <= 0.0 {
            return Err(ConfigError::InvalidPour("coefficient must be positive"));
        }
        Ok(Self {
            entries: heapless::Vec::new(),
            min_pour,
            max_pour,
            coefficient,
        })
    }

    pub fn from_config(pour: &PourConfig) -> core::result::Result<Self, ConfigError> {
        Self::new(pour.min(), pour.max(), pour.coefficient)
    }

    /// Put `drink` on the menu with a zero score.
    pub fn add_drink(&mut self, drink: Drink) -> core::result::Result<DrinkId, ConfigError> {
        if self.find(drink.name()).is_some() {
            return Err(ConfigError::DuplicateName);
        }
        let id = DrinkId(self.entries.len() as u8);
        info!("Drinks: '{}' registered as {:?}", drink.name(), id);
        self.entries
            .push(Entry { drink, score: 0 })
            .map_err(|_| ConfigError::CapacityExceeded("drinks"))?;
        Ok(id)
    }

    pub fn find(&self, name: &str) -> Option<DrinkId> {
        self.entries
            .iter()
            .position(|e| e.drink.name() == name)
            .map(|i| DrinkId(i as u8))
    }

    pub fn drink(&self, id: DrinkId) -> Option<&Drink> {
        self.entry(id).map(|e| &e.drink)
    }

    /// Every drink with its current score, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (DrinkId, &Drink, u32)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (DrinkId(i as u8), &e.drink, e.score))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ── Scoring ───────────────────────────────────────────────

    /// One point for `drink`.  Returns the new score.
    pub fn record_hit(&mut self, drink: DrinkId) -> core::result::Result<u32, ConfigError> {
        self.record_points(drink, 1)
    }

    /// Add `points` to `drink`.  Returns the new score.
    pub fn record_points(&mut self, drink: DrinkId, points: u32) -> core::result::Result<u32, ConfigError> {
        let entry = self
            .entries
            .get_mut(drink.0 as usize)
            .ok_or(ConfigError::UnknownDrink)?;
        entry.score = entry.score.saturating_add(points);
        debug!("Drinks: '{}' +{} = {}", entry.drink.name(), points, entry.score);
        Ok(entry.score)
    }

    /// Score of `drink`; 0 for an unknown id.
    pub fn score(&self, drink: DrinkId) -> u32 {
        self.entry(drink).map_or(0, |e| e.score)
    }

    pub fn total_score(&self) -> u32 {
        self.entries
            .iter()
            .fold(0u32, |acc, e| acc.saturating_add(e.score))
    }

    /// Zero every score.
    pub fn reset_round(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.score = 0;
        }
        info!("Drinks: round reset");
    }

    // ── Pour ──────────────────────────────────────────────────

    pub fn compute_pour_time(&self, score: u32) -> Duration {
        let raw = Duration::try_from_secs_f64(f64::from(score) * self.coefficient)
            .unwrap_or(Duration::MAX);
        median_of_three(self.min_pour, raw, self.max_pour)
    }

    /// Highest-scoring drink.  Ties go to the drink registered first;
    /// `None` until some drink scores above zero.
    pub fn determine_winner(&self) -> Option<DrinkId> {
        let mut best: Option<(usize, u32)> = None;
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.score > best.map_or(0, |(_, s)| s) {
                best = Some((i, entry.score));
            }
        }
        best.map(|(i, _)| DrinkId(i as u8))
    }

    /// Pour the winning drink for a time derived from its score.
    ///
    /// `None` when nothing has scored yet; no pump is touched.  Per-pump
    /// refusals are reported in [`Poured::report`].  Scores are left as
    /// they are.
    pub fn pour_winner<O: OutputPin>(
        &self,
        pumps: &mut PumpBank<O>,
        act: &mut Actuation<'_>,
    ) -> Option<Poured> {
        let Some(drink) = self.determine_winner() else {
            debug!("Drinks: no winner yet, nothing to pour");
            return None;
        };
        let entry = self.entry(drink)?;
        let pour_time = self.compute_pour_time(entry.score);
        info!(
            "Drinks: '{}' wins with {} points, pouring {:?}",
            entry.drink.name(),
            entry.score,
            pour_time
        );
        let report = entry.drink.pour(pour_time, pumps, act);
        Some(Poured {
            drink,
            score: entry.score,
            pour_time,
            report,
        })
    }

    pub fn pour_bounds(&self) -> (Duration, Duration) {
        (self.min_pour, self.max_pour)
    }

    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    fn entry(&self, id: DrinkId) -> Option<&Entry> {
        self.entries.get(id.0 as usize)
    }
}
