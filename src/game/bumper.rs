//! Bumpers: the scoring elements on the playfield.

use core::time::Duration;

use embedded_hal::digital::OutputPin;
use log::{info, warn};

use super::controller::DrinkController;
use super::drink::DrinkId;
use crate::config::{make_name, Name};
use crate::drivers::pump::{Actuation, PumpId};
use crate::drivers::pump_bank::PumpBank;
use crate::error::{ConfigError, Result};

/// What one hit did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitOutcome {
    /// Hits on this bumper so far, including this one.
    pub hits: u32,
    /// Drink credited and its new score.
    pub scored: Option<(DrinkId, u32)>,
    /// Direct pour on the paired pump, when enabled.
    pub pour: Option<Result<Duration>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bumper {
    name: Name,
    element_code: u32,
    pump: PumpId,
    drink: Option<DrinkId>,
    points: u32,
    pour_on_hit: bool,
    hits: u32,
}

impl Bumper {
    pub fn new(name: &str, element_code: u32, pump: PumpId) -> core::result::Result<Self, ConfigError> {
        if element_code == 0 {
            return Err(ConfigError::ReservedElementCode);
        }
        Ok(Self {
            name: make_name(name)?,
            element_code,
            pump,
            drink: None,
            points: 1,
            pour_on_hit: false,
            hits: 0,
        })
    }

    /// Credit hits to `drink`.
    pub fn with_drink(mut self, drink: DrinkId) -> Self {
        self.drink = Some(drink);
        self
    }

    /// Score delta submitted per hit.
    pub fn with_points(mut self, points: u32) -> Self {
        self.points = points;
        self
    }

    /// Run the paired pump for its default time on every hit.
    pub fn with_pour_on_hit(mut self, enabled: bool) -> Self {
        self.pour_on_hit = enabled;
        self
    }

    /// Handle a hit: count it, submit the score delta, and optionally
    /// start the paired pump.  Neither a refused pump nor a missing drink
    /// aborts the hit.
    pub fn on_hit<O: OutputPin>(
        &mut self,
        drinks: &mut DrinkController,
        pumps: &mut PumpBank<O>,
        act: &mut Actuation<'_>,
    ) -> HitOutcome {
        self.hits = self.hits.saturating_add(1);
        info!("Bumper '{}': hit #{}", self.name, self.hits);

        let scored = self.drink.and_then(|drink| {
            drinks
                .record_points(drink, self.points)
                .inspect_err(|e| warn!("Bumper '{}': score not recorded ({})", self.name, e))
                .ok()
                .map(|score| (drink, score))
        });

        let pour = self.pour_on_hit.then(|| {
            pumps
                .run(self.pump, None, act)
                .inspect_err(|e| warn!("Bumper '{}': pour refused ({})", self.name, e))
        });

        HitOutcome {
            hits: self.hits,
            scored,
            pour,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn element_code(&self) -> u32 {
        self.element_code
    }

    pub fn pump(&self) -> PumpId {
        self.pump
    }

    pub fn drink(&self) -> Option<DrinkId> {
        self.drink
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }
}
