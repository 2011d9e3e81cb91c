//! The set of pumps on one machine.
//!
//! Owns every [`Pump`] and routes timer expiries back to the pump they
//! belong to.  Pump ids are indices into the bank, assigned in
//! registration order.

use embedded_hal::digital::OutputPin;
use log::info;

use super::pump::{Actuation, Pump, PumpId, PumpTiming};
use crate::error::{ConfigError, Error, Result};
use crate::timer::TimerAction;

/// Maximum number of pumps on one machine.
pub const MAX_PUMPS: usize = 8;

pub struct PumpBank<O> {
    pumps: heapless::Vec<Pump<O>, MAX_PUMPS>,
}

impl<O: OutputPin> Default for PumpBank<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: OutputPin> PumpBank<O> {
    pub fn new() -> Self {
        Self {
            pumps: heapless::Vec::new(),
        }
    }

    /// Add a pump that exclusively owns `actuator`.
    pub fn add(&mut self, name: &str, actuator: O, timing: PumpTiming) -> Result<PumpId> {
        if self.find(name).is_some() {
            return Err(ConfigError::DuplicateName.into());
        }
        let id = PumpId(self.pumps.len() as u8);
        let pump = Pump::new(id, name, actuator, timing)?;
        self.pumps
            .push(pump)
            .map_err(|_| ConfigError::CapacityExceeded("pumps"))?;
        info!("PumpBank: '{}' registered as {:?}", name, id);
        Ok(id)
    }

    pub fn find(&self, name: &str) -> Option<PumpId> {
        self.pumps.iter().find(|p| p.name() == name).map(Pump::id)
    }

    pub fn get(&self, id: PumpId) -> Option<&Pump<O>> {
        self.pumps.get(id.0 as usize)
    }

    /// Start a run on pump `id`; see [`Pump::run`].
    pub fn run(
        &mut self,
        id: PumpId,
        requested: Option<core::time::Duration>,
        act: &mut Actuation<'_>,
    ) -> Result<core::time::Duration> {
        self.get_mut(id)?.run(requested, act)
    }

    /// Execute an expired timer action.
    pub fn fire(&mut self, action: TimerAction, act: &mut Actuation<'_>) -> Result<()> {
        match action {
            TimerAction::StopPump(id) => self.get_mut(id)?.stop(act),
            TimerAction::EndCooldown(id) => self.get_mut(id)?.end_cooldown(act),
        }
    }

    pub fn is_running(&self, id: PumpId) -> bool {
        self.get(id).is_some_and(Pump::is_running)
    }

    pub fn any_running(&self) -> bool {
        self.pumps.iter().any(Pump::is_running)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pump<O>> {
        self.pumps.iter()
    }

    pub fn len(&self) -> usize {
        self.pumps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pumps.is_empty()
    }

    fn get_mut(&mut self, id: PumpId) -> Result<&mut Pump<O>> {
        self.pumps
            .get_mut(id.0 as usize)
            .ok_or(Error::Config(ConfigError::UnknownPump))
    }
}
