//! In-memory GPIO for host simulation and tests.
//!
//! A [`SimLine`] is a shared logic level: clones observe the same wire, so
//! a test can hand one clone to the decoder or a pump and keep another to
//! drive or inspect it.  Reads and writes can be made to fail on demand.
//!
//! Single-threaded only (`Rc`), matching the cooperative runtime.

use std::cell::Cell;
use std::rc::Rc;

use embedded_hal::digital::{ErrorKind, ErrorType, InputPin, OutputPin};

/// Injected GPIO failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimPinError;

impl embedded_hal::digital::Error for SimPinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Debug, Default)]
struct Wire {
    level: Cell<bool>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
    writes: Cell<u32>,
}

/// One simulated digital line.
#[derive(Debug, Clone, Default)]
pub struct SimLine {
    wire: Rc<Wire>,
}

impl SimLine {
    /// A line resting low.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(high: bool) -> Self {
        let line = Self::new();
        line.set(high);
        line
    }

    /// Drive the level from outside (a sensor changing state).
    pub fn set(&self, high: bool) {
        self.wire.level.set(high);
    }

    pub fn is_set(&self) -> bool {
        self.wire.level.get()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.wire.fail_reads.set(fail);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.wire.fail_writes.set(fail);
    }

    /// Successful writes through the pin traits.
    pub fn write_count(&self) -> u32 {
        self.wire.writes.get()
    }

    fn read(&self) -> Result<bool, SimPinError> {
        if self.wire.fail_reads.get() {
            return Err(SimPinError);
        }
        Ok(self.wire.level.get())
    }

    fn write(&self, high: bool) -> Result<(), SimPinError> {
        if self.wire.fail_writes.get() {
            return Err(SimPinError);
        }
        self.wire.level.set(high);
        self.wire.writes.set(self.wire.writes.get().saturating_add(1));
        Ok(())
    }
}

impl ErrorType for SimLine {
    type Error = SimPinError;
}

impl InputPin for SimLine {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.read()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.read().map(|high| !high)
    }
}

impl OutputPin for SimLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true)
    }
}

/// A bank of code lines driven together, as the bumper matrix would.
#[derive(Debug, Clone)]
pub struct SimBus {
    lines: Vec<SimLine>,
}

impl SimBus {
    pub fn new(width: usize) -> Self {
        Self {
            lines: (0..width).map(|_| SimLine::new()).collect(),
        }
    }

    /// Wrap existing lines, least significant bit first.
    pub fn from_lines(lines: Vec<SimLine>) -> Self {
        Self { lines }
    }

    /// Handles onto every line, for the decoder.
    pub fn lines(&self) -> Vec<SimLine> {
        self.lines.clone()
    }

    /// # Panics
    ///
    /// If `index` is outside the bus.
    pub fn line(&self, index: usize) -> &SimLine {
        &self.lines[index]
    }

    /// Set every line so the bus carries `code` (active-high).
    pub fn drive(&self, code: u32) {
        for (bit, line) in self.lines.iter().enumerate() {
            line.set(code & (1 << bit) != 0);
        }
    }

    /// Drop every line back to idle.
    pub fn release(&self) {
        self.drive(0);
    }

    pub fn width(&self) -> usize {
        self.lines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_wire() {
        let a = SimLine::new();
        let mut b = a.clone();
        b.set_high().unwrap();
        assert!(a.is_set());
        assert_eq!(a.write_count(), 1);
    }

    #[test]
    fn injected_failures_surface_as_errors() {
        let mut line = SimLine::with_level(true);
        line.fail_reads(true);
        assert!(line.is_high().is_err());
        line.fail_writes(true);
        assert!(line.set_low().is_err());
        assert!(line.is_set());
    }

    #[test]
    fn bus_drives_binary_code() {
        let bus = SimBus::new(4);
        bus.drive(0b1010);
        let levels: Vec<bool> = (0..4).map(|i| bus.line(i).is_set()).collect();
        assert_eq!(levels, vec![false, true, false, true]);
        bus.release();
        assert!(!bus.line(3).is_set());
    }
}
