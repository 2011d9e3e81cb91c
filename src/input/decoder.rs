//! Binary-encoded multiplexed input decoder.
//!
//! ## Hardware
//!
//! Every bumper on the playfield drives a diode matrix that sets a unique
//! combination of the shared code lines.  Line `i` (in configured order)
//! carries bit `2^i`, so the element code is the OR of the bits of every
//! active line:
//!
//! | Line  | 0 | 1 | 2 | ... | n-1     |
//! |-------|---|---|---|-----|---------|
//! | Bit   | 1 | 2 | 4 | ... | 2^(n-1) |
//!
//! Code 0 means nothing is pressed.  The code is read fresh every time;
//! nothing is cached between interrupts.

use embedded_hal::digital::{Error as _, InputPin};
use log::warn;

use crate::config::ActiveLevel;
use crate::error::{ConfigError, SensorError};

/// Widest supported bus.
pub const MAX_CODE_LINES: usize = 16;

/// Read the element code from `lines`, least significant bit first.
pub fn read_code<P: InputPin>(lines: &mut [P], level: ActiveLevel) -> Result<u32, SensorError> {
    let mut code = 0u32;
    for (bit, line) in lines.iter_mut().enumerate() {
        let high = line.is_high().map_err(|e| {
            warn!("Decoder: code line {} read failed ({:?})", bit, e.kind());
            SensorError::GpioReadFailed
        })?;
        let active = match level {
            ActiveLevel::High => high,
            ActiveLevel::Low => !high,
        };
        if active {
            code |= 1 << bit;
        }
    }
    Ok(code)
}

/// The configured bank of code lines.
pub struct InputDecoder<P> {
    lines: heapless::Vec<P, MAX_CODE_LINES>,
    level: ActiveLevel,
}

impl<P: InputPin> InputDecoder<P> {
    pub fn new(lines: impl IntoIterator<Item = P>, level: ActiveLevel) -> Result<Self, ConfigError> {
        let mut bank = heapless::Vec::new();
        for line in lines {
            bank.push(line)
                .map_err(|_| ConfigError::CapacityExceeded("code lines"))?;
        }
        Ok(Self { lines: bank, level })
    }

    /// Sample every code line now.
    pub fn read_code(&mut self) -> Result<u32, SensorError> {
        read_code(&mut self.lines, self.level)
    }

    pub fn line_count(&self) -> u8 {
        self.lines.len() as u8
    }

    /// Largest code this bus can express.
    pub fn max_code(&self) -> u32 {
        ((1u64 << self.lines.len()) - 1) as u32
    }

    /// Whether `code` can ever be produced by this bus.
    pub fn can_encode(&self, code: u32) -> bool {
        code <= self.max_code()
    }
}
