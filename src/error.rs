//! Unified error types for the bumperbar controller.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! runtime loops' error handling uniform.  All variants are `Copy` so they
//! can be returned from the interrupt path and collected into pour reports
//! without allocation.
//!
//! Two families matter operationally:
//!
//! - [`ConfigError`] is fatal at setup.  Nothing is wired if any element,
//!   pump, or drink fails validation.
//! - [`PumpStateError`] is a sequencing bug in the caller.  It aborts only
//!   the offending action; the dispatch loop keeps running.
//!
//! Unrecognised element codes and "no winner yet" are *not* errors.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Setup-time wiring or configuration is invalid.
    Config(ConfigError),
    /// A pump was commanded from the wrong state.
    Pump(PumpStateError),
    /// A sensor line could not be read.
    Sensor(SensorError),
    /// An actuator line could not be driven.
    Actuator(ActuatorError),
    /// The deferred-action queue has no free slot.
    SchedulerFull,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Pump(e) => write!(f, "pump: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::SchedulerFull => write!(f, "scheduler: no free timer slot"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Another element already owns this code.
    DuplicateElementCode(u32),
    /// Code 0 means "nothing pressed" and cannot identify an element.
    ReservedElementCode,
    /// The code needs more sensor lines than are configured.
    CodeOutOfRange { code: u32, lines: u8 },
    /// Recipe weights sum to zero (or less).
    NonPositiveRecipe,
    /// A recipe weight is negative or not finite.
    InvalidWeight,
    /// The same pump appears twice in one recipe.
    DuplicateRecipePump,
    /// A bumper or recipe names a pump that does not exist.
    UnknownPump,
    /// A bumper names a drink that does not exist.
    UnknownDrink,
    /// Two pumps, bumpers, or drinks share a name.
    DuplicateName,
    /// A GPIO line is assigned to more than one role.
    LineInUse(u8),
    /// A pump's run-time bounds are inconsistent.
    InvalidTiming(&'static str),
    /// The pour-time bounds or coefficient are invalid.
    InvalidPour(&'static str),
    /// A fixed-capacity table is full.
    CapacityExceeded(&'static str),
    /// No configuration source was found.
    NotFound,
    /// The configuration source could not be parsed.
    Corrupted,
    /// The configuration source could not be read or written.
    Io,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateElementCode(code) => write!(f, "element code {code} already registered"),
            Self::ReservedElementCode => write!(f, "element code 0 is reserved"),
            Self::CodeOutOfRange { code, lines } => {
                write!(f, "element code {code} not encodable with {lines} lines")
            }
            Self::NonPositiveRecipe => write!(f, "recipe weights must sum to more than zero"),
            Self::InvalidWeight => write!(f, "recipe weight must be finite and non-negative"),
            Self::DuplicateRecipePump => write!(f, "pump listed twice in recipe"),
            Self::UnknownPump => write!(f, "unknown pump"),
            Self::UnknownDrink => write!(f, "unknown drink"),
            Self::DuplicateName => write!(f, "duplicate name"),
            Self::LineInUse(line) => write!(f, "line {line} assigned more than once"),
            Self::InvalidTiming(msg) => write!(f, "invalid pump timing: {msg}"),
            Self::InvalidPour(msg) => write!(f, "invalid pour settings: {msg}"),
            Self::CapacityExceeded(what) => write!(f, "too many {what}"),
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::Io => write!(f, "config I/O failed"),
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Pump state errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpStateError {
    /// `run` on a pump that is running or cooling down.
    NotIdle,
    /// Deferred stop fired on a pump that is not running.
    NotRunning,
    /// Cooldown expiry fired on a pump that is not cooling down.
    NotCoolingDown,
}

impl fmt::Display for PumpStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotIdle => write!(f, "pump must be idle to start"),
            Self::NotRunning => write!(f, "pump must be running to stop"),
            Self::NotCoolingDown => write!(f, "pump must be cooling down to finish cooldown"),
        }
    }
}

impl From<PumpStateError> for Error {
    fn from(e: PumpStateError) -> Self {
        Self::Pump(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// GPIO read returned an error.
    GpioReadFailed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
