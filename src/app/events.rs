//! Outbound application events.
//!
//! The [`GameService`](super::service::GameService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, drive a score
//! display, etc.

use core::time::Duration;

use crate::config::Name;
use crate::error::Error;

/// Structured events emitted by the game core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service is wired and the actuator bank is powered.
    Started,

    /// The master enable line changed.
    MasterEnabled(bool),

    /// A registered element was hit.
    ElementHit { code: u32, bumper: Name, hits: u32 },

    /// A code nobody owns was read off the bus.
    UnrecognisedCode(u32),

    /// A drink's score changed.
    ScoreChanged { drink: Name, score: u32, total: u32 },

    /// A pump entered Running.
    PumpStarted { pump: Name, run_for: Duration },

    /// A pump is back to Idle and accepts runs again.
    PumpIdle { pump: Name },

    /// The winning drink was poured.
    Poured { drink: Name, score: u32, total: Duration },

    /// Scores were cleared.
    RoundReset,

    /// An action was refused or failed; the service keeps running.
    ActionFailed(Error),
}
