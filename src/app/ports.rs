//! Port traits: the hexagonal boundary between the game core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ GameService (domain)
//! ```
//!
//! Digital lines are not ports here: the core takes `embedded-hal` pins
//! directly.  These traits cover everything else the core or the runtime
//! needs from its environment.

use core::time::Duration;

use crate::config::MachineConfig;
use crate::error::ConfigError;

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / display)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log, score
/// display, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the machine configuration.
///
/// Implementations MUST validate before persisting.  Invalid values are
/// rejected, not clamped.
pub trait ConfigPort {
    /// Load the configuration.
    /// Returns [`MachineConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<MachineConfig, ConfigError>;

    /// Validate and persist the configuration.
    fn save(&self, config: &MachineConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Time ports
// ───────────────────────────────────────────────────────────────

/// Monotonic time since boot.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Cooperative delay.  Must yield to other tasks, never block the thread.
#[allow(async_fn_in_trait)]
pub trait SleepPort {
    async fn sleep(&self, duration: Duration);
}
