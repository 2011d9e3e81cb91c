//! Host time adapters.
//!
//! - [`HostClock`]: monotonic time since construction, via `std::time::Instant`.
//! - [`ReactorSleep`]: cooperative sleep on the `async-io-mini` reactor,
//!   which yields to the executor instead of blocking the thread.

use core::time::Duration;
use std::time::Instant;

use async_io_mini::Timer;

use crate::app::ports::{Clock, SleepPort};

/// Monotonic clock starting at zero when created ("boot").
#[derive(Debug, Clone, Copy)]
pub struct HostClock {
    start: Instant,
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HostClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for HostClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReactorSleep;

impl SleepPort for ReactorSleep {
    async fn sleep(&self, duration: Duration) {
        Timer::after(duration).await;
    }
}
