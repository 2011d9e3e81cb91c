//! Interrupt line notification.
//!
//! ## Hardware
//!
//! One dedicated line goes active whenever any element changes state.
//! The platform edge ISR calls [`InterruptSignal::notify`]; the interrupt
//! task awaits [`InterruptSignal::wait`], sleeps for the debounce period
//! so the code lines settle, and only then reads the element code.
//!
//! Edges arriving while a previous one is still debouncing coalesce into
//! a single read, which sees the settled bus.

use core::sync::atomic::{AtomicU32, Ordering};
use core::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Settle time between the interrupt edge and sampling the code lines.
pub const DEBOUNCE: Duration = Duration::from_millis(1);

/// Edge notification shared between ISR context and the interrupt task.
pub struct InterruptSignal {
    signal: Signal<CriticalSectionRawMutex, ()>,
    /// Raw edge count, including coalesced edges.
    edges: AtomicU32,
}

impl Default for InterruptSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptSignal {
    pub const fn new() -> Self {
        Self {
            signal: Signal::new(),
            edges: AtomicU32::new(0),
        }
    }

    /// ISR handler. Register this on the interrupt line's active edge.
    /// Safe to call from interrupt context.
    pub fn notify(&self) {
        self.edges.fetch_add(1, Ordering::Relaxed);
        self.signal.signal(());
    }

    /// Wait for the next edge.
    pub async fn wait(&self) {
        self.signal.wait().await;
    }

    /// Consume a pending edge without waiting.
    pub fn take_pending(&self) -> bool {
        self.signal.try_take().is_some()
    }

    /// Edges seen since boot.
    pub fn edge_count(&self) -> u32 {
        self.edges.load(Ordering::Relaxed)
    }
}
