//! Element registry: element code → owning game element.
//!
//! Populated once during setup and read-only while interrupts are live.
//! It is the single authority on which element owns which code:
//!
//! - a code can be owned by at most one element;
//! - code 0 is "nothing pressed" and can never be owned.
//!
//! Dispatching a code nobody owns is *not* an error.  A multi-line bus
//! picks up noise and partial reads, so unrecognised codes are logged,
//! counted, and dropped.

use log::{debug, warn};

use crate::error::ConfigError;

/// Maximum number of registered elements (power of two for the index map).
pub const MAX_ELEMENTS: usize = 32;

/// Reserved "idle / no hit" code.
pub const IDLE_CODE: u32 = 0;

pub struct ElementRegistry<H> {
    elements: heapless::FnvIndexMap<u32, H, MAX_ELEMENTS>,
    unrecognised: u32,
}

impl<H> Default for ElementRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> ElementRegistry<H> {
    pub fn new() -> Self {
        Self {
            elements: heapless::FnvIndexMap::new(),
            unrecognised: 0,
        }
    }

    /// Give `handler` ownership of `code`.
    pub fn register(&mut self, code: u32, handler: H) -> Result<(), ConfigError> {
        if code == IDLE_CODE {
            return Err(ConfigError::ReservedElementCode);
        }
        if self.elements.contains_key(&code) {
            return Err(ConfigError::DuplicateElementCode(code));
        }
        self.elements
            .insert(code, handler)
            .map_err(|_| ConfigError::CapacityExceeded("elements"))?;
        Ok(())
    }

    /// Look up the element owning `code`.  `None` for idle or noise.
    pub fn dispatch(&mut self, code: u32) -> Option<&mut H> {
        if code == IDLE_CODE {
            debug!("Registry: idle code, nothing to dispatch");
            return None;
        }
        if !self.elements.contains_key(&code) {
            self.unrecognised = self.unrecognised.saturating_add(1);
            warn!(
                "Registry: unrecognised code {:#06b} ignored ({} so far)",
                code, self.unrecognised
            );
            return None;
        }
        self.elements.get_mut(&code)
    }

    pub fn get(&self, code: u32) -> Option<&H> {
        self.elements.get(&code)
    }

    /// Registered elements in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &H)> {
        self.elements.iter().map(|(code, h)| (*code, h))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Codes dispatched that no element owns.
    pub fn unrecognised_count(&self) -> u32 {
        self.unrecognised
    }
}
