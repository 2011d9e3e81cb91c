//! Application core: game orchestration, zero platform code.
//!
//! This module wires the decoder, registry, pumps, and drink controller
//! into one service.  Everything outside the core is reached through the
//! **port traits** in [`ports`], keeping this layer fully testable with
//! simulated pins and recording sinks.

pub mod events;
pub mod ports;
pub mod service;
