//! Bumperbar controller library.
//!
//! Exposes the game core (decoder, registry, pumps, scoring) and its
//! adapters for the simulation binary and for integration testing.
//! Hardware is reached only through `embedded-hal` pins, so the same core
//! runs against real GPIO or the in-memory lines in [`adapters::sim_gpio`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod game;
pub mod input;
pub mod registry;
pub mod runtime;
pub mod timer;

pub use error::{Error, Result};
