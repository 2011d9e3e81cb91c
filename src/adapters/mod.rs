//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements          | Connects to                   |
//! |---------------|---------------------|-------------------------------|
//! | `config_file` | ConfigPort          | JSON file on disk             |
//! | `log_sink`    | EventSink           | `log` facade / console        |
//! | `sim_gpio`    | InputPin, OutputPin | in-memory lines (host, tests) |
//! | `time`        | Clock, SleepPort    | `Instant`, async-io-mini timer|

pub mod config_file;
pub mod log_sink;
pub mod sim_gpio;
pub mod time;
