//! Actuator drivers.
//!
//! | Driver      | Hardware                                   |
//! |-------------|--------------------------------------------|
//! | `pump`      | One dispensing pump on a digital output    |
//! | `pump_bank` | Every pump on the machine, timer routing   |

pub mod pump;
pub mod pump_bank;
