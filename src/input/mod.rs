//! Encoded sensor bus: decode the code lines, and the interrupt line that
//! says when to read them.

pub mod decoder;
pub mod interrupt;
