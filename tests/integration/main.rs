//! Integration test driver for `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against simulated pins and a recording sink.  All tests run on the
//! host with no real hardware required.

mod game_flow_tests;
mod mock_board;
mod runtime_tests;
