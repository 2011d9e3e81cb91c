//! Fuzz target: `parse_config`
//!
//! Arbitrary bytes must never panic the parser, and anything it accepts
//! must already satisfy `MachineConfig::validate`.
//!
//! cargo fuzz run fuzz_config_parse

#![no_main]

use bumperbar::adapters::config_file::parse_config;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = parse_config(text) {
        assert!(config.validate().is_ok());
    }
});
