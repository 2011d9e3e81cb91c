//! Fuzz target: `ElementRegistry::dispatch`
//!
//! Registers a few handlers, then dispatches an arbitrary code stream.
//! Only registered codes reach a handler; everything else except the idle
//! code lands in the unrecognised counter.
//!
//! cargo fuzz run fuzz_code_dispatch

#![no_main]

use bumperbar::registry::{ElementRegistry, IDLE_CODE};
use libfuzzer_sys::fuzz_target;

const KNOWN: [u32; 4] = [1, 2, 4, 0x8000];

fuzz_target!(|data: &[u8]| {
    let mut registry: ElementRegistry<u32> = ElementRegistry::new();
    for code in KNOWN {
        registry.register(code, 0).unwrap();
    }

    let mut unknown = 0u32;
    for chunk in data.chunks_exact(2) {
        let code = u32::from(u16::from_le_bytes([chunk[0], chunk[1]]));
        match registry.dispatch(code) {
            Some(hits) => {
                assert!(KNOWN.contains(&code));
                *hits += 1;
            }
            None if code != IDLE_CODE => unknown += 1,
            None => {}
        }
    }
    assert_eq!(registry.unrecognised_count(), unknown);
});
