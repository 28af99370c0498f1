#![no_main]

use libfuzzer_sys::fuzz_target;
use medialink_aaf::property::{set_keys, vector_keys, PropertySet};

fuzz_target!(|data: &[u8]| {
    if let Ok(set) = PropertySet::parse(data) {
        let _ = PropertySet::parse(&set.to_bytes());
    }
    let _ = vector_keys(data);
    let _ = set_keys(data);
});
