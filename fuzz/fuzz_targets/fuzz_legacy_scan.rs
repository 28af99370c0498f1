#![no_main]

use libfuzzer_sys::fuzz_target;
use medialink_core::legacy::scan_bytes;
use medialink_core::{ClipResolver, ScanLimits};

fuzz_target!(|data: &[u8]| {
    let limits = ScanLimits {
        max_null_segments: 1_000,
        max_aggressive_matches: 100,
        ..ScanLimits::default()
    };
    let _ = scan_bytes(data, &ClipResolver::new("/fuzz"), &limits);
});
