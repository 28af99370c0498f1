//! Byte-level fixtures for legacy containers.

/// Legacy container header.
pub const OMF_SIGNATURE: &[u8; 4] = b"OMFI";

/// Nulls placed between path strings so each one is scanned on its own.
pub const PADDING: usize = 16;

/// Legacy container bytes naming each of `paths` as a null-terminated string.
pub fn legacy_container(paths: &[&str]) -> Vec<u8> {
    let mut data = OMF_SIGNATURE.to_vec();
    data.extend_from_slice(&[0u8; PADDING]);
    for path in paths {
        data.extend_from_slice(path.as_bytes());
        data.extend_from_slice(&[0u8; PADDING]);
    }
    data
}

/// Legacy container bytes with the given latin-1 encoded path.
pub fn legacy_container_latin1(path: &str) -> Vec<u8> {
    let mut data = OMF_SIGNATURE.to_vec();
    data.extend_from_slice(&[0u8; PADDING]);
    data.extend(path.chars().map(|c| c as u32 as u8));
    data.extend_from_slice(&[0u8; PADDING]);
    data
}

/// Deterministic filler bytes that contain no path-like runs.
pub fn noise(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 7) as u8).collect()
}
