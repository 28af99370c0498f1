//! Path-candidate strategies over raw container bytes.
//!
//! Each strategy is independent: it yields resolved candidate paths in
//! discovery order or fails as a whole, in which case the caller drops its
//! contribution and keeps the others.

use regex::bytes::Regex;
use thiserror::Error;

use crate::decode::{decode_first, PATH_ENCODINGS, SEGMENT_ENCODINGS};
use crate::limits::ScanLimits;
use crate::paths::{extension_lower, has_separator, is_audio_extension, is_valid_path_string, AUDIO_EXTENSIONS};
use crate::resolver::ClipResolver;

/// Failure of a single strategy.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// A scan pattern failed to compile.
    #[error("invalid scan pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// A path-candidate strategy.
pub type Strategy = fn(&[u8], &ClipResolver, &ScanLimits) -> Result<Vec<String>, StrategyError>;

/// Strategies in the order their results are merged.
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("extension-anchored", extension_anchored),
    ("absolute-path", absolute_paths),
    ("null-delimited", null_delimited),
];

const WINDOWS_PATH_PATTERN: &str = r"(?-u)[A-Za-z]:[\\/][^\x00\n\r]{4,260}";
const UNIX_PATH_PATTERN: &str = r"(?-u)/[^\x00\n\r]{4,260}";

fn before_null(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

/// Extension spellings scanned for, lower then upper case.
fn extension_spellings() -> impl Iterator<Item = String> {
    AUDIO_EXTENSIONS
        .iter()
        .map(|e| e.to_string())
        .chain(AUDIO_EXTENSIONS.iter().map(|e| e.to_uppercase()))
}

/// Byte runs that end in an audio extension.
///
/// A run is up to 300 non-null bytes before the extension, optionally
/// followed by a short printable tail; everything from the first null on is
/// discarded.
pub fn extension_anchored(
    data: &[u8],
    resolver: &ClipResolver,
    _limits: &ScanLimits,
) -> Result<Vec<String>, StrategyError> {
    let mut found = Vec::new();
    for ext in extension_spellings() {
        let pattern = format!(
            r"(?-u)[^\x00]{{1,300}}{}[\x00\x20-\x7E]{{0,10}}",
            regex::escape(&ext)
        );
        let re = Regex::new(&pattern)?;
        for m in re.find_iter(data) {
            let path_bytes = before_null(m.as_bytes());
            let accepted = decode_first(path_bytes, PATH_ENCODINGS, |text| {
                let candidate = text.trim();
                let plausible = candidate.chars().count() > 4
                    && has_separator(candidate)
                    && is_valid_path_string(candidate);
                plausible.then(|| candidate.trim_end_matches('\0').trim().to_string())
            });
            if let Some(candidate) = accepted {
                found.push(resolver.resolve_existing(&candidate));
            }
        }
    }
    Ok(found)
}

/// Drive-letter and POSIX-absolute paths with a dotted extension.
pub fn absolute_paths(
    data: &[u8],
    resolver: &ClipResolver,
    _limits: &ScanLimits,
) -> Result<Vec<String>, StrategyError> {
    let mut found = Vec::new();
    for pattern in [WINDOWS_PATH_PATTERN, UNIX_PATH_PATTERN] {
        let re = Regex::new(pattern)?;
        for m in re.find_iter(data) {
            let path_bytes = before_null(m.as_bytes());
            let accepted = decode_first(path_bytes, PATH_ENCODINGS, |text| {
                let candidate = text.trim_end_matches('\0').trim();
                let plausible = candidate.chars().count() > 4
                    && candidate.contains('.')
                    && is_valid_path_string(candidate)
                    && !extension_lower(candidate).is_empty();
                plausible.then(|| candidate.to_string())
            });
            if let Some(candidate) = accepted {
                found.push(resolver.resolve_existing(&candidate));
            }
        }
    }
    Ok(found)
}

/// Null-terminated strings of plausible path length with an audio extension.
pub fn null_delimited(
    data: &[u8],
    resolver: &ClipResolver,
    limits: &ScanLimits,
) -> Result<Vec<String>, StrategyError> {
    let mut found = Vec::new();
    for segment in data
        .split(|&b| b == 0)
        .take(limits.max_null_segments)
        .filter(|s| (10..=260).contains(&s.len()))
    {
        let accepted = decode_first(segment, SEGMENT_ENCODINGS, |text| {
            let candidate = text.trim();
            let ext = extension_lower(candidate);
            let plausible = has_separator(candidate)
                && candidate.contains('.')
                && !ext.is_empty()
                && is_valid_path_string(candidate)
                && is_audio_extension(&ext);
            plausible.then(|| candidate.to_string())
        });
        if let Some(candidate) = accepted {
            found.push(resolver.resolve_existing(&candidate));
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> ClipResolver {
        ClipResolver::new("/nonexistent-project-dir")
    }

    #[test]
    fn test_extension_anchored_cuts_at_null() {
        let data = b"\x00\x00/Audio/Kick 01.wav\x00\x00junk";
        let found = extension_anchored(data, &resolver(), &ScanLimits::default()).unwrap();
        assert_eq!(found, vec!["/Audio/Kick 01.wav".to_string()]);
    }

    #[test]
    fn test_extension_anchored_requires_separator() {
        let data = b"\x00Kick01.wav\x00";
        let found = extension_anchored(data, &resolver(), &ScanLimits::default()).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_extension_anchored_uppercase() {
        let data = b"\x00Media/SNARE.WAV\x00";
        let found = extension_anchored(data, &resolver(), &ScanLimits::default()).unwrap();
        assert_eq!(found, vec!["Media/SNARE.WAV".to_string()]);
    }

    #[test]
    fn test_absolute_paths_accepts_any_extension() {
        let data = b"\x00C:\\Sessions\\notes.txt\x00\x00/Volumes/A/take.aif\x00";
        let found = absolute_paths(data, &resolver(), &ScanLimits::default()).unwrap();
        assert!(found.contains(&"C:\\Sessions\\notes.txt".to_string()));
        assert!(found.contains(&"/Volumes/A/take.aif".to_string()));
    }

    #[test]
    fn test_absolute_paths_needs_extension() {
        let data = b"\x00/Volumes/Audio Files\x00";
        let found = absolute_paths(data, &resolver(), &ScanLimits::default()).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_null_delimited_audio_only() {
        let data = b"\x00Audio Files/Take 3.aiff\x00Audio Files/notes.txt\x00";
        let found = null_delimited(data, &resolver(), &ScanLimits::default()).unwrap();
        assert_eq!(found, vec!["Audio Files/Take 3.aiff".to_string()]);
    }

    #[test]
    fn test_null_delimited_segment_cap() {
        let data = b"\x00Audio Files/Take 3.aiff\x00";
        let limits = ScanLimits {
            max_null_segments: 1,
            ..ScanLimits::default()
        };
        let found = null_delimited(data, &resolver(), &limits).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_latin1_fallback_for_mac_bytes() {
        let data = b"\x00/Volumes/Caf\xe9/take.wav\x00";
        let found = extension_anchored(data, &resolver(), &ScanLimits::default()).unwrap();
        assert_eq!(found, vec!["/Volumes/Caf\u{e9}/take.wav".to_string()]);
    }
}
