//! Heuristic scanner for legacy flat-chunk (OMF) containers.
//!
//! The chunk structure is not modeled. Media references are recovered by
//! scanning the raw bytes for path-like strings:
//!
//! 1. Size guard: oversized files are rejected, large files are windowed.
//! 2. Path strategies (see [`strategies`]) run in order; their results are
//!    merged and deduplicated in first-seen order.
//! 3. Every audio (or extension-less) path becomes a linked clip.
//! 4. If nothing was found, the [`aggressive`] fallback runs once.

pub mod aggressive;
pub mod strategies;

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, warn};

use crate::clip::MediaClip;
use crate::error::{ValidatorError, ValidatorResult};
use crate::format::ContainerFormat;
use crate::limits::ScanLimits;
use crate::paths::{extension_lower, file_name, is_audio_extension, normalize_path};
use crate::resolver::ClipResolver;

pub use aggressive::aggressive_scan;
pub use strategies::{StrategyError, STRATEGIES};

/// Leading bytes seen in legacy containers.
pub const LEGACY_SIGNATURES: &[[u8; 4]] = &[*b"OMFI", [0x00, 0x01, 0x00, 0x00], [0x00, 0x00, 0x00, 0x01]];

/// An essence reference recovered from the chunk structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EssenceReference {
    pub name: Option<String>,
    pub path: Option<String>,
    pub id: Option<String>,
    pub embedded: bool,
}

/// Scans the legacy container at `path` for audio references.
pub fn scan_file(path: &Path, limits: &ScanLimits) -> ValidatorResult<Vec<MediaClip>> {
    let parse_error = |e: io::Error| ValidatorError::parse(ContainerFormat::Omf, e);

    let size = fs::metadata(path).map_err(parse_error)?.len();
    debug!(path = %path.display(), size, "scanning legacy container");
    if size > limits.max_file_size {
        return Err(ValidatorError::FileTooLarge {
            format: ContainerFormat::Omf,
            size,
            limit: limits.max_file_size,
        });
    }

    let file = File::open(path).map_err(parse_error)?;
    let data = read_window(file, size, limits).map_err(parse_error)?;
    if (data.len() as u64) < size {
        debug!(
            window = data.len(),
            size, "large legacy container, scanning leading window only"
        );
    }

    Ok(scan_bytes(&data, &ClipResolver::for_container(path), limits))
}

/// Reads the part of a `file_size`-byte stream that gets scanned.
pub fn read_window<R: Read>(reader: R, file_size: u64, limits: &ScanLimits) -> io::Result<Vec<u8>> {
    let mut data = Vec::new();
    reader.take(limits.scan_len(file_size)).read_to_end(&mut data)?;
    Ok(data)
}

/// Returns true when `data` starts with a known legacy signature.
pub fn has_legacy_signature(data: &[u8]) -> bool {
    LEGACY_SIGNATURES.iter().any(|sig| data.starts_with(sig))
}

/// Scans already-loaded container bytes.
pub fn scan_bytes(data: &[u8], resolver: &ClipResolver, limits: &ScanLimits) -> Vec<MediaClip> {
    if has_legacy_signature(data) {
        debug!("legacy header recognized");
    } else {
        let head = &data[..data.len().min(4)];
        debug!(header = ?head, "legacy header not recognized, scanning anyway");
    }

    let paths = extract_file_paths(data, resolver, limits);
    debug!(count = paths.len(), "file paths found");

    let references = extract_essence_references(data);
    let clips = build_clips(&paths, &references);
    if !clips.is_empty() {
        debug!(count = clips.len(), "structured scan found clips");
        return clips;
    }

    debug!("no clips from structured scan, trying aggressive scan");
    match aggressive_scan(data, resolver, limits) {
        Ok(clips) => {
            debug!(count = clips.len(), "aggressive scan finished");
            clips
        }
        Err(e) => {
            warn!(error = %e, "aggressive scan failed");
            Vec::new()
        }
    }
}

/// Runs every path strategy and merges the results, unique by normalized
/// path in first-seen order.
pub fn extract_file_paths(data: &[u8], resolver: &ClipResolver, limits: &ScanLimits) -> Vec<String> {
    let mut candidates = Vec::new();
    for (name, strategy) in STRATEGIES {
        match strategy(data, resolver, limits) {
            Ok(found) => {
                debug!(strategy = name, count = found.len(), "path strategy finished");
                candidates.extend(found);
            }
            Err(e) => warn!(strategy = name, error = %e, "path strategy failed"),
        }
    }

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .map(|p| normalize_path(&p))
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

/// Essence references from the chunk structure.
///
/// Chunk-level parsing is not implemented, so this always yields nothing and
/// every legacy clip comes from path scanning.
pub fn extract_essence_references(_data: &[u8]) -> Vec<EssenceReference> {
    Vec::new()
}

fn build_clips(paths: &[String], references: &[EssenceReference]) -> Vec<MediaClip> {
    let mut clips = Vec::new();
    let mut processed: HashSet<&str> = HashSet::new();
    let mut counter = 1;

    for path in paths {
        if path.is_empty() || !processed.insert(path.as_str()) {
            continue;
        }
        let ext = extension_lower(path);
        if !ext.is_empty() && !is_audio_extension(&ext) {
            debug!(path = %path, ext = %ext, "skipping non-audio path");
            continue;
        }
        let name = match file_name(path) {
            "" => format!("Audio Clip {counter}"),
            base => base.to_string(),
        };
        clips.push(MediaClip::linked(name, format!("omf_clip_{counter}"), path.as_str()));
        counter += 1;
    }

    for reference in references {
        let Some(path) = reference.path.as_deref() else {
            continue;
        };
        if !processed.insert(path) {
            continue;
        }
        let name = reference
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| Some(file_name(path).to_string()).filter(|n| !n.is_empty()))
            .unwrap_or_else(|| format!("Essence {counter}"));
        let id = reference
            .id
            .clone()
            .unwrap_or_else(|| format!("omf_essence_{counter}"));
        let clip = MediaClip::new(name, id).with_embedded(reference.embedded);
        clips.push(if reference.embedded {
            clip
        } else {
            clip.with_external_path(path)
        });
        counter += 1;
    }

    clips
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_scan_bytes_builds_linked_clips() {
        let mut data = b"OMFI\x00\x00/Volumes/Audio/Kick.wav".to_vec();
        data.extend_from_slice(&[0u8; 12]);
        data.extend_from_slice(b"/Volumes/Audio/Kick.wav\x00");
        let clips = scan_bytes(&data, &ClipResolver::new("/p"), &ScanLimits::default());
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].name, "Kick.wav");
        assert_eq!(clips[0].clip_id.as_deref(), Some("omf_clip_1"));
        assert_eq!(clips[0].external_path.as_deref(), Some("/Volumes/Audio/Kick.wav"));
        assert!(!clips[0].is_embedded);
    }

    #[test]
    fn test_non_audio_paths_skipped() {
        let paths = vec!["/m/notes.txt".to_string(), "/m/take.aif".to_string()];
        let clips = build_clips(&paths, &[]);
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].clip_id.as_deref(), Some("omf_clip_1"));
        assert_eq!(clips[0].name, "take.aif");
    }

    #[test]
    fn test_extensionless_path_kept() {
        let clips = build_clips(&["/m/Audio Files/Take".to_string()], &[]);
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].name, "Take");
    }

    #[test]
    fn test_essence_references_become_clips() {
        let references = vec![EssenceReference {
            name: None,
            path: Some("/m/pad.wav".to_string()),
            id: None,
            embedded: true,
        }];
        let clips = build_clips(&[], &references);
        assert_eq!(clips[0].name, "pad.wav");
        assert_eq!(clips[0].clip_id.as_deref(), Some("omf_essence_1"));
        assert!(clips[0].is_embedded);
        assert_eq!(clips[0].external_path, None);
    }

    #[test]
    fn test_no_paths_yields_no_clips() {
        let data: Vec<u8> = (0..4096u32).map(|i| (i * 31 % 7) as u8).collect();
        let clips = scan_bytes(&data, &ClipResolver::new("/p"), &ScanLimits::default());
        assert!(clips.is_empty());
    }

    #[test]
    fn test_read_window_truncates_large_streams() {
        let limits = ScanLimits {
            max_file_size: 200,
            window_threshold: 100,
            window_size: 50,
            ..ScanLimits::default()
        };
        let data = vec![7u8; 150];
        let window = read_window(Cursor::new(&data), 150, &limits).unwrap();
        assert_eq!(window.len(), 50);
        let window = read_window(Cursor::new(&data[..80]), 80, &limits).unwrap();
        assert_eq!(window.len(), 80);
    }

    #[test]
    fn test_scan_file_rejects_oversized() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("big.omf");
        fs::write(&path, vec![0u8; 250]).unwrap();
        let limits = ScanLimits {
            max_file_size: 200,
            window_threshold: 100,
            window_size: 50,
            ..ScanLimits::default()
        };
        let err = scan_file(&path, &limits).unwrap_err();
        assert_eq!(err.code(), "MEDIA_003");
    }

    #[test]
    fn test_scan_file_missing_is_parse_error() {
        let err = scan_file(Path::new("/definitely/not/here.omf"), &ScanLimits::default()).unwrap_err();
        assert_eq!(err.code(), "MEDIA_004");
    }

    #[test]
    fn test_signatures() {
        assert!(has_legacy_signature(b"OMFI...."));
        assert!(has_legacy_signature(&[0, 1, 0, 0, 5]));
        assert!(!has_legacy_signature(b"RIFF"));
    }
}
