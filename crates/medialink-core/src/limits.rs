//! Resource limits and run configuration.
//!
//! The scanners are heuristic and run over untrusted bytes, so every loop that
//! could grow with input size is bounded by a value here. Tests shrink these
//! to exercise the ceilings without multi-hundred-megabyte fixtures.

use serde::{Deserialize, Serialize};

const MIB: u64 = 1024 * 1024;

/// Scan ceilings for the legacy scanner and the timeline walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanLimits {
    /// Legacy files above this size are rejected before scanning.
    pub max_file_size: u64,
    /// Legacy files above this size are scanned through a window.
    pub window_threshold: u64,
    /// Size of the leading window scanned for large files.
    pub window_size: u64,
    /// Maximum number of null-delimited segments inspected.
    pub max_null_segments: usize,
    /// Maximum number of clips the aggressive fallback may emit.
    pub max_aggressive_matches: usize,
    /// Maximum nesting depth followed by the timeline walk.
    pub max_timeline_depth: usize,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            window_threshold: Self::DEFAULT_WINDOW_THRESHOLD,
            window_size: Self::DEFAULT_WINDOW_SIZE,
            max_null_segments: Self::DEFAULT_MAX_NULL_SEGMENTS,
            max_aggressive_matches: Self::DEFAULT_MAX_AGGRESSIVE_MATCHES,
            max_timeline_depth: Self::DEFAULT_MAX_TIMELINE_DEPTH,
        }
    }
}

impl ScanLimits {
    /// Default hard ceiling (200 MB).
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 200 * MIB;

    /// Default windowing threshold (100 MB).
    pub const DEFAULT_WINDOW_THRESHOLD: u64 = 100 * MIB;

    /// Default window size (50 MB).
    pub const DEFAULT_WINDOW_SIZE: u64 = 50 * MIB;

    /// Default null-segment cap.
    pub const DEFAULT_MAX_NULL_SEGMENTS: usize = 100_000;

    /// Default aggressive-match cap.
    pub const DEFAULT_MAX_AGGRESSIVE_MATCHES: usize = 1000;

    /// Default timeline depth cap.
    pub const DEFAULT_MAX_TIMELINE_DEPTH: usize = 20;

    /// Number of bytes of a file of `file_size` bytes that get scanned.
    pub fn scan_len(&self, file_size: u64) -> u64 {
        if file_size > self.window_threshold {
            self.window_size.min(file_size)
        } else {
            file_size
        }
    }
}

/// Parameters of timeline reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Edit rate used when neither the composition nor the slot carries one.
    pub default_edit_rate: f64,
    /// Clips per estimated track for legacy containers.
    pub clips_per_track: usize,
    /// Byte rate used to estimate clip duration from file size.
    pub estimated_bytes_per_second: f64,
    /// Duration given to clips whose media cannot be measured.
    pub default_clip_duration: f64,
    /// Lower bound for estimated durations.
    pub min_clip_duration: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            default_edit_rate: 48_000.0,
            clips_per_track: 10,
            // 48kHz, 16-bit, stereo
            estimated_bytes_per_second: 192_000.0,
            default_clip_duration: 5.0,
            min_clip_duration: 1.0,
        }
    }
}

/// Configuration for one validator instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Scan ceilings.
    pub limits: ScanLimits,
    /// Timeline reconstruction parameters.
    pub timeline: TimelineConfig,
}
