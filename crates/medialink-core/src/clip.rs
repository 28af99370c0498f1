//! The media clip record shared by extraction, validation and timeline passes.

use serde::{Deserialize, Serialize};

/// One discovered audio reference.
///
/// Created during extraction, mutated once during validation, and copied into
/// timeline placements. Optional fields serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaClip {
    /// Display name; never empty.
    pub name: String,
    /// Identity used for deduplication and for matching timeline placements.
    pub clip_id: Option<String>,
    /// Whether the essence is stored inside the container.
    pub is_embedded: bool,
    /// Absolute normalized path of externally linked media.
    pub external_path: Option<String>,
    /// Validation verdict.
    pub is_valid: bool,
    /// Why the clip failed validation.
    pub error_message: Option<String>,
    /// Track this placement sits on (timeline clips only).
    pub track_index: usize,
    /// Placement start in seconds (timeline clips only).
    pub timeline_start: f64,
    /// Placement end in seconds (timeline clips only).
    pub timeline_end: f64,
    /// Whether the display name matches the linked file's base name.
    pub name_matches_file: Option<bool>,
    /// Base name of the linked file used for the name comparison.
    pub expected_filename: Option<String>,
}

impl MediaClip {
    /// Creates a clip with no media link and a passing verdict.
    pub fn new(name: impl Into<String>, clip_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clip_id: Some(clip_id.into()),
            is_embedded: false,
            external_path: None,
            is_valid: true,
            error_message: None,
            track_index: 0,
            timeline_start: 0.0,
            timeline_end: 0.0,
            name_matches_file: None,
            expected_filename: None,
        }
    }

    /// Creates a clip linked to external media at `path`.
    pub fn linked(name: impl Into<String>, clip_id: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, clip_id).with_external_path(path)
    }

    /// Creates a clip whose essence lives inside the container.
    pub fn embedded(name: impl Into<String>, clip_id: impl Into<String>) -> Self {
        Self::new(name, clip_id).with_embedded(true)
    }

    /// Sets the external path.
    pub fn with_external_path(mut self, path: impl Into<String>) -> Self {
        self.external_path = Some(path.into());
        self
    }

    /// Sets the embedded flag.
    pub fn with_embedded(mut self, embedded: bool) -> Self {
        self.is_embedded = embedded;
        self
    }

    /// Places the clip on the timeline.
    pub fn with_placement(mut self, track_index: usize, start: f64, end: f64) -> Self {
        self.track_index = track_index;
        self.timeline_start = start;
        self.timeline_end = end;
        self
    }

    /// Records a failed validation.
    pub fn mark_invalid(&mut self, message: impl Into<String>) {
        self.is_valid = false;
        self.error_message = Some(message.into());
    }

    /// Clip length on the timeline in seconds.
    pub fn duration(&self) -> f64 {
        self.timeline_end - self.timeline_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clip_defaults() {
        let clip = MediaClip::new("Kick", "omf_clip_1");
        assert!(clip.is_valid);
        assert!(!clip.is_embedded);
        assert_eq!(clip.external_path, None);
        assert_eq!(clip.track_index, 0);
        assert_eq!(clip.duration(), 0.0);
    }

    #[test]
    fn test_mark_invalid() {
        let mut clip = MediaClip::linked("Kick", "1", "/m/kick.wav");
        clip.mark_invalid("External media file not found: /m/kick.wav");
        assert!(!clip.is_valid);
        assert!(clip.error_message.unwrap().contains("/m/kick.wav"));
    }

    #[test]
    fn test_absent_optionals_serialize_as_null() {
        let clip = MediaClip::embedded("Pad", "mob-1");
        let value = serde_json::to_value(&clip).unwrap();
        assert!(value["external_path"].is_null());
        assert!(value["name_matches_file"].is_null());
        assert_eq!(value["is_embedded"], true);
        assert_eq!(value["timeline_start"], 0.0);
    }
}
