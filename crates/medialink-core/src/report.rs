//! Validation report model and its human-readable rendering.

use serde::{Deserialize, Serialize};

use crate::clip::MediaClip;
use crate::format::ContainerFormat;
use crate::timeline::{Timeline, TimelineKind};

const RULE_WIDTH: usize = 60;

/// Summary of one validation run.
///
/// Counters always satisfy `embedded_clips + linked_clips == total_clips` and
/// `valid_clips + missing_clips == total_clips`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Number of clips found by extraction.
    pub total_clips: usize,
    /// Clips whose essence is stored in the container.
    pub embedded_clips: usize,
    /// Clips that are not embedded.
    pub linked_clips: usize,
    /// Clips that failed validation.
    pub missing_clips: usize,
    /// Clips that passed validation.
    pub valid_clips: usize,
    /// Container path as given by the caller.
    pub file_path: String,
    /// Length of the reconstructed timeline in seconds.
    pub total_duration: f64,
    /// Every clip that failed validation.
    pub missing_clip_details: Vec<MediaClip>,
    /// Timeline placements.
    pub timeline_clips: Vec<MediaClip>,
    /// Container family that produced this report.
    pub file_format: ContainerFormat,
    /// Whether placements are measured or estimated.
    pub timeline_kind: TimelineKind,
}

impl ValidationReport {
    /// Tallies validated clips and attaches the timeline.
    pub fn build(
        file_path: impl Into<String>,
        file_format: ContainerFormat,
        clips: &[MediaClip],
        timeline: Timeline,
    ) -> Self {
        let total_clips = clips.len();
        let embedded_clips = clips.iter().filter(|c| c.is_embedded).count();
        let valid_clips = clips.iter().filter(|c| c.is_valid).count();
        let missing_clip_details: Vec<MediaClip> =
            clips.iter().filter(|c| !c.is_valid).cloned().collect();

        Self {
            total_clips,
            embedded_clips,
            linked_clips: total_clips - embedded_clips,
            missing_clips: missing_clip_details.len(),
            valid_clips,
            file_path: file_path.into(),
            total_duration: timeline.total_duration,
            missing_clip_details,
            timeline_clips: timeline.clips,
            file_format,
            timeline_kind: timeline.kind,
        }
    }

    /// Returns true when at least one clip failed validation.
    pub fn has_missing(&self) -> bool {
        self.missing_clips > 0
    }

    /// Serializes the report to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Renders a report as the plain-text summary.
pub fn format_report(report: &ValidationReport) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut lines = vec![
        rule.clone(),
        "OMF/AAF Media Validation Report".to_string(),
        rule.clone(),
        format!("File: {}", report.file_path),
        String::new(),
        "Summary:".to_string(),
        format!("  Total Audio Clips: {}", report.total_clips),
        format!("  Embedded Clips: {}", report.embedded_clips),
        format!("  Linked Clips: {}", report.linked_clips),
        format!("  Valid Clips: {}", report.valid_clips),
        format!("  Missing/Invalid Clips: {}", report.missing_clips),
        String::new(),
    ];

    if report.has_missing() {
        lines.push("Missing/Invalid Clips Details:".to_string());
        lines.push("-".repeat(RULE_WIDTH));
        for clip in &report.missing_clip_details {
            lines.push(format!("  Clip: {}", clip.name));
            if let Some(id) = &clip.clip_id {
                lines.push(format!("    ID: {id}"));
            }
            let kind = if clip.is_embedded { "Embedded" } else { "Linked" };
            lines.push(format!("    Type: {kind}"));
            if let Some(path) = &clip.external_path {
                lines.push(format!("    Expected Path: {path}"));
            }
            if let Some(message) = &clip.error_message {
                lines.push(format!("    Error: {message}"));
            }
            lines.push(String::new());
        }
    } else {
        lines.push(" All audio clips are valid and accessible!".to_string());
    }

    lines.push(rule);
    lines.join("\n")
}
