use std::fs;
use tracing::debug;

use super::{Timeline, TimelineKind};
use crate::clip::MediaClip;
use crate::limits::TimelineConfig;
use crate::resolver::name_cross_check;

/// Lays validated legacy clips out back to back, a fixed number per track.
///
/// Durations come from the linked file's size at a nominal byte rate; clips
/// whose media cannot be measured get the default duration.
pub fn estimate_timeline(validated: &[MediaClip], config: &TimelineConfig) -> Timeline {
    let per_track = config.clips_per_track.max(1);
    let mut clips = Vec::with_capacity(validated.len());
    let mut cursor = 0.0;
    let mut total_duration: f64 = 0.0;

    for (i, clip) in validated.iter().enumerate() {
        let duration = clip
            .external_path
            .as_deref()
            .and_then(|p| fs::metadata(p).ok())
            .map(|meta| (meta.len() as f64 / config.estimated_bytes_per_second).max(config.min_clip_duration))
            .unwrap_or(config.default_clip_duration);

        let start = cursor;
        let end = start + duration;
        let (name_matches_file, expected_filename) =
            name_cross_check(&clip.name, clip.external_path.as_deref());

        let mut placement = clip.clone().with_placement(i / per_track, start, end);
        placement.clip_id = Some(
            clip.clip_id
                .clone()
                .unwrap_or_else(|| format!("omf_timeline_{i}")),
        );
        placement.error_message = None;
        placement.name_matches_file = name_matches_file;
        placement.expected_filename = expected_filename;
        clips.push(placement);

        cursor = if (i + 1) % per_track == 0 { 0.0 } else { end };
        total_duration = total_duration.max(end);
    }

    debug!(placements = clips.len(), total_duration, "estimated timeline built");
    Timeline {
        clips,
        total_duration,
        kind: TimelineKind::Estimated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_tracks_of_ten_and_cursor_reset() {
        let clips: Vec<MediaClip> = (1..=12)
            .map(|i| MediaClip::embedded(format!("Clip {i}"), format!("omf_clip_{i}")))
            .collect();
        let timeline = estimate_timeline(&clips, &TimelineConfig::default());

        assert_eq!(timeline.kind, TimelineKind::Estimated);
        assert_eq!(timeline.clips.len(), 12);
        assert_eq!(timeline.clips[9].track_index, 0);
        assert_eq!(timeline.clips[9].timeline_start, 45.0);
        assert_eq!(timeline.clips[10].track_index, 1);
        assert_eq!(timeline.clips[10].timeline_start, 0.0);
        assert_eq!(timeline.clips[11].timeline_end, 10.0);
        assert_eq!(timeline.total_duration, 50.0);
    }

    #[test]
    fn test_duration_from_file_size() {
        let tmp = TempDir::new().unwrap();
        let big = tmp.path().join("big.wav");
        let small = tmp.path().join("small.wav");
        fs::write(&big, vec![0u8; 192_000 * 3]).unwrap();
        fs::write(&small, vec![0u8; 100]).unwrap();

        let clips = vec![
            MediaClip::linked("big.wav", "omf_clip_1", big.to_string_lossy()),
            MediaClip::linked("other", "omf_clip_2", small.to_string_lossy()),
            MediaClip::linked("gone.wav", "omf_clip_3", "/nonexistent/gone.wav"),
        ];
        let timeline = estimate_timeline(&clips, &TimelineConfig::default());

        assert_eq!(timeline.clips[0].duration(), 3.0);
        assert_eq!(timeline.clips[1].duration(), 1.0);
        assert_eq!(timeline.clips[2].duration(), 5.0);
        assert_eq!(timeline.clips[0].name_matches_file, Some(true));
        assert_eq!(timeline.clips[1].name_matches_file, Some(false));
        assert_eq!(timeline.clips[1].expected_filename.as_deref(), Some("small.wav"));
        assert_eq!(timeline.total_duration, 9.0);
    }

    #[test]
    fn test_missing_ids_are_synthesized() {
        let mut clip = MediaClip::embedded("Pad", "x");
        clip.clip_id = None;
        let timeline = estimate_timeline(&[clip], &TimelineConfig::default());
        assert_eq!(timeline.clips[0].clip_id.as_deref(), Some("omf_timeline_0"));
        assert_eq!(timeline.clips[0].name_matches_file, None);
    }
}
