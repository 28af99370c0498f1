//! End-to-end validation of legacy (OMF) containers.

use pretty_assertions::assert_eq;

use medialink_core::{ContainerFormat, ScanLimits, TimelineKind, ValidatorConfig, ValidatorError};
use medialink_tests::fixtures::{legacy_container, legacy_container_latin1, noise};
use medialink_tests::harness::assert_counters_consistent;
use medialink_tests::TestHarness;

fn scaled_limits() -> ValidatorConfig {
    ValidatorConfig {
        limits: ScanLimits {
            max_file_size: 2000,
            window_threshold: 1000,
            window_size: 500,
            ..ScanLimits::default()
        },
        ..ValidatorConfig::default()
    }
}

#[test]
fn test_present_and_missing_media() {
    let harness = TestHarness::new();
    harness.write_media("audio/kick.wav", 192_000 * 2);
    let kick = harness.path_str("audio/kick.wav");
    let snare = harness.path_str("audio/snare.wav");
    let container = harness.write_file("reel1.omf", &legacy_container(&[&kick, &snare]));

    let report = harness.report(&container);
    assert_counters_consistent(&report);
    assert_eq!(report.file_format, ContainerFormat::Omf);
    assert_eq!(report.timeline_kind, TimelineKind::Estimated);
    assert_eq!(
        (report.total_clips, report.linked_clips, report.valid_clips, report.missing_clips),
        (2, 2, 1, 1)
    );
    assert_eq!(
        report.missing_clip_details[0].error_message,
        Some(format!("External media file not found: {snare}"))
    );

    let timeline = &report.timeline_clips;
    assert_eq!(timeline[0].name, "kick.wav");
    assert_eq!((timeline[0].timeline_start, timeline[0].timeline_end), (0.0, 2.0));
    assert_eq!((timeline[1].timeline_start, timeline[1].timeline_end), (2.0, 7.0));
    assert_eq!(timeline[1].error_message, None);
    assert_eq!(timeline[0].name_matches_file, Some(true));
    assert_eq!(report.total_duration, 7.0);
}

#[test]
fn test_relative_reference_resolves_next_to_container() {
    let harness = TestHarness::new();
    harness.write_media("media/loop.wav", 64);
    let container = harness.write_file("show.omf", &legacy_container(&["media/loop.wav"]));

    let report = harness.report(&container);
    assert_counters_consistent(&report);
    let expected = harness.path_str("media/loop.wav");
    let clip = report
        .timeline_clips
        .iter()
        .find(|c| c.external_path.as_deref() == Some(expected.as_str()))
        .expect("relative reference resolved against the container directory");
    assert!(clip.is_valid);
    assert!(!clip.is_embedded);
}

#[test]
fn test_latin1_path_is_decoded() {
    let harness = TestHarness::new();
    harness.write_media("Café.wav", 16);
    let path = harness.path_str("Café.wav");
    let container = harness.write_file("show.omf", &legacy_container_latin1(&path));

    let report = harness.report(&container);
    assert_eq!(report.total_clips, 1);
    assert_eq!(report.valid_clips, 1);
    assert_eq!(report.timeline_clips[0].external_path.as_deref(), Some(path.as_str()));
}

#[test]
fn test_oversized_container_rejected_before_scanning() {
    let harness = TestHarness::with_config(scaled_limits());
    let container = harness.write_file("huge.omf", &vec![0u8; 2500]);

    let err = harness.validate(&container).unwrap_err();
    assert!(matches!(err, ValidatorError::FileTooLarge { size: 2500, limit: 2000, .. }));
    assert_eq!(err.code(), "MEDIA_003");
}

#[test]
fn test_large_container_scans_leading_window_only() {
    let harness = TestHarness::with_config(scaled_limits());
    harness.write_media("early.wav", 8);
    harness.write_media("late.wav", 8);
    let early = harness.path_str("early.wav");
    let late = harness.path_str("late.wav");

    let mut data = legacy_container(&[&early]);
    data.resize(600, 0);
    data.extend_from_slice(late.as_bytes());
    data.resize(1500, 0);
    let container = harness.write_file("big.omf", &data);

    let report = harness.report(&container);
    assert_eq!(report.total_clips, 1);
    assert_eq!(report.timeline_clips[0].external_path.as_deref(), Some(early.as_str()));
}

#[test]
fn test_container_without_references() {
    let harness = TestHarness::new();
    let mut data = b"OMFI".to_vec();
    data.extend(noise(4096));
    let container = harness.write_file("empty.omf", &data);

    let report = harness.report(&container);
    assert_eq!(report.total_clips, 0);
    assert!(!report.has_missing());
    assert!(report.timeline_clips.is_empty());
    assert_eq!(report.total_duration, 0.0);
}

#[test]
fn test_tracks_of_ten() {
    let harness = TestHarness::new();
    let paths: Vec<String> = (1..=12)
        .map(|i| {
            let relative = format!("takes/take{i:02}.wav");
            harness.write_media(&relative, 192_000);
            harness.path_str(&relative)
        })
        .collect();
    let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
    let container = harness.write_file("takes.omf", &legacy_container(&refs));

    let report = harness.report(&container);
    assert_eq!(report.total_clips, 12);
    assert_eq!(report.valid_clips, 12);
    let tracks: Vec<usize> = report.timeline_clips.iter().map(|c| c.track_index).collect();
    assert_eq!(tracks, vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1]);
    assert_eq!(report.timeline_clips[10].timeline_start, 0.0);
    assert_eq!(report.total_duration, 10.0);
}

#[test]
fn test_repeated_runs_serialize_identically() {
    let harness = TestHarness::new();
    harness.write_media("a.wav", 100);
    let a = harness.path_str("a.wav");
    let b = harness.path_str("b.aif");
    let container = harness.write_file("show.omf", &legacy_container(&[&a, &b]));

    let first = harness.report(&container).to_json_pretty().unwrap();
    let second = harness.report(&container).to_json_pretty().unwrap();
    assert_eq!(first, second);
}
