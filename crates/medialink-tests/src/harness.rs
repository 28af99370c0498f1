//! Test harness for running validations against files in a scratch directory.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use medialink_aaf::AafReader;
use medialink_core::{ValidationReport, Validator, ValidatorConfig, ValidatorResult};

use crate::aaf_fixture::AafFixture;

/// A scratch directory plus the validator configuration used against it.
pub struct TestHarness {
    /// Working directory for containers and media.
    pub work_dir: TempDir,
    /// Configuration handed to every validation run.
    pub config: ValidatorConfig,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    /// Create a new test harness with default limits.
    pub fn new() -> Self {
        Self::with_config(ValidatorConfig::default())
    }

    /// Create a new test harness with custom limits.
    pub fn with_config(config: ValidatorConfig) -> Self {
        Self {
            work_dir: TempDir::new().expect("Failed to create work dir"),
            config,
        }
    }

    /// Get the working directory path.
    pub fn path(&self) -> &Path {
        self.work_dir.path()
    }

    /// Absolute path of `relative` inside the working directory, as text.
    pub fn path_str(&self, relative: &str) -> String {
        self.path().join(relative).to_string_lossy().into_owned()
    }

    /// Write `bytes` to `relative`, creating parent directories.
    pub fn write_file(&self, relative: &str, bytes: &[u8]) -> PathBuf {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, bytes).expect("Failed to write file");
        path
    }

    /// Write a media file of `len` bytes.
    pub fn write_media(&self, relative: &str, len: usize) -> PathBuf {
        self.write_file(relative, &vec![0u8; len])
    }

    /// Serialize an AAF fixture to `relative`.
    pub fn write_aaf(&self, relative: &str, fixture: &AafFixture) -> PathBuf {
        let bytes = fixture.to_bytes().expect("Failed to build AAF fixture");
        self.write_file(relative, &bytes)
    }

    /// Validate a container with AAF support enabled.
    pub fn validate(&self, container: &Path) -> ValidatorResult<ValidationReport> {
        Validator::new(self.config.clone())
            .with_graph_reader(Box::new(AafReader::new()))
            .validate(container)
    }

    /// Validate and panic on error.
    pub fn report(&self, container: &Path) -> ValidationReport {
        self.validate(container)
            .unwrap_or_else(|e| panic!("validation of {} failed: {e}", container.display()))
    }
}

/// Assert the report's counters agree with each other and with its clips.
pub fn assert_counters_consistent(report: &ValidationReport) {
    assert_eq!(
        report.embedded_clips + report.linked_clips,
        report.total_clips,
        "embedded + linked != total"
    );
    assert_eq!(
        report.valid_clips + report.missing_clips,
        report.total_clips,
        "valid + missing != total"
    );
    assert_eq!(report.missing_clip_details.len(), report.missing_clips);
    assert!(report.missing_clip_details.iter().all(|c| !c.is_valid));
}
