//! Validation pipeline: detect, extract, validate, reconstruct, report.

use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::clip::MediaClip;
use crate::error::{ValidatorError, ValidatorResult};
use crate::format::{detect_format, ContainerFormat};
use crate::graph::{extract_clips, GraphReader};
use crate::legacy;
use crate::limits::ValidatorConfig;
use crate::report::ValidationReport;
use crate::resolver::ClipResolver;
use crate::timeline::{estimate_timeline, measure_timeline};

/// Runs validations with one configuration and an optional graph reader.
pub struct Validator {
    config: ValidatorConfig,
    graph_reader: Option<Box<dyn GraphReader>>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

impl Validator {
    /// Creates a validator without graph-format support.
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            config,
            graph_reader: None,
        }
    }

    /// Enables graph-format containers through `reader`.
    pub fn with_graph_reader(mut self, reader: Box<dyn GraphReader>) -> Self {
        self.graph_reader = Some(reader);
        self
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validates every audio reference of the container at `path`.
    pub fn validate(&self, path: &Path) -> ValidatorResult<ValidationReport> {
        if !path.exists() {
            return Err(ValidatorError::not_found(path));
        }

        let format = detect_format(path)?;
        info!(path = %path.display(), %format, "validating container");

        let report = match format {
            ContainerFormat::Aaf => {
                let reader = self
                    .graph_reader
                    .as_ref()
                    .ok_or(ValidatorError::CapabilityUnavailable { format })?;
                let graph = reader
                    .read_graph(path)
                    .map_err(|e| ValidatorError::parse(format, e))?;
                debug!(mobs = graph.len(), "graph loaded");

                let mut clips = extract_clips(&graph, &ClipResolver::for_container(path));
                validate_clips(&mut clips);
                let timeline = measure_timeline(&graph, &clips, &self.config);
                ValidationReport::build(path.display().to_string(), format, &clips, timeline)
            }
            ContainerFormat::Omf => {
                let mut clips = legacy::scan_file(path, &self.config.limits)?;
                validate_clips(&mut clips);
                let timeline = estimate_timeline(&clips, &self.config.timeline);
                ValidationReport::build(path.display().to_string(), format, &clips, timeline)
            }
        };

        info!(
            total = report.total_clips,
            valid = report.valid_clips,
            missing = report.missing_clips,
            "validation finished"
        );
        Ok(report)
    }
}

/// Checks each clip's media once.
pub fn validate_clips(clips: &mut [MediaClip]) {
    for clip in clips.iter_mut() {
        validate_clip(clip);
    }
}

/// Checks one clip's media and records the verdict on it.
///
/// Embedded essence is accepted without inspecting its payload. Linked media
/// must exist and be a regular file.
pub fn validate_clip(clip: &mut MediaClip) {
    if clip.is_embedded {
        return;
    }
    let Some(path) = clip.external_path.clone() else {
        clip.mark_invalid("No external file path specified for linked media");
        return;
    };
    match fs::metadata(&path) {
        Err(_) => clip.mark_invalid(format!("External media file not found: {path}")),
        Ok(meta) if !meta.is_file() => {
            clip.mark_invalid(format!("External path exists but is not a file: {path}"))
        }
        Ok(_) => {}
    }
}
