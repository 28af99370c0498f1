//! Check command implementation
//!
//! Validates the media references of one container and prints the report.

use anyhow::{Context, Result};
use clap::ValueEnum;
use medialink_core::{format_report, ValidationReport, Validator, ValidatorConfig};
use std::path::Path;
use std::process::ExitCode;

/// Report rendering on stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON report
    #[default]
    Json,
    /// Human-readable summary
    Text,
}

/// Run the check command
///
/// # Returns
/// Exit code: 0 if every clip is valid, 1 if any clip is missing
pub fn run(path: &Path, format: OutputFormat) -> Result<ExitCode> {
    let report = validator(ValidatorConfig::default()).validate(path)?;
    println!("{}", render(&report, format)?);

    Ok(if report.has_missing() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

/// Renders a report in the requested format.
pub fn render(report: &ValidationReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => report
            .to_json_pretty()
            .context("Failed to serialize report"),
        OutputFormat::Text => Ok(format_report(report)),
    }
}

/// Validator with every container reader compiled into this build.
pub fn validator(config: ValidatorConfig) -> Validator {
    let validator = Validator::new(config);
    #[cfg(feature = "aaf")]
    let validator = validator.with_graph_reader(Box::new(medialink_aaf::AafReader::new()));
    validator
}
