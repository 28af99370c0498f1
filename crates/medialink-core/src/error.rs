//! Error types for media reference validation.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::format::ContainerFormat;

/// Result type for validator operations.
pub type ValidatorResult<T> = Result<T, ValidatorError>;

/// Errors that abort a validation run.
///
/// Findings about individual clips (missing files, empty paths) are report
/// content and never surface through this type.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// The input path does not exist.
    #[error("the specified file does not exist: {}", path.display())]
    FileNotFound {
        /// Path that was requested.
        path: PathBuf,
    },

    /// Neither the extension nor the header identify the container.
    #[error(
        "unable to determine file type for: {}. Expected .aaf or .omf extension.",
        path.display()
    )]
    UnknownFormat {
        /// Path that was inspected.
        path: PathBuf,
    },

    /// The container exceeds the scanner's hard size ceiling.
    #[error(
        "{format} file is too large ({:.1}MB). Maximum size is {:.0}MB.",
        mib(.size),
        mib(.limit)
    )]
    FileTooLarge {
        /// Container format being scanned.
        format: ContainerFormat,
        /// File size in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },

    /// Extraction failed as a whole.
    #[error("error parsing {format} file: {message}")]
    Parse {
        /// Container format being parsed.
        format: ContainerFormat,
        /// Message of the underlying cause.
        message: String,
    },

    /// No graph reader is available for graph-format containers.
    #[error("{format} support is not available in this build")]
    CapabilityUnavailable {
        /// Container format that needed the capability.
        format: ContainerFormat,
    },

    /// I/O error outside of extraction.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn mib(bytes: &u64) -> f64 {
    *bytes as f64 / (1024.0 * 1024.0)
}

impl ValidatorError {
    /// Creates a file-not-found error.
    pub fn not_found(path: impl AsRef<Path>) -> Self {
        Self::FileNotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Creates a parse error carrying the cause's message.
    pub fn parse(format: ContainerFormat, cause: impl std::fmt::Display) -> Self {
        Self::Parse {
            format,
            message: cause.to_string(),
        }
    }

    /// Returns the stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ValidatorError::FileNotFound { .. } => "MEDIA_001",
            ValidatorError::UnknownFormat { .. } => "MEDIA_002",
            ValidatorError::FileTooLarge { .. } => "MEDIA_003",
            ValidatorError::Parse { .. } => "MEDIA_004",
            ValidatorError::CapabilityUnavailable { .. } => "MEDIA_005",
            ValidatorError::Io(_) => "MEDIA_006",
        }
    }
}
