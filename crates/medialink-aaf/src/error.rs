//! Error types for AAF container reading.

use medialink_core::GraphReadError;
use thiserror::Error;

/// Result type for AAF reading.
pub type AafResult<T> = Result<T, AafError>;

/// Errors raised while reading an AAF compound file.
#[derive(Debug, Error)]
pub enum AafError {
    /// I/O error from the compound-file layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A property stream or index ended early.
    #[error("truncated {what}")]
    Truncated {
        /// Structure being read.
        what: &'static str,
    },

    /// Property stream declares a byte order other than little endian.
    #[error("unsupported byte order marker 0x{0:02x}")]
    ByteOrder(u8),

    /// A required object or property is absent.
    #[error("missing {what} at {path}")]
    Missing {
        /// What was expected.
        what: &'static str,
        /// Storage path that was searched.
        path: String,
    },

    /// A property was stored with a form the reader cannot use for it.
    #[error("property 0x{pid:04x} has unexpected stored form 0x{form:02x}")]
    UnexpectedForm {
        /// Property id.
        pid: u16,
        /// Stored form found.
        form: u16,
    },

    /// Segment nesting exceeds the reader's depth limit.
    #[error("segment nesting deeper than {0} levels")]
    TooDeep(usize),
}

impl AafError {
    /// Creates a missing-object error.
    pub fn missing(what: &'static str, path: impl Into<String>) -> Self {
        Self::Missing {
            what,
            path: path.into(),
        }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            AafError::Io(_) => "AAF_001",
            AafError::Truncated { .. } => "AAF_002",
            AafError::ByteOrder(_) => "AAF_003",
            AafError::Missing { .. } => "AAF_004",
            AafError::UnexpectedForm { .. } => "AAF_005",
            AafError::TooDeep(_) => "AAF_006",
        }
    }
}

impl From<AafError> for GraphReadError {
    fn from(err: AafError) -> Self {
        match err {
            AafError::Io(e) => GraphReadError::Io(e),
            other => GraphReadError::Malformed(format!("[{}] {}", other.code(), other)),
        }
    }
}
