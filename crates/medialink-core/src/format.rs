//! Container format detection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::error::{ValidatorError, ValidatorResult};

/// Number of header bytes inspected when the extension is inconclusive.
pub const HEADER_PEEK_LEN: usize = 16;

/// Compound-file (structured storage) signature used by AAF.
pub const COMPOUND_FILE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Interchange container families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    /// Graph-structured container (Advanced Authoring Format).
    Aaf,
    /// Legacy flat-chunk container (Open Media Framework).
    Omf,
}

impl ContainerFormat {
    /// Returns the lowercase identifier used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerFormat::Aaf => "aaf",
            ContainerFormat::Omf => "omf",
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerFormat::Aaf => write!(f, "AAF"),
            ContainerFormat::Omf => write!(f, "OMF"),
        }
    }
}

/// Determines the container format of `path`.
///
/// The extension decides first (case-insensitive). Otherwise the first
/// [`HEADER_PEEK_LEN`] bytes are sniffed with [`detect_from_header`]; an
/// unreadable header counts as an unknown format.
pub fn detect_format(path: &Path) -> ValidatorResult<ContainerFormat> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("aaf") => return Ok(ContainerFormat::Aaf),
        Some("omf") => return Ok(ContainerFormat::Omf),
        _ => {}
    }

    let mut header = Vec::with_capacity(HEADER_PEEK_LEN);
    let read = File::open(path).and_then(|f| f.take(HEADER_PEEK_LEN as u64).read_to_end(&mut header));
    if let Err(e) = read {
        debug!(path = %path.display(), error = %e, "header unreadable");
        return Err(ValidatorError::UnknownFormat {
            path: path.to_path_buf(),
        });
    }

    match detect_from_header(&header) {
        Some(format) => {
            debug!(path = %path.display(), %format, "format detected from header");
            Ok(format)
        }
        None => Err(ValidatorError::UnknownFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Sniffs a container format from its leading bytes.
pub fn detect_from_header(header: &[u8]) -> Option<ContainerFormat> {
    let head8 = &header[..header.len().min(8)];
    if head8.windows(3).any(|w| w == b"AAF")
        || header.starts_with(&[0x00, 0x00, 0x00, 0x01])
        || header.starts_with(&COMPOUND_FILE_MAGIC)
    {
        return Some(ContainerFormat::Aaf);
    }
    if header.starts_with(b"OMFI") || header.starts_with(&[0x00, 0x01]) {
        return Some(ContainerFormat::Omf);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_extension_wins_case_insensitive() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Show.AAF");
        fs::write(&path, b"OMFI").unwrap();
        assert_eq!(detect_format(&path).unwrap(), ContainerFormat::Aaf);

        let path = tmp.path().join("reel1.Omf");
        fs::write(&path, b"").unwrap();
        assert_eq!(detect_format(&path).unwrap(), ContainerFormat::Omf);
    }

    #[test]
    fn test_header_sniffing() {
        assert_eq!(
            detect_from_header(b"xxAAFxxx0000"),
            Some(ContainerFormat::Aaf)
        );
        assert_eq!(
            detect_from_header(&[0, 0, 0, 1, 9, 9]),
            Some(ContainerFormat::Aaf)
        );
        assert_eq!(
            detect_from_header(&COMPOUND_FILE_MAGIC),
            Some(ContainerFormat::Aaf)
        );
        assert_eq!(detect_from_header(b"OMFI...."), Some(ContainerFormat::Omf));
        assert_eq!(detect_from_header(&[0, 1, 0, 0]), Some(ContainerFormat::Omf));
        assert_eq!(detect_from_header(b"RIFF....WAVE"), None);
        assert_eq!(detect_from_header(b""), None);
    }

    #[test]
    fn test_aaf_marker_beyond_eight_bytes_ignored() {
        assert_eq!(detect_from_header(b"12345678AAF"), None);
    }

    #[test]
    fn test_unknown_extension_uses_header() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("export.bin");
        fs::write(&path, b"OMFI\0\0\0\0").unwrap();
        assert_eq!(detect_format(&path).unwrap(), ContainerFormat::Omf);

        let path = tmp.path().join("notes.txt");
        fs::write(&path, b"hello world").unwrap();
        let err = detect_format(&path).unwrap_err();
        assert_eq!(err.code(), "MEDIA_002");
    }

    #[test]
    fn test_unreadable_header_is_unknown_format() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("session");
        fs::create_dir(&path).unwrap();
        let err = detect_format(&path).unwrap_err();
        assert_eq!(err.code(), "MEDIA_002");
    }
}
