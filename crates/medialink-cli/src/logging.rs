//! Diagnostics sink for one CLI run.
//!
//! The subscriber is returned as a [`Dispatch`] and installed only around
//! the validation call, so nothing is registered process-wide.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::Dispatch;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::EnvFilter;

/// Level used without `-v`.
pub const DEFAULT_LEVEL: &str = "warn";

/// Level used with `-v`.
pub const VERBOSE_LEVEL: &str = "debug";

/// Builds the stderr subscriber, teeing into `debug_log` when given.
///
/// `RUST_LOG` takes precedence over the verbosity flag.
pub fn dispatch(verbose: bool, debug_log: Option<&Path>) -> Result<Dispatch> {
    let level = if verbose { VERBOSE_LEVEL } else { DEFAULT_LEVEL };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (writer, ansi) = match debug_log {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create debug log: {}", path.display()))?;
            (
                BoxMakeWriter::new(std::io::stderr.and(Mutex::new(file))),
                false,
            )
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false)
        .finish();
    Ok(Dispatch::new(subscriber))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_debug_log_receives_events() {
        let tmp = TempDir::new().unwrap();
        let log = tmp.path().join("debug.log");
        let dispatch = dispatch(true, Some(&log)).unwrap();

        tracing::dispatcher::with_default(&dispatch, || {
            tracing::warn!(clip = "Kick", "linked media missing");
        });

        let contents = std::fs::read_to_string(&log).unwrap();
        assert!(contents.contains("linked media missing"));
        assert!(contents.contains("clip=\"Kick\""));
    }

    #[test]
    fn test_unwritable_debug_log() {
        let err = dispatch(false, Some(Path::new("/nonexistent/dir/debug.log"))).unwrap_err();
        assert!(err.to_string().contains("Failed to create debug log"));
    }
}
