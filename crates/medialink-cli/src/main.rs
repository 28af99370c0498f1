//! medialink - validates media references in AAF and OMF files
//!
//! Prints a JSON (or text) report of every audio reference found in the
//! container and exits non-zero when linked media is missing.

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

use medialink_cli::commands::{self, OutputFormat};
use medialink_cli::logging;

/// medialink - Media Reference Validator
#[derive(Parser)]
#[command(name = "medialink")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the AAF or OMF file to validate
    path: PathBuf,

    /// Report format written to stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Emit debug-level diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Also write diagnostics to this file
    #[arg(long)]
    debug_log: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = logging::dispatch(cli.verbose, cli.debug_log.as_deref()).and_then(|dispatch| {
        tracing::dispatcher::with_default(&dispatch, || commands::check::run(&cli.path, cli.format))
    });

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", "error".red(), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["medialink", "show.aaf"]).unwrap();
        assert_eq!(cli.path, PathBuf::from("show.aaf"));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(!cli.verbose);
        assert!(cli.debug_log.is_none());
    }

    #[test]
    fn test_cli_parses_options() {
        let cli = Cli::try_parse_from([
            "medialink",
            "reel1.omf",
            "--format",
            "text",
            "-v",
            "--debug-log",
            "run.log",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.verbose);
        assert_eq!(cli.debug_log, Some(PathBuf::from("run.log")));
    }

    #[test]
    fn test_cli_requires_path() {
        assert!(Cli::try_parse_from(["medialink"]).is_err());
        assert!(Cli::try_parse_from(["medialink", "a.aaf", "--format", "xml"]).is_err());
    }
}
