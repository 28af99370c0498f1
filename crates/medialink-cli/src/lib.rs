//! medialink CLI library.
//!
//! Holds the check command and the diagnostics setup used by the
//! `medialink` binary.

pub mod commands;
pub mod logging;
