//! medialink End-to-End Test Infrastructure
//!
//! This crate provides integration tests for the validation flows:
//!
//! - Legacy: scanned OMF bytes -> clips -> estimated timeline
//! - AAF: synthetic compound file -> graph -> clips -> measured timeline
//! - Reports: counter invariants and run-to-run stability
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p medialink-tests
//! ```

pub mod aaf_fixture;
pub mod fixtures;
pub mod harness;

pub use aaf_fixture::{umid_string, AafFixture, FixtureDescriptor, FixtureMob, FixtureSegment, FixtureSlot};
pub use harness::TestHarness;
