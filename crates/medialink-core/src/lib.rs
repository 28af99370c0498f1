//! Media reference validation for AAF and OMF interchange files.
//!
//! This crate finds every audio reference in a post-production interchange
//! file, decides whether its media is embedded or linked, checks that linked
//! media exists on disk, and reconstructs where each clip sits on the
//! timeline.
//!
//! - AAF containers are read through a [`GraphReader`] into a typed
//!   [`CompositionGraph`] and walked.
//! - OMF containers are scanned heuristically for path strings.
//!
//! ```rust,ignore
//! use medialink_core::{Validator, ValidatorConfig};
//!
//! let report = Validator::new(ValidatorConfig::default())
//!     .validate(std::path::Path::new("reel1.omf"))?;
//! println!("{}", medialink_core::format_report(&report));
//! ```

pub mod clip;
pub mod decode;
pub mod error;
pub mod format;
pub mod graph;
pub mod legacy;
pub mod limits;
pub mod paths;
pub mod report;
pub mod resolver;
pub mod timeline;
pub mod validator;

pub use clip::MediaClip;
pub use error::{ValidatorError, ValidatorResult};
pub use format::{detect_format, ContainerFormat};
pub use graph::{
    CompositionGraph, Descriptor, GraphReadError, GraphReader, Locator, Mob, MobIndex, Presence,
    Segment, Slot, SourceClip,
};
pub use limits::{ScanLimits, TimelineConfig, ValidatorConfig};
pub use paths::is_valid_path_string;
pub use report::{format_report, ValidationReport};
pub use resolver::ClipResolver;
pub use timeline::{Timeline, TimelineKind};
pub use validator::{validate_clip, Validator};
