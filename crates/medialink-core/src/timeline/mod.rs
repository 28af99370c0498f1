//! Timeline reconstruction.
//!
//! Graph containers carry real placement data, so their timeline is
//! [`TimelineKind::Measured`]. Legacy containers only yield an ordered list
//! of references; their timeline is a placeholder layout tagged
//! [`TimelineKind::Estimated`].

mod estimated;
mod measured;

pub use estimated::estimate_timeline;
pub use measured::measure_timeline;

use serde::{Deserialize, Serialize};

use crate::clip::MediaClip;

/// Provenance of timeline placements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineKind {
    /// Positions read from the composition.
    Measured,
    /// Positions synthesized from discovery order and file sizes.
    Estimated,
}

/// Timeline placements and overall length in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub clips: Vec<MediaClip>,
    pub total_duration: f64,
    pub kind: TimelineKind,
}

impl Timeline {
    pub fn empty(kind: TimelineKind) -> Self {
        Self {
            clips: Vec::new(),
            total_duration: 0.0,
            kind,
        }
    }
}
