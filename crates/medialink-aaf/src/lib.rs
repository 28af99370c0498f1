//! AAF reader for medialink.
//!
//! Opens the compound-file container, decodes the stored object model and
//! hands a [`CompositionGraph`] to the validator through the
//! [`GraphReader`] capability.

pub mod builder;
pub mod error;
pub mod pid;
pub mod property;
pub mod store;

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use medialink_core::{CompositionGraph, GraphReadError, GraphReader};
use tracing::debug;

pub use builder::{build_graph, MAX_SEGMENT_DEPTH};
pub use error::{AafError, AafResult};
pub use property::PropertySet;
pub use store::{ObjectStore, StoredObject};

/// Graph reader for AAF compound files.
#[derive(Debug, Default, Clone, Copy)]
pub struct AafReader;

impl AafReader {
    pub fn new() -> Self {
        Self
    }

    /// Reads a graph from any seekable compound-file source.
    pub fn read_from<F: Read + Seek>(&self, inner: F) -> AafResult<CompositionGraph> {
        let mut store = ObjectStore::open(inner)?;
        let graph = build_graph(&mut store)?;
        debug!(
            mobs = graph.len(),
            compositions = graph.toplevel().count(),
            "aaf graph built"
        );
        Ok(graph)
    }
}

impl GraphReader for AafReader {
    fn read_graph(&self, path: &Path) -> Result<CompositionGraph, GraphReadError> {
        let file = File::open(path)?;
        Ok(self.read_from(BufReader::new(file))?)
    }
}
