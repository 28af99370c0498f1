//! Typed composition-graph model and the graph-reader capability.
//!
//! Mobs live in an arena owned by [`CompositionGraph`] and reference each
//! other by [`MobIndex`]. Source clips point at the mob they pull media from;
//! compositions, master mobs and file source mobs are all [`Mob`]s that
//! differ only in which optional parts they carry.

mod walker;

pub use walker::extract_clips;

use std::path::Path;
use thiserror::Error;

/// Position of a mob inside a [`CompositionGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MobIndex(pub usize);

/// Whether an optional property is missing, declared without content, or
/// carries data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Presence {
    #[default]
    Absent,
    Empty,
    Present,
}

impl Presence {
    /// True for declared properties, empty or not.
    pub fn is_declared(self) -> bool {
        !matches!(self, Presence::Absent)
    }
}

/// Where a descriptor says its media lives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Locator {
    pub path: Option<String>,
    pub url_string: Option<String>,
}

impl Locator {
    /// Locator carrying a plain path.
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            url_string: None,
        }
    }

    /// Locator carrying a URL.
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            path: None,
            url_string: Some(url.into()),
        }
    }

    /// Filesystem path this locator points at.
    ///
    /// A non-empty `path` wins. URLs lose a `file://` scheme and percent
    /// escapes; `http` URLs point at nothing local; anything else is taken
    /// literally.
    pub fn file_path(&self) -> Option<String> {
        if let Some(path) = self.path.as_deref().filter(|p| !p.is_empty()) {
            return Some(path.to_string());
        }
        let url = self.url_string.as_deref().filter(|u| !u.is_empty())?;
        if let Some(rest) = url.strip_prefix("file://") {
            Some(percent_decode(rest))
        } else if url.starts_with("http") {
            None
        } else {
            Some(url.to_string())
        }
    }
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let escaped = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(byte) = escaped {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Essence description attached to a source mob.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Descriptor {
    pub name: Option<String>,
    /// Descriptor class, e.g. `SoundDescriptor`.
    pub type_name: String,
    pub locators: Vec<Locator>,
    pub essence: Presence,
    pub essence_data: Presence,
}

impl Descriptor {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    pub fn with_locator(mut self, locator: Locator) -> Self {
        self.locators.push(locator);
        self
    }

    pub fn with_essence_data(mut self, presence: Presence) -> Self {
        self.essence_data = presence;
        self
    }

    /// First locator that resolves to a filesystem path.
    pub fn locator_path(&self) -> Option<String> {
        self.locators.iter().find_map(Locator::file_path)
    }

    /// True when the descriptor declares stored essence.
    pub fn declares_essence(&self) -> bool {
        self.essence.is_declared() || self.essence_data.is_declared()
    }

    /// True when the class name hints at audio.
    pub fn hints_audio(&self) -> bool {
        let lowered = self.type_name.to_lowercase();
        lowered.contains("audio") || lowered.contains("sound")
    }
}

/// A reference to a span of another mob's media.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceClip {
    pub name: Option<String>,
    /// Referenced mob; `None` ends the source chain.
    pub mob: Option<MobIndex>,
    /// Offset into the referenced media, in edit units.
    pub start: i64,
    /// Length in edit units.
    pub length: i64,
}

/// Node of a slot's segment tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    SourceClip(SourceClip),
    /// Components played back to back.
    Sequence {
        name: Option<String>,
        components: Vec<Segment>,
        length: i64,
    },
    /// Segments sharing the same start (effects, selectors, nested scopes).
    Group {
        name: Option<String>,
        segments: Vec<Segment>,
        length: i64,
    },
    /// Gap that advances time without media.
    Filler { length: i64 },
}

impl Segment {
    /// Source clip referencing `mob` for `length` edit units.
    pub fn source_clip(mob: MobIndex, length: i64) -> Self {
        Segment::SourceClip(SourceClip {
            name: None,
            mob: Some(mob),
            start: 0,
            length,
        })
    }

    /// Sequence whose length is the sum of its components.
    pub fn sequence(components: Vec<Segment>) -> Self {
        let length = components
            .iter()
            .map(Segment::length)
            .fold(0i64, i64::saturating_add);
        Segment::Sequence {
            name: None,
            components,
            length,
        }
    }

    /// Group whose length is its longest member.
    pub fn group(segments: Vec<Segment>) -> Self {
        let length = segments.iter().map(Segment::length).max().unwrap_or(0);
        Segment::Group {
            name: None,
            segments,
            length,
        }
    }

    pub fn filler(length: i64) -> Self {
        Segment::Filler { length }
    }

    /// Length in edit units.
    pub fn length(&self) -> i64 {
        match self {
            Segment::SourceClip(clip) => clip.length,
            Segment::Sequence { length, .. } | Segment::Group { length, .. } => *length,
            Segment::Filler { length } => *length,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Segment::SourceClip(clip) => clip.name.as_deref(),
            Segment::Sequence { name, .. } | Segment::Group { name, .. } => name.as_deref(),
            Segment::Filler { .. } => None,
        }
    }

    /// Nested segments, in playback order for sequences.
    pub fn children(&self) -> &[Segment] {
        match self {
            Segment::Sequence { components, .. } => components,
            Segment::Group { segments, .. } => segments,
            Segment::SourceClip(_) | Segment::Filler { .. } => &[],
        }
    }
}

/// A track of a mob.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub name: Option<String>,
    /// Data kind of the track, e.g. `Sound` or `Picture`.
    pub media_kind: Option<String>,
    pub segment: Option<Segment>,
    /// Origin offset in edit units.
    pub start: i64,
    /// Edit units per second.
    pub edit_rate: Option<f64>,
}

impl Slot {
    pub fn new(segment: Segment) -> Self {
        Self {
            name: None,
            media_kind: None,
            segment: Some(segment),
            start: 0,
            edit_rate: None,
        }
    }

    /// Audio track carrying `segment`.
    pub fn sound(segment: Segment) -> Self {
        Self::new(segment).with_media_kind("Sound")
    }

    pub fn with_media_kind(mut self, kind: impl Into<String>) -> Self {
        self.media_kind = Some(kind.into());
        self
    }

    pub fn with_edit_rate(mut self, rate: f64) -> Self {
        self.edit_rate = Some(rate);
        self
    }

    pub fn with_start(mut self, start: i64) -> Self {
        self.start = start;
        self
    }

    /// Length in edit units of the carried segment.
    pub fn length(&self) -> i64 {
        self.segment.as_ref().map(Segment::length).unwrap_or(0)
    }

    /// True when the media kind names sound.
    pub fn is_sound(&self) -> bool {
        self.media_kind
            .as_deref()
            .is_some_and(|k| k.to_lowercase().contains("sound"))
    }
}

/// A composition, master clip or source in the graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mob {
    pub name: Option<String>,
    pub mob_id: Option<String>,
    pub descriptor: Option<Descriptor>,
    /// `None` when the mob has no slot list at all.
    pub slots: Option<Vec<Slot>>,
    pub essence: Presence,
    pub edit_rate: Option<f64>,
}

impl Mob {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.mob_id = Some(id.into());
        self
    }

    pub fn with_descriptor(mut self, descriptor: Descriptor) -> Self {
        self.descriptor = Some(descriptor);
        self
    }

    pub fn with_slots(mut self, slots: Vec<Slot>) -> Self {
        self.slots = Some(slots);
        self
    }

    pub fn with_essence(mut self, presence: Presence) -> Self {
        self.essence = presence;
        self
    }

    pub fn with_edit_rate(mut self, rate: f64) -> Self {
        self.edit_rate = Some(rate);
        self
    }

    /// Slots, empty when the mob has none.
    pub fn slot_list(&self) -> &[Slot] {
        self.slots.as_deref().unwrap_or(&[])
    }

    /// True when the mob declares audio through its slots or descriptor.
    pub fn is_audio(&self) -> bool {
        self.slot_list().iter().any(Slot::is_sound)
            || self.descriptor.as_ref().is_some_and(Descriptor::hints_audio)
    }
}

/// Per-node failure while traversing a graph.
#[derive(Debug, Error)]
pub enum NodeError {
    /// A source clip points outside the mob arena.
    #[error("source reference points at missing mob #{0}")]
    DanglingMob(usize),
}

/// Arena of mobs plus the list of top-level compositions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositionGraph {
    mobs: Vec<Mob>,
    toplevel: Vec<MobIndex>,
}

impl CompositionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mob to the registry and returns its index.
    pub fn add_mob(&mut self, mob: Mob) -> MobIndex {
        self.mobs.push(mob);
        MobIndex(self.mobs.len() - 1)
    }

    /// Adds a mob and lists it as a top-level composition.
    pub fn add_composition(&mut self, mob: Mob) -> MobIndex {
        let index = self.add_mob(mob);
        self.toplevel.push(index);
        index
    }

    /// Lists an existing mob as a top-level composition.
    pub fn mark_toplevel(&mut self, index: MobIndex) {
        if !self.toplevel.contains(&index) {
            self.toplevel.push(index);
        }
    }

    pub fn mob(&self, index: MobIndex) -> Result<&Mob, NodeError> {
        self.mobs.get(index.0).ok_or(NodeError::DanglingMob(index.0))
    }

    pub fn mob_mut(&mut self, index: MobIndex) -> Option<&mut Mob> {
        self.mobs.get_mut(index.0)
    }

    /// Flat mob registry in insertion order.
    pub fn mobs(&self) -> impl Iterator<Item = (MobIndex, &Mob)> {
        self.mobs.iter().enumerate().map(|(i, m)| (MobIndex(i), m))
    }

    /// Top-level compositions; dangling entries are skipped.
    pub fn toplevel(&self) -> impl Iterator<Item = (MobIndex, &Mob)> {
        self.toplevel
            .iter()
            .filter_map(|&i| self.mobs.get(i.0).map(|m| (i, m)))
    }

    pub fn len(&self) -> usize {
        self.mobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mobs.is_empty()
    }

    /// Identity of a mob: its id, or an arena-based key when it has none.
    pub fn source_id(&self, index: MobIndex) -> String {
        self.mobs
            .get(index.0)
            .and_then(|m| m.mob_id.clone())
            .unwrap_or_else(|| format!("mob#{}", index.0))
    }
}

/// Failure to produce a graph from a container.
#[derive(Debug, Error)]
pub enum GraphReadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The container is readable but its structure is not.
    #[error("malformed container: {0}")]
    Malformed(String),
}

/// Capability that turns a graph-format container into a [`CompositionGraph`].
pub trait GraphReader {
    fn read_graph(&self, path: &Path) -> Result<CompositionGraph, GraphReadError>;
}
