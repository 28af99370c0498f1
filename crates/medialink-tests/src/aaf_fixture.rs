//! Synthetic AAF compound files for end-to-end tests.
//!
//! Fixtures are described with small builder types and serialized into an
//! in-memory compound file laid out the way `medialink-aaf` reads it:
//! one storage per object, a `properties` stream per storage, and
//! `{name} index` streams for vectors and sets.

use std::io::{self, Cursor, Read, Seek, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use cfb::CompoundFile;

use medialink_aaf::pid;
use medialink_aaf::property::{encode_utf16, format_mob_id, PropertySet, AUID_LEN, MOB_ID_LEN};
use medialink_aaf::store::{element_name, index_name, join, PROPERTIES_STREAM};

/// Kind of data a slot carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Sound,
    Picture,
}

impl DataKind {
    fn auid(self) -> [u8; AUID_LEN] {
        let data2: u16 = match self {
            DataKind::Sound => 0x0200,
            DataKind::Picture => 0x0100,
        };
        let mut auid = [0u8; AUID_LEN];
        auid[0..4].copy_from_slice(&0x0103_0202u32.to_le_bytes());
        auid[4..6].copy_from_slice(&data2.to_le_bytes());
        auid[8..].copy_from_slice(&[0x06, 0x0e, 0x2b, 0x34, 0x04, 0x01, 0x01, 0x01]);
        auid
    }
}

/// Stored mob id for fixture mob `n`.
pub fn umid(n: u8) -> [u8; MOB_ID_LEN] {
    let mut id = [0u8; MOB_ID_LEN];
    id[..12].copy_from_slice(&[0x06, 0x0a, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x0f, 0x00]);
    id[12] = 0x13;
    id[31] = n;
    id
}

/// Rendered mob id for fixture mob `n`, as it appears in reports.
pub fn umid_string(n: u8) -> String {
    format_mob_id(&umid(n)).unwrap_or_default()
}

/// Segment of a fixture slot.
#[derive(Debug, Clone)]
pub enum FixtureSegment {
    SourceClip {
        source: Option<u8>,
        start: i64,
        length: i64,
    },
    Sequence(Vec<FixtureSegment>),
    Filler(i64),
    Selector {
        selected: Box<FixtureSegment>,
        alternates: Vec<FixtureSegment>,
    },
}

impl FixtureSegment {
    /// Source clip referencing fixture mob `source`.
    pub fn clip(source: u8, length: i64) -> Self {
        FixtureSegment::SourceClip {
            source: Some(source),
            start: 0,
            length,
        }
    }

    fn length(&self) -> i64 {
        match self {
            FixtureSegment::SourceClip { length, .. } | FixtureSegment::Filler(length) => *length,
            FixtureSegment::Sequence(items) => items.iter().map(FixtureSegment::length).sum(),
            FixtureSegment::Selector { selected, .. } => selected.length(),
        }
    }
}

/// Slot of a fixture mob.
#[derive(Debug, Clone)]
pub struct FixtureSlot {
    pub name: Option<String>,
    pub kind: DataKind,
    pub edit_rate: (i32, i32),
    pub origin: i64,
    pub segment: FixtureSegment,
}

impl FixtureSlot {
    pub fn sound(segment: FixtureSegment) -> Self {
        Self {
            name: None,
            kind: DataKind::Sound,
            edit_rate: (48_000, 1),
            origin: 0,
            segment,
        }
    }

    pub fn picture(segment: FixtureSegment) -> Self {
        Self {
            kind: DataKind::Picture,
            edit_rate: (25, 1),
            ..Self::sound(segment)
        }
    }

    pub fn with_edit_rate(mut self, num: i32, den: i32) -> Self {
        self.edit_rate = (num, den);
        self
    }

    pub fn with_origin(mut self, origin: i64) -> Self {
        self.origin = origin;
        self
    }
}

/// Essence descriptor of a fixture source mob.
#[derive(Debug, Clone, Default)]
pub struct FixtureDescriptor {
    pub sound: bool,
    pub urls: Vec<String>,
}

impl FixtureDescriptor {
    pub fn sound() -> Self {
        Self {
            sound: true,
            urls: Vec::new(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.urls.push(url.into());
        self
    }
}

/// Mob of a fixture file.
#[derive(Debug, Clone)]
pub struct FixtureMob {
    pub id: u8,
    pub name: Option<String>,
    pub descriptor: Option<FixtureDescriptor>,
    pub slots: Option<Vec<FixtureSlot>>,
}

impl FixtureMob {
    pub fn new(id: u8) -> Self {
        Self {
            id,
            name: None,
            descriptor: None,
            slots: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_descriptor(mut self, descriptor: FixtureDescriptor) -> Self {
        self.descriptor = Some(descriptor);
        self
    }

    pub fn with_slot(mut self, slot: FixtureSlot) -> Self {
        self.slots.get_or_insert_with(Vec::new).push(slot);
        self
    }
}

/// A whole fixture file.
#[derive(Debug, Clone, Default)]
pub struct AafFixture {
    mobs: Vec<FixtureMob>,
    essence: Vec<(u8, Vec<u8>)>,
}

impl AafFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mob(mut self, mob: FixtureMob) -> Self {
        self.mobs.push(mob);
        self
    }

    /// Stores essence for fixture mob `id`; an empty payload declares
    /// essence without content.
    pub fn essence(mut self, id: u8, payload: &[u8]) -> Self {
        self.essence.push((id, payload.to_vec()));
        self
    }

    /// Serializes the fixture into compound-file bytes.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut file = CompoundFile::create(Cursor::new(Vec::new()))?;
        write_node(&mut file, "/", self.root())?;
        file.flush()?;
        Ok(file.into_inner().into_inner())
    }

    /// Writes the fixture to `path`.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.to_bytes()?)
    }

    fn root(&self) -> Node {
        let mobs = self.mobs.iter().map(mob_node).collect();
        let essence = self
            .essence
            .iter()
            .map(|(id, payload)| {
                let mut node = Node::default();
                node.props.push(pid::ESSENCE_DATA_MOB_ID, pid::SF_DATA, umid(*id).to_vec());
                node.stream(pid::ESSENCE_DATA_DATA, "Data-2702", payload.clone())
            })
            .collect();

        let content = Node::default()
            .set(pid::CONTENT_MOBS, "Mobs-1901", mobs)
            .set(pid::CONTENT_ESSENCE_DATA, "EssenceData-1902", essence);
        let header = Node::default().single(pid::HEADER_CONTENT, "Content-3b03", content);
        Node::default().single(pid::ROOT_HEADER, "Header-2", header)
    }
}

fn mob_node(mob: &FixtureMob) -> Node {
    let mut node = Node::default();
    node.props.push(pid::MOB_ID, pid::SF_DATA, umid(mob.id).to_vec());
    if let Some(name) = &mob.name {
        node.props.push(pid::MOB_NAME, pid::SF_DATA, encode_utf16(name));
    }
    if let Some(descriptor) = &mob.descriptor {
        node = node.single(
            pid::SOURCE_MOB_ESSENCE_DESCRIPTION,
            "EssenceDescription-4701",
            descriptor_node(descriptor),
        );
    }
    if let Some(slots) = &mob.slots {
        node = node.vector(pid::MOB_SLOTS, "Slots-4403", slots.iter().map(slot_node).collect());
    }
    node
}

fn descriptor_node(descriptor: &FixtureDescriptor) -> Node {
    let mut node = Node::default();
    node.props.push(pid::FILE_DESCRIPTOR_SAMPLE_RATE, pid::SF_DATA, rational(48_000, 1));
    if descriptor.sound {
        node.props.push(pid::SOUND_CHANNELS, pid::SF_DATA, 1u32.to_le_bytes().to_vec());
        node.props.push(pid::SOUND_AUDIO_SAMPLING_RATE, pid::SF_DATA, rational(48_000, 1));
    }
    let locators = descriptor
        .urls
        .iter()
        .map(|url| {
            let mut locator = Node::default();
            locator.props.push(pid::NETWORK_LOCATOR_URL, pid::SF_DATA, encode_utf16(url));
            locator
        })
        .collect::<Vec<_>>();
    if !locators.is_empty() {
        node = node.vector(pid::DESCRIPTOR_LOCATOR, "Locator-2f01", locators);
    }
    node
}

fn slot_node(slot: &FixtureSlot) -> Node {
    let mut node = Node::default();
    if let Some(name) = &slot.name {
        node.props.push(pid::SLOT_NAME, pid::SF_DATA, encode_utf16(name));
    }
    node.props.push(pid::SLOT_EDIT_RATE, pid::SF_DATA, rational(slot.edit_rate.0, slot.edit_rate.1));
    node.props.push(pid::SLOT_ORIGIN, pid::SF_DATA, slot.origin.to_le_bytes().to_vec());
    node.single(pid::SLOT_SEGMENT, "Segment-4803", segment_node(&slot.segment, slot.kind))
}

fn segment_node(segment: &FixtureSegment, kind: DataKind) -> Node {
    let mut node = Node::default();
    let mut data_def = vec![0x00, 0x00, 0x02, 0x00, AUID_LEN as u8];
    data_def.extend_from_slice(&kind.auid());
    node.props
        .push(pid::COMPONENT_DATA_DEFINITION, pid::SF_WEAK_OBJECT_REFERENCE, data_def);
    node.props
        .push(pid::COMPONENT_LENGTH, pid::SF_DATA, segment.length().to_le_bytes().to_vec());

    match segment {
        FixtureSegment::SourceClip { source, start, .. } => {
            let id = source.map(umid).unwrap_or([0u8; MOB_ID_LEN]);
            node.props.push(pid::SOURCE_ID, pid::SF_DATA, id.to_vec());
            node.props.push(pid::SOURCE_START_TIME, pid::SF_DATA, start.to_le_bytes().to_vec());
            node
        }
        FixtureSegment::Sequence(items) => node.vector(
            pid::SEQUENCE_COMPONENTS,
            "Components-1001",
            items.iter().map(|item| segment_node(item, kind)).collect(),
        ),
        FixtureSegment::Filler(_) => node,
        FixtureSegment::Selector {
            selected,
            alternates,
        } => node
            .single(pid::SELECTOR_SELECTED, "Selected-f01", segment_node(selected, kind))
            .vector(
                pid::SELECTOR_ALTERNATES,
                "Alternates-f02",
                alternates.iter().map(|item| segment_node(item, kind)).collect(),
            ),
    }
}

fn rational(num: i32, den: i32) -> Vec<u8> {
    let mut out = num.to_le_bytes().to_vec();
    out.extend_from_slice(&den.to_le_bytes());
    out
}

/// Object to be written: its plain properties plus references to children.
#[derive(Debug, Default)]
struct Node {
    props: PropertySet,
    children: Vec<(u16, String, Child)>,
}

#[derive(Debug)]
enum Child {
    Single(Node),
    Vector(Vec<Node>),
    Set(Vec<Node>),
    Stream(Vec<u8>),
}

impl Node {
    fn single(mut self, pid: u16, name: &str, node: Node) -> Self {
        self.children.push((pid, name.to_string(), Child::Single(node)));
        self
    }

    fn vector(mut self, pid: u16, name: &str, nodes: Vec<Node>) -> Self {
        self.children.push((pid, name.to_string(), Child::Vector(nodes)));
        self
    }

    fn set(mut self, pid: u16, name: &str, nodes: Vec<Node>) -> Self {
        self.children.push((pid, name.to_string(), Child::Set(nodes)));
        self
    }

    fn stream(mut self, pid: u16, name: &str, bytes: Vec<u8>) -> Self {
        self.children.push((pid, name.to_string(), Child::Stream(bytes)));
        self
    }
}

fn write_node<F: Read + Write + Seek>(file: &mut CompoundFile<F>, path: &str, node: Node) -> io::Result<()> {
    let mut props = node.props;
    for (pid, name, child) in node.children {
        match child {
            Child::Single(child) => {
                props.push(pid, pid::SF_STRONG_OBJECT_REFERENCE, encode_utf16(&name));
                write_child(file, &join(path, &name), child)?;
            }
            Child::Vector(children) => {
                props.push(pid, pid::SF_STRONG_OBJECT_REFERENCE_VECTOR, encode_utf16(&name));
                let mut index = index_header(children.len())?;
                for key in 0..children.len() as u32 {
                    index.write_u32::<LittleEndian>(key)?;
                }
                write_elements(file, path, &name, index, children)?;
            }
            Child::Set(children) => {
                props.push(pid, pid::SF_STRONG_OBJECT_REFERENCE_SET, encode_utf16(&name));
                let mut index = index_header(children.len())?;
                index.write_u16::<LittleEndian>(pid::MOB_ID)?;
                index.write_u8(AUID_LEN as u8)?;
                for key in 0..children.len() as u32 {
                    index.write_u32::<LittleEndian>(key)?;
                    index.write_u32::<LittleEndian>(1)?;
                    index.write_all(&[0u8; AUID_LEN])?;
                }
                write_elements(file, path, &name, index, children)?;
            }
            Child::Stream(bytes) => {
                let mut data = vec![0x4C];
                data.extend_from_slice(&encode_utf16(&name));
                props.push(pid, pid::SF_DATA_STREAM, data);
                file.create_stream(join(path, &name))?.write_all(&bytes)?;
            }
        }
    }
    let mut stream = file.create_stream(join(path, PROPERTIES_STREAM))?;
    stream.write_all(&props.to_bytes())?;
    Ok(())
}

fn write_child<F: Read + Write + Seek>(file: &mut CompoundFile<F>, path: &str, node: Node) -> io::Result<()> {
    file.create_storage(path)?;
    write_node(file, path, node)
}

fn write_elements<F: Read + Write + Seek>(
    file: &mut CompoundFile<F>,
    parent: &str,
    name: &str,
    index: Vec<u8>,
    children: Vec<Node>,
) -> io::Result<()> {
    file.create_stream(join(parent, &index_name(name)))?.write_all(&index)?;
    for (key, child) in children.into_iter().enumerate() {
        write_child(file, &join(parent, &element_name(name, key as u32)), child)?;
    }
    Ok(())
}

fn index_header(count: usize) -> io::Result<Vec<u8>> {
    let mut index = Vec::new();
    index.write_u32::<LittleEndian>(count as u32)?;
    index.write_u32::<LittleEndian>(count as u32)?;
    index.write_u32::<LittleEndian>(0)?;
    Ok(index)
}
