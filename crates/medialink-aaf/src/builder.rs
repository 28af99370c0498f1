//! Turns stored AAF objects into a [`CompositionGraph`].
//!
//! Mobs are read in two passes: the first registers every mob so that
//! source references can be resolved by id regardless of order, the second
//! fills in slots and segment trees.

use std::collections::{HashMap, HashSet};
use std::io::{Read, Seek};

use medialink_core::{
    CompositionGraph, Descriptor, Locator, Mob, MobIndex, Presence, Segment, Slot, SourceClip,
};
use tracing::{debug, warn};

use crate::error::{AafError, AafResult};
use crate::pid;
use crate::property::PropertySet;
use crate::store::{ObjectStore, StoredObject};

/// Deepest segment nesting the builder follows.
pub const MAX_SEGMENT_DEPTH: usize = 128;

/// Builds the composition graph of an opened AAF file.
pub fn build_graph<F: Read + Seek>(store: &mut ObjectStore<F>) -> AafResult<CompositionGraph> {
    let root = store.root()?;
    let header = store
        .child(&root, pid::ROOT_HEADER)?
        .ok_or_else(|| AafError::missing("header", &root.path))?;
    let content = store
        .child(&header, pid::HEADER_CONTENT)?
        .ok_or_else(|| AafError::missing("content storage", &header.path))?;

    let essence = essence_index(store, &content)?;
    let stored_mobs = store.children(&content, pid::CONTENT_MOBS)?;
    debug!(mobs = stored_mobs.len(), essence = essence.len(), "content storage read");

    let mut graph = CompositionGraph::new();
    let mut by_id = HashMap::new();
    for stored in &stored_mobs {
        let mob = registered_mob(store, stored, &essence)?;
        let id = mob.mob_id.clone();
        let index = graph.add_mob(mob);
        if let Some(id) = id {
            by_id.entry(id).or_insert(index);
        }
    }

    let mut builder = SegmentBuilder {
        by_id: &by_id,
        referenced: HashSet::new(),
    };
    for (i, stored) in stored_mobs.iter().enumerate() {
        let slots = builder.slots(store, stored)?;
        if let Some(mob) = graph.mob_mut(MobIndex(i)) {
            mob.slots = slots;
        }
    }

    mark_compositions(&mut graph, &builder.referenced);
    Ok(graph)
}

/// Presence of stored essence per mob id.
fn essence_index<F: Read + Seek>(
    store: &mut ObjectStore<F>,
    content: &StoredObject,
) -> AafResult<HashMap<String, Presence>> {
    let mut index = HashMap::new();
    for data in store.children(content, pid::CONTENT_ESSENCE_DATA)? {
        let Some(mob_id) = data.properties.mob_id(pid::ESSENCE_DATA_MOB_ID) else {
            warn!(path = %data.path, "essence data without a mob id");
            continue;
        };
        let presence = match store.data_stream_len(&data, pid::ESSENCE_DATA_DATA)? {
            Some(len) if len > 0 => Presence::Present,
            _ => Presence::Empty,
        };
        index.insert(mob_id, presence);
    }
    Ok(index)
}

/// First-pass mob: identity, name, descriptor and essence, no slots yet.
fn registered_mob<F: Read + Seek>(
    store: &mut ObjectStore<F>,
    stored: &StoredObject,
    essence: &HashMap<String, Presence>,
) -> AafResult<Mob> {
    let props = &stored.properties;
    let mob_id = props.mob_id(pid::MOB_ID);
    let descriptor = match store.child(stored, pid::SOURCE_MOB_ESSENCE_DESCRIPTION) {
        Ok(Some(object)) => Some(descriptor(store, &object)?),
        Ok(None) => None,
        Err(e) => {
            warn!(path = %stored.path, error = %e, "unreadable essence descriptor");
            None
        }
    };

    Ok(Mob {
        name: props.string(pid::MOB_NAME).filter(|n| !n.is_empty()),
        essence: mob_id
            .as_ref()
            .and_then(|id| essence.get(id).copied())
            .unwrap_or_default(),
        mob_id,
        descriptor,
        slots: None,
        edit_rate: None,
    })
}

fn descriptor<F: Read + Seek>(store: &mut ObjectStore<F>, object: &StoredObject) -> AafResult<Descriptor> {
    let mut descriptor = Descriptor::new(descriptor_class(&object.properties));
    for stored in store.children(object, pid::DESCRIPTOR_LOCATOR)? {
        let props = &stored.properties;
        if let Some(url) = props.string(pid::NETWORK_LOCATOR_URL) {
            descriptor.locators.push(Locator::url(url));
        } else if let Some(name) = props.string(pid::TEXT_LOCATOR_NAME) {
            descriptor.locators.push(Locator::path(name));
        }
    }
    Ok(descriptor)
}

/// Descriptor class told apart by the properties it carries.
fn descriptor_class(props: &PropertySet) -> &'static str {
    if [
        pid::SOUND_AUDIO_SAMPLING_RATE,
        pid::SOUND_CHANNELS,
        pid::SOUND_QUANTIZATION_BITS,
    ]
    .iter()
    .any(|&p| props.has(p))
    {
        "SoundDescriptor"
    } else if props.has(pid::FILE_DESCRIPTOR_SAMPLE_RATE) {
        "FileDescriptor"
    } else {
        "EssenceDescriptor"
    }
}

struct SegmentBuilder<'a> {
    by_id: &'a HashMap<String, MobIndex>,
    referenced: HashSet<MobIndex>,
}

impl SegmentBuilder<'_> {
    /// Second-pass slots of a mob; `None` when it has no slot property.
    fn slots<F: Read + Seek>(
        &mut self,
        store: &mut ObjectStore<F>,
        mob: &StoredObject,
    ) -> AafResult<Option<Vec<Slot>>> {
        if !mob.properties.has(pid::MOB_SLOTS) {
            return Ok(None);
        }
        let mut slots = Vec::new();
        for stored in store.children(mob, pid::MOB_SLOTS)? {
            let props = &stored.properties;
            let segment = match store.child(&stored, pid::SLOT_SEGMENT) {
                Ok(Some(object)) => match self.segment(store, &object, 0) {
                    Ok(segment) => Some((segment, object.properties.media_kind())),
                    Err(e) => {
                        warn!(path = %object.path, error = %e, "skipping unreadable segment");
                        None
                    }
                },
                Ok(None) => None,
                Err(e) => {
                    warn!(path = %stored.path, error = %e, "skipping unreadable segment");
                    None
                }
            };
            let (segment, media_kind) = match segment {
                Some((segment, kind)) => (Some(segment), kind),
                None => (None, None),
            };
            slots.push(Slot {
                name: props.string(pid::SLOT_NAME).filter(|n| !n.is_empty()),
                media_kind: media_kind.map(str::to_string),
                segment,
                start: props.int(pid::SLOT_ORIGIN).unwrap_or(0),
                edit_rate: props.rational(pid::SLOT_EDIT_RATE),
            });
        }
        Ok(Some(slots))
    }

    fn segment<F: Read + Seek>(
        &mut self,
        store: &mut ObjectStore<F>,
        object: &StoredObject,
        depth: usize,
    ) -> AafResult<Segment> {
        if depth > MAX_SEGMENT_DEPTH {
            return Err(AafError::TooDeep(MAX_SEGMENT_DEPTH));
        }
        let props = &object.properties;
        let length = props.int(pid::COMPONENT_LENGTH);

        if props.has(pid::SEQUENCE_COMPONENTS) {
            let mut components = Vec::new();
            for child in store.children(object, pid::SEQUENCE_COMPONENTS)? {
                components.push(self.segment(store, &child, depth + 1)?);
            }
            return Ok(match length {
                Some(length) => Segment::Sequence {
                    name: None,
                    components,
                    length,
                },
                None => Segment::sequence(components),
            });
        }

        if props.has(pid::SOURCE_ID) {
            let mob = props.mob_id(pid::SOURCE_ID).and_then(|id| self.lookup(&id));
            return Ok(Segment::SourceClip(SourceClip {
                name: None,
                mob,
                start: props.int(pid::SOURCE_START_TIME).unwrap_or(0),
                length: length.unwrap_or(0),
            }));
        }

        if pid::GROUP_MEMBERS.iter().any(|&p| props.has(p)) {
            let mut segments = Vec::new();
            for &member in pid::GROUP_MEMBERS {
                for child in store.children(object, member)? {
                    segments.extend(self.group_member(store, &child, depth + 1)?);
                }
            }
            return Ok(match length {
                Some(length) => Segment::Group {
                    name: None,
                    segments,
                    length,
                },
                None => Segment::group(segments),
            });
        }

        Ok(Segment::filler(length.unwrap_or(0)))
    }

    /// Group members are segments, except nested scopes which hold slots.
    fn group_member<F: Read + Seek>(
        &mut self,
        store: &mut ObjectStore<F>,
        object: &StoredObject,
        depth: usize,
    ) -> AafResult<Option<Segment>> {
        if object.properties.has(pid::SLOT_SEGMENT) {
            return match store.child(object, pid::SLOT_SEGMENT)? {
                Some(inner) => self.segment(store, &inner, depth + 1).map(Some),
                None => Ok(None),
            };
        }
        self.segment(store, object, depth).map(Some)
    }

    fn lookup(&mut self, id: &str) -> Option<MobIndex> {
        let index = self.by_id.get(id).copied();
        match index {
            Some(index) => {
                self.referenced.insert(index);
            }
            None => debug!(mob_id = %id, "source reference leaves the file"),
        }
        index
    }
}

/// Lists unreferenced mobs that carry slots and are not file sources as
/// top-level compositions. When every such mob is referenced, all of them
/// are listed.
fn mark_compositions(graph: &mut CompositionGraph, referenced: &HashSet<MobIndex>) {
    let candidates: Vec<MobIndex> = graph
        .mobs()
        .filter(|(_, mob)| mob.descriptor.is_none() && !mob.slot_list().is_empty())
        .map(|(index, _)| index)
        .collect();
    let roots: Vec<MobIndex> = candidates
        .iter()
        .copied()
        .filter(|index| !referenced.contains(index))
        .collect();

    let chosen = if roots.is_empty() { candidates } else { roots };
    debug!(compositions = chosen.len(), "top-level compositions");
    for index in chosen {
        graph.mark_toplevel(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pid;

    #[test]
    fn test_descriptor_class() {
        let mut sound = PropertySet::default();
        sound.push(pid::SOUND_CHANNELS, pid::SF_DATA, 2u32.to_le_bytes().to_vec());
        assert_eq!(descriptor_class(&sound), "SoundDescriptor");

        let mut file = PropertySet::default();
        file.push(pid::FILE_DESCRIPTOR_SAMPLE_RATE, pid::SF_DATA, vec![0; 8]);
        assert_eq!(descriptor_class(&file), "FileDescriptor");

        assert_eq!(descriptor_class(&PropertySet::default()), "EssenceDescriptor");
    }

    #[test]
    fn test_compositions_are_unreferenced_mobs() {
        let mut graph = CompositionGraph::new();
        let source = graph.add_mob(
            Mob::new()
                .with_descriptor(Descriptor::new("SoundDescriptor"))
                .with_slots(vec![Slot::sound(Segment::filler(1))]),
        );
        let master = graph.add_mob(Mob::new().with_slots(vec![Slot::sound(Segment::source_clip(source, 1))]));
        let comp = graph.add_mob(Mob::new().with_slots(vec![Slot::sound(Segment::source_clip(master, 1))]));

        let referenced: HashSet<MobIndex> = [source, master].into_iter().collect();
        mark_compositions(&mut graph, &referenced);
        let toplevel: Vec<MobIndex> = graph.toplevel().map(|(i, _)| i).collect();
        assert_eq!(toplevel, vec![comp]);
    }

    #[test]
    fn test_compositions_fall_back_to_all_candidates() {
        let mut graph = CompositionGraph::new();
        let a = graph.add_mob(Mob::new().with_slots(vec![Slot::sound(Segment::filler(1))]));
        let b = graph.add_mob(Mob::new().with_slots(vec![Slot::sound(Segment::filler(1))]));
        let referenced: HashSet<MobIndex> = [a, b].into_iter().collect();
        mark_compositions(&mut graph, &referenced);
        assert_eq!(graph.toplevel().count(), 2);
    }
}
