use std::collections::HashSet;
use tracing::{debug, warn};

use super::{CompositionGraph, Mob, MobIndex, NodeError, Segment, SourceClip};
use crate::clip::MediaClip;
use crate::resolver::{name_from_path, pick_name, ClipResolver};

/// How a source's media is reached.
#[derive(Debug, Default, PartialEq)]
struct MediaLink {
    path: Option<String>,
    embedded: bool,
}

/// Extracts one clip per distinct source referenced from the top-level
/// compositions of `graph`.
///
/// When that finds nothing, every mob in the registry that references a
/// source is reported instead.
pub fn extract_clips(graph: &CompositionGraph, resolver: &ClipResolver) -> Vec<MediaClip> {
    let mut walker = Walker::new(graph, resolver);
    for (index, composition) in graph.toplevel() {
        debug!(composition = index.0, name = ?composition.name, "walking composition");
        walker.visit_mob(composition, 0);
    }

    if walker.clips.is_empty() {
        debug!(mobs = graph.len(), "no clips under compositions, scanning mob registry");
        walker.scan_registry();
    }

    walker.clips
}

struct Walker<'g> {
    graph: &'g CompositionGraph,
    resolver: &'g ClipResolver,
    clips: Vec<MediaClip>,
    processed: HashSet<String>,
}

impl<'g> Walker<'g> {
    fn new(graph: &'g CompositionGraph, resolver: &'g ClipResolver) -> Self {
        Self {
            graph,
            resolver,
            clips: Vec::new(),
            processed: HashSet::new(),
        }
    }

    fn visit_mob(&mut self, mob: &Mob, depth: usize) {
        for segment in mob.slot_list().iter().filter_map(|s| s.segment.as_ref()) {
            self.visit_segment(segment, depth + 1);
        }
    }

    fn visit_segment(&mut self, segment: &Segment, depth: usize) {
        if let Segment::SourceClip(clip @ SourceClip { mob: Some(index), .. }) = segment {
            match self.source_clip(clip, *index) {
                Ok(Some(media)) => self.clips.push(media),
                Ok(None) => {}
                Err(e) => warn!(depth, error = %e, "skipping source reference"),
            }
        }
        for child in segment.children() {
            self.visit_segment(child, depth + 1);
        }
    }

    fn source_clip(&mut self, clip: &SourceClip, index: MobIndex) -> Result<Option<MediaClip>, NodeError> {
        let source = self.graph.mob(index)?;
        let source_id = self.graph.source_id(index);
        if !self.processed.insert(source_id.clone()) {
            return Ok(None);
        }

        let link = media_link(self.graph, source)?;
        let path = link.path.map(|p| self.resolver.resolve(&p));
        let is_audio = source.is_audio();

        // Sources without any slot list are kept: their kind cannot be told.
        if !(is_audio || path.is_some() || link.embedded || source.slots.is_none()) {
            debug!(source = %source_id, "source is not audio, skipping");
            return Ok(None);
        }

        let descriptor_name = source.descriptor.as_ref().and_then(|d| d.name.as_deref());
        let name = pick_name([clip.name.as_deref(), source.name.as_deref(), descriptor_name])
            .or_else(|| path.as_deref().and_then(name_from_path))
            .unwrap_or_else(|| format!("Clip_{}", self.clips.len() + 1));

        debug!(
            name = %name,
            source = %source_id,
            embedded = link.embedded,
            path = ?path,
            "source clip"
        );
        let media = MediaClip::new(name, source_id).with_embedded(link.embedded);
        Ok(Some(match path {
            Some(p) => media.with_external_path(p),
            None => media,
        }))
    }

    /// Reports every registry mob whose slots reference a source, using the
    /// first such reference.
    fn scan_registry(&mut self) {
        for (index, mob) in self.graph.mobs() {
            let first_source = mob.slot_list().iter().find_map(|slot| match &slot.segment {
                Some(Segment::SourceClip(SourceClip { mob: Some(i), .. })) => Some(*i),
                _ => None,
            });
            let Some(source_index) = first_source else {
                continue;
            };

            let mob_id = self.graph.source_id(index);
            if !self.processed.insert(mob_id.clone()) {
                continue;
            }

            let path = match self.graph.mob(source_index) {
                Ok(source) => source
                    .descriptor
                    .as_ref()
                    .and_then(|d| d.locator_path())
                    .map(|p| self.resolver.resolve(&p)),
                Err(e) => {
                    warn!(mob = %mob_id, error = %e, "registry mob has a dangling source");
                    None
                }
            };
            let name = mob
                .name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| format!("Clip_{}", self.clips.len() + 1));

            let media = MediaClip::new(name, mob_id).with_embedded(path.is_none());
            self.clips.push(match path {
                Some(p) => media.with_external_path(p),
                None => media,
            });
        }
    }
}

/// Decides whether `source` links external media or stores it.
///
/// Descriptor locators win, then declared essence, then one level of nested
/// sources (the master mob to file source hop).
fn media_link(graph: &CompositionGraph, source: &Mob) -> Result<MediaLink, NodeError> {
    if let Some(descriptor) = &source.descriptor {
        if let Some(path) = descriptor.locator_path() {
            return Ok(MediaLink {
                path: Some(path),
                embedded: false,
            });
        }
        if descriptor.declares_essence() {
            return Ok(MediaLink {
                path: None,
                embedded: true,
            });
        }
    }
    if source.essence.is_declared() {
        return Ok(MediaLink {
            path: None,
            embedded: true,
        });
    }

    for slot in source.slot_list() {
        let Some(Segment::SourceClip(SourceClip { mob: Some(index), .. })) = &slot.segment else {
            continue;
        };
        let nested = graph.mob(*index)?;
        if let Some(path) = nested.descriptor.as_ref().and_then(|d| d.locator_path()) {
            return Ok(MediaLink {
                path: Some(path),
                embedded: false,
            });
        }
        let nested_essence = nested.essence.is_declared()
            || nested.descriptor.as_ref().is_some_and(|d| d.declares_essence());
        if nested_essence {
            return Ok(MediaLink {
                path: None,
                embedded: true,
            });
        }
    }

    Ok(MediaLink::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Descriptor, Locator, Presence, Slot};
    use pretty_assertions::assert_eq;

    fn resolver() -> ClipResolver {
        ClipResolver::new("/proj")
    }

    /// Composition -> master -> file source, the usual editor export shape.
    fn linked_chain(graph: &mut CompositionGraph, name: &str, locator: Locator) -> MobIndex {
        let file = graph.add_mob(
            Mob::new()
                .with_id(format!("{name}-file"))
                .with_descriptor(Descriptor::new("SoundDescriptor").with_locator(locator))
                .with_slots(vec![Slot::sound(Segment::filler(0))]),
        );
        graph.add_mob(
            Mob::new()
                .with_id(format!("{name}-master"))
                .with_name(name)
                .with_slots(vec![Slot::sound(Segment::source_clip(file, 48_000))]),
        )
    }

    #[test]
    fn test_master_chain_resolves_nested_locator() {
        let mut graph = CompositionGraph::new();
        let master = linked_chain(&mut graph, "VO_Line_04", Locator::path("media/VO_Line_04.wav"));
        graph.add_composition(
            Mob::new()
                .with_name("Reel 1")
                .with_slots(vec![Slot::sound(Segment::sequence(vec![Segment::source_clip(master, 48_000)]))]),
        );

        let clips = extract_clips(&graph, &resolver());
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].name, "VO_Line_04");
        assert_eq!(clips[0].clip_id.as_deref(), Some("VO_Line_04-master"));
        assert_eq!(clips[0].external_path.as_deref(), Some("/proj/media/VO_Line_04.wav"));
        assert!(!clips[0].is_embedded);
    }

    #[test]
    fn test_repeated_source_reported_once() {
        let mut graph = CompositionGraph::new();
        let master = linked_chain(&mut graph, "Kick", Locator::url("file:///m/kick.wav"));
        graph.add_composition(Mob::new().with_slots(vec![
            Slot::sound(Segment::sequence(vec![
                Segment::source_clip(master, 10),
                Segment::filler(5),
                Segment::source_clip(master, 10),
            ])),
            Slot::sound(Segment::source_clip(master, 10)),
        ]));

        let clips = extract_clips(&graph, &resolver());
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].external_path.as_deref(), Some("/m/kick.wav"));
    }

    #[test]
    fn test_declared_essence_is_embedded() {
        let mut graph = CompositionGraph::new();
        let source = graph.add_mob(
            Mob::new()
                .with_id("pad")
                .with_descriptor(Descriptor::new("PCMDescriptor").with_essence_data(Presence::Empty)),
        );
        graph.add_composition(Mob::new().with_slots(vec![Slot::new(Segment::source_clip(source, 1))]));

        let clips = extract_clips(&graph, &resolver());
        assert_eq!(clips.len(), 1);
        assert!(clips[0].is_embedded);
        assert_eq!(clips[0].external_path, None);
        assert_eq!(clips[0].name, "Clip_1");
    }

    #[test]
    fn test_nested_essence_marks_master_embedded() {
        let mut graph = CompositionGraph::new();
        let file = graph.add_mob(
            Mob::new()
                .with_id("file")
                .with_descriptor(Descriptor::new("SoundDescriptor").with_essence_data(Presence::Present))
                .with_slots(vec![]),
        );
        let master = graph.add_mob(
            Mob::new()
                .with_id("master")
                .with_name("Pad")
                .with_slots(vec![Slot::sound(Segment::source_clip(file, 1))]),
        );
        graph.add_composition(Mob::new().with_slots(vec![Slot::sound(Segment::source_clip(master, 1))]));

        let clips = extract_clips(&graph, &resolver());
        assert_eq!(clips.len(), 1);
        assert!(clips[0].is_embedded);
        assert_eq!(clips[0].name, "Pad");
    }

    #[test]
    fn test_non_audio_sources_skipped_but_slotless_kept() {
        let mut graph = CompositionGraph::new();
        let picture = graph.add_mob(
            Mob::new()
                .with_id("video")
                .with_slots(vec![Slot::new(Segment::filler(1)).with_media_kind("Picture")]),
        );
        let opaque = graph.add_mob(Mob::new().with_id("opaque").with_name("Mystery"));
        graph.add_composition(Mob::new().with_slots(vec![
            Slot::new(Segment::source_clip(picture, 1)),
            Slot::new(Segment::source_clip(opaque, 1)),
        ]));

        let clips = extract_clips(&graph, &resolver());
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].clip_id.as_deref(), Some("opaque"));
        assert!(!clips[0].is_embedded);
        assert_eq!(clips[0].external_path, None);
    }

    #[test]
    fn test_generic_names_fall_back_to_file_name() {
        let mut graph = CompositionGraph::new();
        let master = linked_chain(&mut graph, "SourceClip", Locator::path("/m/Door Slam.wav"));
        graph.add_composition(Mob::new().with_slots(vec![Slot::sound(Segment::source_clip(master, 1))]));

        let clips = extract_clips(&graph, &resolver());
        assert_eq!(clips[0].name, "Door Slam.wav");
    }

    #[test]
    fn test_group_members_are_walked() {
        let mut graph = CompositionGraph::new();
        let a = linked_chain(&mut graph, "A", Locator::path("/m/a.wav"));
        let b = linked_chain(&mut graph, "B", Locator::path("/m/b.wav"));
        graph.add_composition(Mob::new().with_slots(vec![Slot::sound(Segment::group(vec![
            Segment::source_clip(a, 1),
            Segment::sequence(vec![Segment::source_clip(b, 1)]),
        ]))]));

        let names: Vec<String> = extract_clips(&graph, &resolver()).into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_dangling_reference_dropped_and_walk_continues() {
        let mut graph = CompositionGraph::new();
        let a = linked_chain(&mut graph, "A", Locator::path("/m/a.wav"));
        graph.add_composition(Mob::new().with_slots(vec![Slot::sound(Segment::sequence(vec![
            Segment::source_clip(MobIndex(99), 1),
            Segment::source_clip(a, 1),
        ]))]));

        let clips = extract_clips(&graph, &resolver());
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].name, "A");
    }

    #[test]
    fn test_registry_fallback_when_no_compositions() {
        let mut graph = CompositionGraph::new();
        linked_chain(&mut graph, "Orphan", Locator::path("orphan.wav"));

        let clips = extract_clips(&graph, &resolver());
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].name, "Orphan");
        assert_eq!(clips[0].clip_id.as_deref(), Some("Orphan-master"));
        assert_eq!(clips[0].external_path.as_deref(), Some("/proj/orphan.wav"));
        assert!(!clips[0].is_embedded);
    }

    #[test]
    fn test_registry_fallback_keeps_generic_mob_name() {
        let mut graph = CompositionGraph::new();
        linked_chain(&mut graph, "Unnamed", Locator::path("orphan.wav"));
        linked_chain(&mut graph, "  ", Locator::path("blank.wav"));

        let clips = extract_clips(&graph, &resolver());
        assert_eq!(clips.len(), 2);
        assert_eq!(clips[0].name, "Unnamed");
        assert_eq!(clips[1].name, "Clip_2");
    }
}
