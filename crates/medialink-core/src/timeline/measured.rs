use std::collections::HashMap;
use tracing::{debug, warn};

use super::{Timeline, TimelineKind};
use crate::clip::MediaClip;
use crate::graph::{CompositionGraph, MobIndex, Segment, SourceClip};
use crate::limits::ValidatorConfig;
use crate::paths::{file_name, file_stem, is_generic_name, split_extension};
use crate::resolver::{name_cross_check, pick_name};

/// Places every source reference of the top-level compositions on a track.
///
/// Each slot carrying a segment is one track. Placements inherit link and
/// validity data from the validated clip with the same identity; the same
/// source may be placed many times.
pub fn measure_timeline(
    graph: &CompositionGraph,
    validated: &[MediaClip],
    config: &ValidatorConfig,
) -> Timeline {
    let by_id: HashMap<&str, &MediaClip> = validated
        .iter()
        .filter_map(|c| c.clip_id.as_deref().map(|id| (id, c)))
        .collect();

    let mut placer = Placer {
        graph,
        by_id,
        max_depth: config.limits.max_timeline_depth,
        clips: Vec::new(),
    };
    let mut total_duration: f64 = 0.0;

    for (_, composition) in graph.toplevel() {
        let mut track_index = 0;
        for slot in composition.slot_list() {
            let Some(segment) = &slot.segment else {
                continue;
            };
            let edit_rate = composition
                .edit_rate
                .or(slot.edit_rate)
                .filter(|r| *r > 0.0)
                .unwrap_or(config.timeline.default_edit_rate);

            let slot_start = slot.start as f64 / edit_rate;
            placer.place(segment, track_index, slot_start, edit_rate, 0);

            let slot_end = (slot.start as f64 + slot.length() as f64) / edit_rate;
            total_duration = total_duration.max(slot_end);
            track_index += 1;
        }
    }

    debug!(
        placements = placer.clips.len(),
        total_duration, "measured timeline reconstructed"
    );
    Timeline {
        clips: placer.clips,
        total_duration,
        kind: TimelineKind::Measured,
    }
}

struct Placer<'g> {
    graph: &'g CompositionGraph,
    by_id: HashMap<&'g str, &'g MediaClip>,
    max_depth: usize,
    clips: Vec<MediaClip>,
}

impl Placer<'_> {
    fn place(&mut self, segment: &Segment, track: usize, cursor: f64, edit_rate: f64, depth: usize) {
        if depth > self.max_depth {
            return;
        }
        match segment {
            Segment::SourceClip(clip @ SourceClip { mob: Some(index), .. }) => {
                self.emit(clip, *index, track, cursor, edit_rate);
            }
            Segment::Sequence { components, .. } => {
                let mut position = cursor;
                for component in components {
                    self.place(component, track, position, edit_rate, depth + 1);
                    position += component.length().max(0) as f64 / edit_rate;
                }
            }
            Segment::Group { segments, .. } => {
                for member in segments {
                    self.place(member, track, cursor, edit_rate, depth + 1);
                }
            }
            Segment::SourceClip(_) | Segment::Filler { .. } => {}
        }
    }

    fn emit(&mut self, clip: &SourceClip, index: MobIndex, track: usize, start: f64, edit_rate: f64) {
        let source = match self.graph.mob(index) {
            Ok(source) => source,
            Err(e) => {
                warn!(error = %e, "skipping timeline placement");
                return;
            }
        };
        let source_id = self.graph.source_id(index);
        let matched = self.by_id.get(source_id.as_str()).copied();

        let mob_name = pick_name([source.name.as_deref()]).map(|n| split_extension(&n).0.to_string());
        let descriptor = source.descriptor.as_ref();
        let locator_stem = descriptor
            .and_then(|d| d.locator_path())
            .filter(|p| !is_generic_name(file_name(p)))
            .map(|p| file_stem(&p).to_string());
        let matched_stem = matched
            .and_then(|m| m.external_path.as_deref())
            .map(|p| file_stem(p).to_string());

        let name = mob_name
            .or_else(|| {
                pick_name([
                    clip.name.as_deref(),
                    descriptor.and_then(|d| d.name.as_deref()),
                    matched.map(|m| m.name.as_str()),
                ])
            })
            .or(locator_stem)
            .or(matched_stem)
            .unwrap_or_else(|| format!("Clip_{}", self.clips.len() + 1));

        let end = start + clip.length.max(0) as f64 / edit_rate;
        let external_path = matched.and_then(|m| m.external_path.clone());
        let (name_matches_file, expected_filename) = name_cross_check(&name, external_path.as_deref());

        let mut placement = MediaClip::new(name, source_id)
            .with_embedded(matched.is_some_and(|m| m.is_embedded))
            .with_placement(track, start, end);
        placement.external_path = external_path;
        placement.is_valid = matched.map_or(true, |m| m.is_valid);
        placement.name_matches_file = name_matches_file;
        placement.expected_filename = expected_filename;
        self.clips.push(placement);
    }
}
