//! Last-resort scan used when the structured strategies find nothing.

use regex::bytes::Regex;
use tracing::debug;

use super::strategies::StrategyError;
use crate::clip::MediaClip;
use crate::decode::{decode_first, PATH_ENCODINGS};
use crate::limits::ScanLimits;
use crate::paths::{file_name, has_separator};
use crate::resolver::ClipResolver;

const AUDIO_REFERENCE_PATTERN: &str = concat!(
    r"(?-u)[^\x00]{1,200}\.(wav|aif|aiff|mp3|m4a|caf|sd2|WAV|AIF|AIFF|MP3|M4A|CAF|SD2)",
    r"(\x00|[\x20-\x7E]{0,10})"
);

/// How far back from the end of a match the path start is searched for.
const PATH_START_LOOKBACK: usize = 50;

/// Offset of the nearest separator or drive colon, searching backward from
/// the end of `run` but no further than [`PATH_START_LOOKBACK`] bytes.
fn path_start(run: &[u8]) -> usize {
    for i in (0..run.len()).rev() {
        if matches!(run[i], b'\\' | b'/' | b':') {
            return i;
        }
        if i + PATH_START_LOOKBACK < run.len() {
            break;
        }
    }
    0
}

/// Emits one linked clip per loose audio-file reference.
pub fn aggressive_scan(
    data: &[u8],
    resolver: &ClipResolver,
    limits: &ScanLimits,
) -> Result<Vec<MediaClip>, StrategyError> {
    let re = Regex::new(AUDIO_REFERENCE_PATTERN)?;
    let mut clips: Vec<MediaClip> = Vec::new();

    for m in re.find_iter(data) {
        if clips.len() >= limits.max_aggressive_matches {
            debug!(
                limit = limits.max_aggressive_matches,
                "aggressive scan reached its clip limit"
            );
            break;
        }

        let run = m.as_bytes();
        let candidate = &run[path_start(run)..];
        let candidate = match candidate.iter().position(|&b| b == 0) {
            Some(end) => &candidate[..end],
            None => candidate,
        };

        let path = decode_first(candidate, PATH_ENCODINGS, |text| {
            let text = text.trim();
            (text.chars().count() > 4 && has_separator(text)).then(|| text.to_string())
        });

        if let Some(path) = path {
            let counter = clips.len() + 1;
            let name = match file_name(&path) {
                "" => format!("Audio Reference {counter}"),
                base => base.to_string(),
            };
            clips.push(MediaClip::linked(
                name,
                format!("omf_ref_{counter}"),
                resolver.resolve(&path),
            ));
        }
    }

    Ok(clips)
}
