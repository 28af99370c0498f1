//! Clip identity, naming and path resolution shared by both extractors.

use std::path::Path;

use crate::paths::{
    container_dir, file_name, is_absolute_path, is_generic_name, names_match, normalize_path,
    resolve_against,
};

/// Resolves media paths relative to the directory of one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipResolver {
    base_dir: String,
}

impl ClipResolver {
    /// Creates a resolver anchored at `base_dir`.
    pub fn new(base_dir: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Creates a resolver anchored at the directory containing `container`.
    pub fn for_container(container: &Path) -> Self {
        Self::new(container_dir(container))
    }

    /// Directory relative paths are resolved against.
    pub fn base_dir(&self) -> &str {
        &self.base_dir
    }

    /// Joins relative paths onto the base directory and normalizes.
    pub fn resolve(&self, path: &str) -> String {
        resolve_against(&self.base_dir, path)
    }

    /// Resolves a scanned candidate, keeping the joined form only when it
    /// exists on disk.
    ///
    /// Relative candidates that do not resolve to an existing file keep their
    /// normalized literal form so the not-found report shows what the
    /// container actually said.
    pub fn resolve_existing(&self, candidate: &str) -> String {
        if is_absolute_path(candidate) {
            return normalize_path(candidate);
        }
        let joined = self.resolve(candidate);
        if Path::new(&joined).exists() {
            joined
        } else {
            normalize_path(candidate)
        }
    }
}

/// First candidate that is present and not a generic placeholder, trimmed.
pub fn pick_name<'a, I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !is_generic_name(name))
        .map(str::to_owned)
}

/// Base name of `path` when it is informative.
pub fn name_from_path(path: &str) -> Option<String> {
    pick_name([Some(file_name(path))])
}

/// Cross-checks a display name against the file a clip resolved to.
///
/// Returns `(name_matches_file, expected_filename)`; both are `None` when
/// the clip has no path, which covers embedded essence.
pub fn name_cross_check(
    display_name: &str,
    external_path: Option<&str>,
) -> (Option<bool>, Option<String>) {
    match external_path {
        Some(path) => (
            Some(names_match(display_name, path)),
            Some(file_name(path).to_string()),
        ),
        None => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_relative_path_resolves_against_container() {
        let resolver = ClipResolver::for_container(Path::new("/proj/show.aaf"));
        assert_eq!(resolver.base_dir(), "/proj");
        assert_eq!(resolver.resolve("media/a.wav"), "/proj/media/a.wav");
    }

    #[test]
    fn test_resolve_existing_prefers_joined_when_present() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("media")).unwrap();
        fs::write(tmp.path().join("media/a.wav"), b"RIFF").unwrap();
        let base = tmp.path().to_string_lossy().to_string();
        let resolver = ClipResolver::new(base.clone());

        assert_eq!(
            resolver.resolve_existing("media/./a.wav"),
            format!("{base}/media/a.wav")
        );
        assert_eq!(resolver.resolve_existing("media/b.wav"), "media/b.wav");
        assert_eq!(resolver.resolve_existing("/abs/../c.wav"), "/c.wav");
    }

    #[test]
    fn test_pick_name_skips_placeholders() {
        assert_eq!(
            pick_name([None, Some("SourceClip"), Some("  Dialog 3 ")]),
            Some("Dialog 3".to_string())
        );
        assert_eq!(pick_name([Some("unnamed"), None]), None);
        assert_eq!(name_from_path("/m/dir/"), None);
        assert_eq!(name_from_path(r"C:\m\Kick.wav"), Some("Kick.wav".to_string()));
    }

    #[test]
    fn test_name_cross_check() {
        assert_eq!(
            name_cross_check("VO_Line_04", Some("/m/VO_Line_04.WAV")),
            (Some(true), Some("VO_Line_04.WAV".to_string()))
        );
        assert_eq!(
            name_cross_check("VO_Line_04", Some("/m/vo_line_4.wav")),
            (Some(false), Some("vo_line_4.wav".to_string()))
        );
        assert_eq!(name_cross_check("Pad", None), (None, None));
    }
}
