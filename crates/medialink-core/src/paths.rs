//! Path string heuristics and lexical path helpers.
//!
//! Paths pulled out of interchange files are plain strings authored on
//! whatever machine produced the project, so these helpers work on `&str`
//! rather than `std::path::Path`. Both `/` and `\` count as separators when
//! picking out the file name; normalization is POSIX-style and purely
//! lexical (no symlink resolution, no filesystem access).

use std::path::Path;

/// Audio file extensions recognized by the scanners (lowercase, with dot).
pub const AUDIO_EXTENSIONS: &[&str] = &[".wav", ".aif", ".aiff", ".mp3", ".m4a", ".caf", ".sd2"];

/// Names authoring tools give to anonymous clips.
const GENERIC_NAMES: &[&str] = &["sourceclip", "unnamed", ""];

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Returns true when `s` contains a `/` or `\`.
pub fn has_separator(s: &str) -> bool {
    s.contains(is_separator)
}

/// Returns the component after the last separator.
pub fn file_name(path: &str) -> &str {
    match path.rfind(is_separator) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Splits `path` into stem and extension; the extension keeps its dot.
///
/// Leading dots of the file name do not start an extension, so `.bashrc`
/// has none.
pub fn split_extension(path: &str) -> (&str, &str) {
    let name_start = path.len() - file_name(path).len();
    let name = &path[name_start..];
    let leading_dots = name.len() - name.trim_start_matches('.').len();
    match name.rfind('.') {
        Some(dot) if dot > leading_dots => {
            let split = name_start + dot;
            (&path[..split], &path[split..])
        }
        _ => (path, ""),
    }
}

/// Lowercase extension of `path`, dot included; empty when there is none.
pub fn extension_lower(path: &str) -> String {
    split_extension(path).1.to_lowercase()
}

/// Returns true for extensions in [`AUDIO_EXTENSIONS`].
pub fn is_audio_extension(ext: &str) -> bool {
    let ext = ext.to_lowercase();
    AUDIO_EXTENSIONS.contains(&ext.as_str())
}

/// File name without its extension.
pub fn file_stem(path: &str) -> &str {
    split_extension(file_name(path)).0
}

/// Returns true for placeholder names that carry no information.
pub fn is_generic_name(name: &str) -> bool {
    let lowered = name.trim().to_lowercase();
    GENERIC_NAMES.contains(&lowered.as_str())
}

/// Returns true for POSIX-absolute, drive-letter or backslash-rooted paths.
pub fn is_absolute_path(path: &str) -> bool {
    let bytes = path.as_bytes();
    if path.starts_with('/') || path.starts_with('\\') {
        return true;
    }
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && (bytes[2] == b'\\' || bytes[2] == b'/')
}

/// Lexically normalizes a `/`-separated path.
///
/// Collapses repeated separators and `.` components and resolves `..`
/// against preceding components. A leading `//` is preserved, three or more
/// leading slashes collapse to one. The empty path normalizes to `.`.
pub fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let leading = path.len() - path.trim_start_matches('/').len();
    let prefix = match leading {
        0 => "",
        2 => "//",
        _ => "/",
    };

    let mut parts: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if prefix.is_empty() {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    if prefix.is_empty() && joined.is_empty() {
        ".".to_string()
    } else {
        format!("{prefix}{joined}")
    }
}

/// Joins a relative `path` onto `base_dir` and normalizes the result.
/// Absolute paths are only normalized.
pub fn resolve_against(base_dir: &str, path: &str) -> String {
    if is_absolute_path(path) {
        normalize_path(path)
    } else {
        normalize_path(&format!("{}/{}", base_dir.trim_end_matches('/'), path))
    }
}

/// Absolute, normalized directory containing `file`.
pub fn container_dir(file: &Path) -> String {
    let absolute = if file.is_absolute() {
        file.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(file))
            .unwrap_or_else(|_| file.to_path_buf())
    };
    let normalized = normalize_path(&absolute.to_string_lossy());
    match normalized.rfind('/') {
        Some(0) => "/".to_string(),
        Some(idx) => normalized[..idx].to_string(),
        None => ".".to_string(),
    }
}

fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c.is_control() || c.is_whitespace() {
        return false;
    }
    !matches!(
        c,
        '\u{00AD}'
            | '\u{200B}'..='\u{200F}'
            | '\u{2028}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
            | '\u{E000}'..='\u{F8FF}'
    )
}

/// Heuristic filter for byte runs that decoded into something path-like.
///
/// Rejects short strings, strings that are mostly unprintable or carry too
/// many control characters, file names dominated by punctuation, and
/// implausible extensions.
pub fn is_valid_path_string(s: &str) -> bool {
    let len = s.chars().count();
    if len < 4 {
        return false;
    }

    let printable = s
        .chars()
        .filter(|&c| is_printable(c) || matches!(c, '\n' | '\r' | '\t'))
        .count();
    if (printable as f64) < len as f64 * 0.7 {
        return false;
    }

    let control = s
        .chars()
        .filter(|&c| (c as u32) < 32 && !matches!(c, '\n' | '\r' | '\t'))
        .count();
    if control as f64 > len as f64 * 0.1 {
        return false;
    }

    let name = file_name(s);
    let name_len = name.chars().count();
    let plausible = name
        .chars()
        .filter(|&c| c.is_alphanumeric() || " .-_()[]".contains(c))
        .count();
    if (plausible as f64) < name_len as f64 * 0.6 {
        return false;
    }

    let (_, ext) = split_extension(name);
    if !ext.is_empty() {
        if ext.chars().count() > 10 {
            return false;
        }
        if !ext.chars().skip(1).all(char::is_alphanumeric) {
            return false;
        }
    }

    true
}

/// Case-insensitive, extension-stripped comparison of a display name with
/// the base name of the file it resolved to.
pub fn names_match(display_name: &str, file_path: &str) -> bool {
    let display = split_extension(display_name).0.trim().to_lowercase();
    let expected = file_stem(file_path).trim().to_lowercase();
    display == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_path_passes_filter() {
        assert!(is_valid_path_string(r"C:\Audio\Take1.wav"));
        assert!(is_valid_path_string("/Volumes/Media/VO Line (2).aif"));
    }

    #[test]
    fn test_binary_noise_rejected() {
        let noise: String = (0..200u32)
            .map(|i| char::from_u32(1 + (i * 7) % 30).unwrap())
            .collect();
        assert!(!is_valid_path_string(&noise));
    }

    #[test]
    fn test_short_and_odd_extensions_rejected() {
        assert!(!is_valid_path_string("a.b"));
        assert!(!is_valid_path_string("/tmp/file.waveform_data"));
        assert!(!is_valid_path_string("/tmp/file.w@v"));
        assert!(!is_valid_path_string("/tmp/%%%%##!!.wav"));
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("/a/b/take.WAV"), ("/a/b/take", ".WAV"));
        assert_eq!(split_extension("/a.dir/take"), ("/a.dir/take", ""));
        assert_eq!(split_extension(r"C:\A.dir\take"), (r"C:\A.dir\take", ""));
        assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
        assert_eq!(split_extension("a.b.c"), ("a.b", ".c"));
        assert_eq!(split_extension("x."), ("x", "."));
    }

    #[test]
    fn test_file_name_and_stem() {
        assert_eq!(file_name(r"D:\Sessions\Kick 01.wav"), "Kick 01.wav");
        assert_eq!(file_stem("/m/Kick 01.wav"), "Kick 01");
        assert_eq!(file_name("/m/dir/"), "");
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/proj/./media/../media/a.wav"), "/proj/media/a.wav");
        assert_eq!(normalize_path("a//b/"), "a/b");
        assert_eq!(normalize_path("../x"), "../x");
        assert_eq!(normalize_path("/../x"), "/x");
        assert_eq!(normalize_path("//srv/share"), "//srv/share");
        assert_eq!(normalize_path("///srv"), "/srv");
        assert_eq!(normalize_path(""), ".");
        assert_eq!(normalize_path("a/.."), ".");
    }

    #[test]
    fn test_resolve_against() {
        assert_eq!(resolve_against("/proj", "media/a.wav"), "/proj/media/a.wav");
        assert_eq!(resolve_against("/proj/", "../a.wav"), "/a.wav");
        assert_eq!(resolve_against("/proj", "/abs/a.wav"), "/abs/a.wav");
        assert_eq!(resolve_against("/proj", r"C:\Audio\a.wav"), r"C:\Audio\a.wav");
    }

    #[test]
    fn test_container_dir() {
        assert_eq!(container_dir(Path::new("/proj/show.aaf")), "/proj");
        assert_eq!(container_dir(Path::new("/show.aaf")), "/");
    }

    #[test]
    fn test_names_match() {
        assert!(names_match("VO_Line_04", "/m/VO_Line_04.WAV"));
        assert!(!names_match("VO_Line_04", "/m/vo_line_4.wav"));
        assert!(names_match(" Kick.aif ", "/m/kick.wav"));
    }

    #[test]
    fn test_generic_names() {
        assert!(is_generic_name("SourceClip"));
        assert!(is_generic_name("  "));
        assert!(is_generic_name("UNNAMED"));
        assert!(!is_generic_name("Dialog 3"));
    }
}
