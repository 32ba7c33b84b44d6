//! Path cleanup for raw playlist text.
//!
//! Playlists exported by other players often carry stray whitespace, NULs
//! or other control bytes around their paths. Everything here is purely
//! lexical: the filesystem is never consulted.

const SEPARATOR: char = '/';

/// Trim, strip control characters and lexically clean a raw path string.
pub fn normalize_path(raw: &str) -> String {
    clean_path(&strip_control_chars(raw))
}

/// Remove ASCII control characters (below 32, and DEL) after trimming the
/// surrounding whitespace.
pub fn strip_control_chars(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| (*c as u32) >= 32 && *c != '\u{7f}')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Lexically clean a slash separated path.
///
/// Repeated separators collapse to one, `.` segments are dropped and `..`
/// removes the preceding segment. A `..` directly under the root is dropped,
/// while leading `..` segments of a relative path are kept. Trailing
/// separators are removed, and an empty result becomes `.`.
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with(SEPARATOR);
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split(SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if rooted => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_control_chars() {
        assert_eq!(strip_control_chars("  /music/a\u{0}b.mp3\t "), "/music/ab.mp3");
        assert_eq!(strip_control_chars("\u{feff}/x.mp3"), "\u{feff}/x.mp3");
        assert_eq!(strip_control_chars("/a\u{7f}\u{1b}.mp3"), "/a.mp3");
        assert_eq!(strip_control_chars("\u{1} /a.mp3 \u{2}"), "/a.mp3");
    }

    #[test]
    fn test_clean_path() {
        let cases = [
            ("", "."),
            ("/", "/"),
            ("//music///a.mp3", "/music/a.mp3"),
            ("/music/./a.mp3", "/music/a.mp3"),
            ("/music/x/../a.mp3", "/music/a.mp3"),
            ("/../a.mp3", "/a.mp3"),
            ("../../a.mp3", "../../a.mp3"),
            ("a/../../b", "../b"),
            ("a/..", "."),
            ("/music/dir/", "/music/dir"),
            ("./song.mp3", "song.mp3"),
        ];

        for (input, expected) in cases {
            assert_eq!(clean_path(input), expected, "cleaning {input:?}");
        }
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(" \r/music//Artist/./Album/01\u{8} Song.flac\r\n"),
            "/music/Artist/Album/01 Song.flac"
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_path("/music/../music//a.mp3\u{0}");
        assert_eq!(normalize_path(&once), once);
    }
}
