use std::path::{Path, PathBuf};

use crate::normalize::normalize_path;

/// Extension of the playlists kept on the destination volume.
pub const PLAYLIST_EXTENSION: &str = ".m3u8";

const EXTINF_MARKER: &str = "#EXTINF";

#[derive(Debug, thiserror::Error)]
pub enum PlaylistError {
    #[error("Failed to read playlist {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One logical playlist line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistEntry<'a> {
    Blank,
    /// `#EXTINF` metadata and any other `#` comment, kept verbatim.
    Comment(&'a str),
    Path { text: &'a str, absolute: bool },
}

impl<'a> PlaylistEntry<'a> {
    pub fn classify(line: &'a str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            Self::Blank
        } else if trimmed.starts_with('#') {
            Self::Comment(trimmed)
        } else {
            Self::Path {
                text: trimmed,
                absolute: Path::new(trimmed).is_absolute(),
            }
        }
    }
}

/// A source playlist after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPlaylist {
    pub source: PathBuf,
    /// Non-blank lines in source order. Paths that follow an `#EXTINF` line
    /// are normalized; everything else is only trimmed.
    pub lines: Vec<String>,
    /// Normalized absolute track paths, in order of appearance.
    pub tracks: Vec<String>,
}

impl ParsedPlaylist {
    /// Placeholder for a playlist that could not be read. It is still
    /// rewritten (as an empty file) and still protects its destination copy
    /// from cleanup.
    pub fn unreadable(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            lines: Vec::new(),
            tracks: Vec::new(),
        }
    }

    /// Base file name, used as the playlist's name on the destination.
    pub fn file_name(&self) -> Option<&std::ffi::OsStr> {
        self.source.file_name()
    }
}

/// Read and parse a playlist file. Content that is not valid UTF-8 is
/// decoded lossily.
#[tracing::instrument]
pub fn parse_playlist_file(path: &Path) -> Result<ParsedPlaylist, PlaylistError> {
    let bytes = std::fs::read(path).map_err(|source| PlaylistError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let (lines, tracks) = parse_playlist(&String::from_utf8_lossy(&bytes));
    tracing::debug!(
        "Parsed {} lines, {} absolute tracks from {}",
        lines.len(),
        tracks.len(),
        path.display()
    );

    Ok(ParsedPlaylist {
        source: path.to_path_buf(),
        lines,
        tracks,
    })
}

/// Split playlist text into retained lines and absolute track paths.
///
/// Blank lines are dropped. An `#EXTINF` line is always followed by its path
/// line, which is normalized no matter what it contains. When the marker is
/// the last line, it is kept without a path.
pub fn parse_playlist(content: &str) -> (Vec<String>, Vec<String>) {
    let text = content.replace("\r\n", "\n").replace('\r', "\n");
    let mut remaining = text.split('\n');

    let mut lines = Vec::new();
    let mut tracks = Vec::new();

    while let Some(raw) = remaining.next() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with(EXTINF_MARKER) {
            lines.push(line.to_string());
            let Some(path_line) = remaining.next() else {
                break;
            };
            let path = normalize_path(path_line);
            if Path::new(&path).is_absolute() {
                tracks.push(path.clone());
            }
            lines.push(path);
            continue;
        }

        lines.push(line.to_string());
        if let PlaylistEntry::Path { absolute: true, .. } = PlaylistEntry::classify(line) {
            tracks.push(normalize_path(line));
        }
    }

    (lines, tracks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::write_file;

    #[test]
    fn test_blank_lines_are_dropped() {
        let (lines, tracks) = parse_playlist("\n   \n\t\r\n\r\n");
        assert!(lines.is_empty());
        assert!(tracks.is_empty());
    }

    #[test]
    fn test_extinf_followed_by_path() {
        let (lines, tracks) =
            parse_playlist("#EXTM3U\r\n#EXTINF:123,Song Two\r\n  /music//song2.mp3\u{0}  \r\n");

        assert_eq!(
            lines,
            vec!["#EXTM3U", "#EXTINF:123,Song Two", "/music/song2.mp3"]
        );
        assert_eq!(tracks, vec!["/music/song2.mp3"]);
    }

    #[test]
    fn test_extinf_with_relative_path() {
        let (lines, tracks) = parse_playlist("#EXTINF:1,Rel\n./sub/../rel.mp3\n");
        assert_eq!(lines, vec!["#EXTINF:1,Rel", "rel.mp3"]);
        assert!(tracks.is_empty());
    }

    #[test]
    fn test_extinf_as_last_line() {
        let (lines, tracks) = parse_playlist("/music/a.mp3\n#EXTINF:5,Dangling");
        assert_eq!(lines, vec!["/music/a.mp3", "#EXTINF:5,Dangling"]);
        assert_eq!(tracks, vec!["/music/a.mp3"]);
    }

    #[test]
    fn test_extinf_consumes_following_blank_line() {
        let (lines, tracks) = parse_playlist("#EXTINF:5,Gap\n\n/music/a.mp3\n");
        assert_eq!(lines, vec!["#EXTINF:5,Gap", ".", "/music/a.mp3"]);
        assert_eq!(tracks, vec!["/music/a.mp3"]);
    }

    #[test]
    fn test_plain_lines() {
        let (lines, tracks) = parse_playlist(
            "# a comment\n  /music/x/../song1.mp3  \nnotAbsolute.mp3\r/music/song3.mp3",
        );

        assert_eq!(
            lines,
            vec![
                "# a comment",
                "/music/x/../song1.mp3",
                "notAbsolute.mp3",
                "/music/song3.mp3"
            ]
        );
        assert_eq!(tracks, vec!["/music/song1.mp3", "/music/song3.mp3"]);
    }

    #[test]
    fn test_classify() {
        assert_eq!(PlaylistEntry::classify("   "), PlaylistEntry::Blank);
        assert_eq!(
            PlaylistEntry::classify(" #EXTM3U "),
            PlaylistEntry::Comment("#EXTM3U")
        );
        assert_eq!(
            PlaylistEntry::classify("/a.mp3"),
            PlaylistEntry::Path {
                text: "/a.mp3",
                absolute: true
            }
        );
        assert_eq!(
            PlaylistEntry::classify("a.mp3"),
            PlaylistEntry::Path {
                text: "a.mp3",
                absolute: false
            }
        );
    }

    #[test]
    fn test_parse_playlist_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("A.m3u8");
        write_file(&path, b"/music/song1.mp3\n\xff\xfe#bad bytes\n");

        let parsed = parse_playlist_file(&path).unwrap();
        assert_eq!(parsed.source, path);
        assert_eq!(parsed.lines.len(), 2);
        assert_eq!(parsed.tracks, vec!["/music/song1.mp3"]);
        assert_eq!(parsed.file_name().unwrap(), "A.m3u8");
    }

    #[test]
    fn test_parse_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_playlist_file(&dir.path().join("missing.m3u8")).unwrap_err();
        assert!(matches!(err, PlaylistError::Read { .. }));
    }
}
