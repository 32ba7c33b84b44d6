use std::collections::HashSet;
use std::path::{Path, PathBuf};

use color_eyre::{Result, eyre::Context};
use tracing::instrument;

use crate::playlist::{PLAYLIST_EXTENSION, ParsedPlaylist};

/// Destination path of a source playlist: its file name under `music_dir`.
pub fn destination_playlist_path(music_dir: &Path, playlist: &ParsedPlaylist) -> Option<PathBuf> {
    playlist.file_name().map(|name| music_dir.join(name))
}

pub fn expected_playlists(music_dir: &Path, playlists: &[ParsedPlaylist]) -> HashSet<PathBuf> {
    playlists
        .iter()
        .filter_map(|playlist| destination_playlist_path(music_dir, playlist))
        .collect()
}

/// Delete destination playlists that no current source maps to.
///
/// In dry-run mode stale playlists are only logged. Returns the stale paths,
/// whether or not they were actually removed. Failing to list `music_dir` is
/// an error; failing to delete a single playlist is logged and skipped.
#[instrument(skip(playlists))]
pub fn remove_stale_playlists(
    music_dir: &Path,
    playlists: &[ParsedPlaylist],
    dry_run: bool,
) -> Result<Vec<PathBuf>> {
    let expected = expected_playlists(music_dir, playlists);
    let entries = std::fs::read_dir(music_dir)
        .with_context(|| format!("Failed to list {}", music_dir.display()))?;

    let mut stale = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("error reading entry in {}: {}", music_dir.display(), e);
                continue;
            }
        };
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        let name = entry.file_name();
        if is_dir || !name.to_string_lossy().ends_with(PLAYLIST_EXTENSION) {
            continue;
        }

        let playlist_path = music_dir.join(&name);
        if expected.contains(&playlist_path) {
            continue;
        }

        if dry_run {
            tracing::info!("[DRYRUN] would delete old playlist: {}", playlist_path.display());
        } else if let Err(e) = std::fs::remove_file(&playlist_path) {
            tracing::warn!(
                "error deleting old playlist {}: {}",
                playlist_path.display(),
                e
            );
            continue;
        } else {
            tracing::info!("Deleted old playlist: {}", playlist_path.display());
        }
        stale.push(playlist_path);
    }

    stale.sort();
    Ok(stale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::write_file;

    fn sources(names: &[&str]) -> Vec<ParsedPlaylist> {
        names
            .iter()
            .map(|name| ParsedPlaylist::unreadable(&Path::new("/playlists").join(name)))
            .collect()
    }

    fn music_dir_with(files: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for file in files {
            write_file(&dir.path().join(file), b"#EXTM3U\n");
        }
        dir
    }

    #[test]
    fn test_expected_playlists() {
        let expected = expected_playlists(Path::new("/usb/Music"), &sources(&["A.m3u8", "B.m3u"]));
        assert!(expected.contains(Path::new("/usb/Music/A.m3u8")));
        assert!(expected.contains(Path::new("/usb/Music/B.m3u")));
        assert_eq!(expected.len(), 2);
    }

    #[test]
    fn test_removes_stale_playlists() {
        let dir = music_dir_with(&["A.m3u8", "C.m3u8", "notes.txt", "old.m3u"]);
        std::fs::create_dir(dir.path().join("Folder.m3u8")).unwrap();

        let stale = remove_stale_playlists(dir.path(), &sources(&["A.m3u8"]), false).unwrap();

        assert_eq!(stale, vec![dir.path().join("C.m3u8")]);
        assert!(dir.path().join("A.m3u8").exists());
        assert!(!dir.path().join("C.m3u8").exists());
        assert!(dir.path().join("notes.txt").exists());
        assert!(dir.path().join("old.m3u").exists());
        assert!(dir.path().join("Folder.m3u8").is_dir());
    }

    #[test]
    fn test_dry_run_deletes_nothing() {
        let dir = music_dir_with(&["A.m3u8", "C.m3u8"]);

        let stale = remove_stale_playlists(dir.path(), &sources(&["A.m3u8"]), true).unwrap();

        assert_eq!(stale, vec![dir.path().join("C.m3u8")]);
        assert!(dir.path().join("A.m3u8").exists());
        assert!(dir.path().join("C.m3u8").exists());
    }

    #[test]
    fn test_never_deletes_current_playlists() {
        let dir = music_dir_with(&["A.m3u8", "B.m3u8"]);

        for dry_run in [false, true] {
            let stale =
                remove_stale_playlists(dir.path(), &sources(&["A.m3u8", "B.m3u8"]), dry_run)
                    .unwrap();
            assert!(stale.is_empty());
        }
        assert!(dir.path().join("A.m3u8").exists());
        assert!(dir.path().join("B.m3u8").exists());
    }

    #[test]
    fn test_missing_music_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = remove_stale_playlists(&dir.path().join("Music"), &sources(&["A.m3u8"]), false);
        assert!(result.is_err());
    }
}
