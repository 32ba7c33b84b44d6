use std::path::{Path, PathBuf};

use color_eyre::{Result, eyre::Context};
use tracing::instrument;

use crate::playlist::{ParsedPlaylist, PlaylistEntry};
use crate::reconcile::destination_playlist_path;

/// Number of non-blank lines shown per playlist in dry-run mode.
pub const MAX_PREVIEW_ENTRIES: usize = 5;

/// Rewrite one retained line for the destination.
///
/// Comments are kept and every path, absolute or not, becomes relative to the
/// music directory (`/music/a.mp3` -> `./music/a.mp3`).
pub fn format_playlist_line(line: &str) -> String {
    match PlaylistEntry::classify(line) {
        PlaylistEntry::Blank => String::new(),
        PlaylistEntry::Comment(comment) => comment.to_string(),
        PlaylistEntry::Path { text, .. } => format!("./{}", text.trim_start_matches('/')),
    }
}

pub fn render_playlist(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| format_playlist_line(line) + "\n")
        .collect()
}

/// Rewritten lines shown for a dry run: everything up to and including the
/// `max`th non-blank line.
pub fn preview_lines(lines: &[String], max: usize) -> Vec<String> {
    let mut preview = Vec::new();
    let mut shown = 0;
    for line in lines {
        if shown >= max {
            break;
        }
        let formatted = format_playlist_line(line);
        if !formatted.is_empty() {
            shown += 1;
        }
        preview.push(formatted);
    }
    preview
}

/// Write every playlist to `music_dir`, or log a preview in dry-run mode.
///
/// Returns the destination paths that were written (or previewed). A
/// playlist that fails to write is logged and left out.
#[instrument(skip(playlists), fields(count = playlists.len()))]
pub fn write_playlists(
    music_dir: &Path,
    playlists: &[ParsedPlaylist],
    dry_run: bool,
) -> Vec<PathBuf> {
    let mut written = Vec::new();
    for playlist in playlists {
        let Some(out_path) = destination_playlist_path(music_dir, playlist) else {
            tracing::warn!(
                "playlist write error {}: no file name",
                playlist.source.display()
            );
            continue;
        };

        if dry_run {
            preview_playlist(&out_path, &playlist.lines);
            written.push(out_path);
            continue;
        }

        match write_playlist(music_dir, &out_path, &playlist.lines) {
            Ok(()) => {
                tracing::debug!("Wrote playlist {}", out_path.display());
                written.push(out_path);
            }
            Err(e) => {
                tracing::warn!("playlist write error {}: {:#}", playlist.source.display(), e);
            }
        }
    }
    written
}

fn write_playlist(music_dir: &Path, out_path: &Path, lines: &[String]) -> Result<()> {
    std::fs::create_dir_all(music_dir)
        .with_context(|| format!("Failed to create {}", music_dir.display()))?;
    std::fs::write(out_path, render_playlist(lines))
        .with_context(|| format!("Failed to write {}", out_path.display()))?;
    Ok(())
}

fn preview_playlist(out_path: &Path, lines: &[String]) {
    tracing::info!(
        "[DRYRUN] would write playlist: {} (preview up to {} entries)",
        out_path.display(),
        MAX_PREVIEW_ENTRIES
    );
    for line in preview_lines(lines, MAX_PREVIEW_ENTRIES) {
        tracing::info!("  {}", line);
    }
}
