use std::fmt;

use color_eyre::{Result, eyre::Context};
use tracing::instrument;

use crate::collect::collect_tracks;
use crate::config::SyncConfig;
use crate::ports::mirror::MirrorExecutor;
use crate::reconcile::remove_stale_playlists;
use crate::rewrite::write_playlists;
use crate::staging::{StageFile, build_staging_tree};
use crate::transfer::transfer;

/// Outcome of a sync run. In dry-run mode the playlist counts describe what
/// would have happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub dry_run: bool,
    pub playlists: usize,
    pub unique_tracks: usize,
    pub staged: usize,
    pub skipped: usize,
    pub mirrored: bool,
    pub stale_playlists: usize,
    pub playlists_written: usize,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} playlists, {} unique tracks ({} staged, {} skipped), mirror {}, {} stale playlists removed, {} playlists written",
            if self.dry_run { "[DRYRUN] " } else { "" },
            self.playlists,
            self.unique_tracks,
            self.staged,
            self.skipped,
            if self.mirrored { "ok" } else { "failed" },
            self.stale_playlists,
            self.playlists_written,
        )
    }
}

/// Run the whole sync: collect, stage, mirror, prune, rewrite.
///
/// Only a pattern without matches and a staging directory that cannot be
/// created abort the run. The staging tree is removed before returning, on
/// every path.
#[instrument(skip_all, fields(playlist_glob = %config.playlist_glob, dry_run = config.dry_run))]
pub fn run_sync(
    config: &SyncConfig,
    mirror: &dyn MirrorExecutor,
    stager: &dyn StageFile,
) -> Result<SyncReport> {
    let collection = collect_tracks(&config.playlist_glob)?;
    let staging = build_staging_tree(&collection.tracks, stager)
        .wrap_err("error creating temp dir")?;
    tracing::debug!(
        "Staging tree {} holds {} tracks",
        staging.path().display(),
        staging.staged
    );
    if tracing::enabled!(tracing::Level::TRACE) {
        for entry in staging.entries() {
            tracing::trace!("Staged {}", entry.display());
        }
    }
    let music_dir = config.music_dir();

    let mirrored = transfer(staging.path(), &music_dir, config.dry_run, mirror)
        .unwrap_or_else(|e| {
            tracing::warn!("rsync error: {:#}", e);
            false
        });

    let stale = remove_stale_playlists(&music_dir, &collection.playlists, config.dry_run)
        .unwrap_or_else(|e| {
            tracing::warn!("cleanup error: {:#}", e);
            Vec::new()
        });

    let written = write_playlists(&music_dir, &collection.playlists, config.dry_run);

    Ok(SyncReport {
        dry_run: config.dry_run,
        playlists: collection.playlists.len(),
        unique_tracks: collection.tracks.len(),
        staged: staging.staged,
        skipped: staging.skipped,
        mirrored,
        stale_playlists: stale.len(),
        playlists_written: written.len(),
    })
}
