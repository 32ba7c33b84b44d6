use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tracing::instrument;

const TEMP_DIR_PREFIX: &str = "music_sync_";

#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("Failed to create staging directory: {0}")]
    CreateDir(#[source] io::Error),
}

/// Places one track inside the staging tree.
pub trait StageFile {
    fn stage(&self, original: &Path, staged: &Path) -> io::Result<()>;
}

/// Links each track into the tree, so nothing is copied before the mirror
/// follows the links.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymlinkStager;

impl StageFile for SymlinkStager {
    #[cfg(unix)]
    fn stage(&self, original: &Path, staged: &Path) -> io::Result<()> {
        std::os::unix::fs::symlink(original, staged)
    }

    #[cfg(windows)]
    fn stage(&self, original: &Path, staged: &Path) -> io::Result<()> {
        std::os::windows::fs::symlink_file(original, staged)
    }
}

/// Copies each track. For filesystems that cannot hold links.
#[derive(Debug, Default, Clone, Copy)]
pub struct CopyStager;

impl StageFile for CopyStager {
    fn stage(&self, original: &Path, staged: &Path) -> io::Result<()> {
        std::fs::copy(original, staged).map(|_| ())
    }
}

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum StageMode {
    #[default]
    Symlink,
    Copy,
}

impl StageMode {
    pub fn stager(self) -> Box<dyn StageFile> {
        match self {
            StageMode::Symlink => Box::new(SymlinkStager),
            StageMode::Copy => Box::new(CopyStager),
        }
    }
}

/// Temporary directory mirroring each track's absolute path. Removed from
/// disk when dropped.
#[derive(Debug)]
pub struct StagingTree {
    dir: TempDir,
    pub staged: usize,
    pub skipped: usize,
}

impl StagingTree {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Staged track locations relative to the tree root, sorted.
    pub fn entries(&self) -> Vec<PathBuf> {
        let mut entries: Vec<PathBuf> = walkdir::WalkDir::new(self.path())
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| !e.file_type().is_dir())
            .filter_map(|e| e.path().strip_prefix(self.path()).ok().map(Path::to_path_buf))
            .collect();
        entries.sort();
        entries
    }
}

/// Position of `track` inside the tree rooted at `root`.
pub fn staged_path(root: &Path, track: &str) -> PathBuf {
    root.join(track.trim_start_matches('/'))
}

/// Build a staging tree in the system temp directory.
pub fn build_staging_tree(
    tracks: &BTreeSet<String>,
    stager: &dyn StageFile,
) -> Result<StagingTree, StagingError> {
    let dir = tempfile::Builder::new()
        .prefix(TEMP_DIR_PREFIX)
        .tempdir()
        .map_err(StagingError::CreateDir)?;
    Ok(stage_into(dir, tracks, stager))
}

/// Stage every track that exists. A missing track or a failed link only
/// skips that track.
#[instrument(skip_all, fields(root = %dir.path().display(), tracks = tracks.len()))]
fn stage_into(dir: TempDir, tracks: &BTreeSet<String>, stager: &dyn StageFile) -> StagingTree {
    let mut staged = 0;
    let mut skipped = 0;

    for track in tracks {
        match stage_track(dir.path(), track, stager) {
            Ok(()) => staged += 1,
            Err(e) => {
                skipped += 1;
                tracing::warn!("{}", e);
            }
        }
    }

    tracing::info!("Staged {} tracks, skipped {}", staged, skipped);
    StagingTree {
        dir,
        staged,
        skipped,
    }
}

fn stage_track(root: &Path, track: &str, stager: &dyn StageFile) -> Result<(), String> {
    let original = Path::new(track);
    std::fs::metadata(original).map_err(|e| format!("src stat error {track}: {e}"))?;

    let target = staged_path(root, track);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("error creating dir for {}: {e}", target.display()))?;
    }

    stager.stage(original, &target).map_err(|e| {
        format!(
            "error staging {} -> {}: {e}",
            target.display(),
            original.display()
        )
    })
}
