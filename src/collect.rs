use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use tracing::instrument;

use crate::normalize::clean_path;
use crate::playlist::{ParsedPlaylist, parse_playlist_file};

#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("Invalid playlist pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("No playlists matched: {pattern}")]
    NoMatches { pattern: String },
}

/// Every matched playlist plus the union of their tracks.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Parsed playlists in sorted source path order.
    pub playlists: Vec<ParsedPlaylist>,
    /// Distinct cleaned absolute track paths across all playlists.
    pub tracks: BTreeSet<String>,
}

impl Collection {
    pub fn from_playlists(playlists: Vec<ParsedPlaylist>) -> Self {
        let tracks = playlists
            .iter()
            .flat_map(|playlist| playlist.tracks.iter())
            .map(|track| clean_path(track))
            .collect();

        Self { playlists, tracks }
    }
}

/// Expand `pattern` and parse every playlist it matches.
///
/// A pattern that fails to compile or matches nothing aborts the run. An
/// unreadable playlist is recorded with no lines so its destination copy is
/// still written and kept.
#[instrument]
pub fn collect_tracks(pattern: &str) -> Result<Collection, CollectError> {
    let playlists = expand_pattern(pattern)?;
    tracing::info!("Found {} playlists matching {}", playlists.len(), pattern);
    warn_on_shared_names(&playlists);

    let parsed = playlists
        .iter()
        .map(|path| {
            parse_playlist_file(path).unwrap_or_else(|e| {
                tracing::warn!("{} (will still attempt to write converted playlist)", e);
                ParsedPlaylist::unreadable(path)
            })
        })
        .collect();

    let collection = Collection::from_playlists(parsed);
    tracing::info!("Collected {} unique tracks", collection.tracks.len());
    Ok(collection)
}

fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>, CollectError> {
    let paths = glob::glob(pattern).map_err(|source| CollectError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut matched: Vec<PathBuf> = paths
        .filter_map(|entry| match entry {
            Ok(path) if path.is_dir() => {
                tracing::warn!("Skipping directory matched as playlist: {}", path.display());
                None
            }
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("Skipping unreadable glob match: {}", e);
                None
            }
        })
        .collect();
    matched.sort();

    if matched.is_empty() {
        return Err(CollectError::NoMatches {
            pattern: pattern.to_string(),
        });
    }
    Ok(matched)
}

/// Playlists with the same file name land on the same destination file.
fn warn_on_shared_names(playlists: &[PathBuf]) {
    let mut seen: HashMap<_, &PathBuf> = HashMap::new();
    for path in playlists {
        let Some(name) = path.file_name() else {
            continue;
        };
        if let Some(previous) = seen.insert(name, path) {
            tracing::warn!(
                "Playlists {} and {} share a file name; only the latter will be kept on the destination",
                previous.display(),
                path.display()
            );
        }
    }
}
