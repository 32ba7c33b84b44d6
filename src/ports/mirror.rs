use std::path::Path;
use std::process::ExitStatus;

#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error("{binary} not found in PATH. Please install it and ensure it's available.")]
    BinaryNotFound { binary: String },

    #[error("Failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        source: std::io::Error,
    },

    #[error("{binary} exited with {status}")]
    Failed { binary: String, status: ExitStatus },
}

/// Port for the tool that mirrors the staging tree onto the destination.
///
/// Implementations live in `rsync` (production) or test mocks. The mirror
/// copies the *contents* of `source` into `destination`, follows links,
/// deletes destination files missing from `source`, and changes nothing when
/// `dry_run` is set.
#[cfg_attr(test, mockall::automock)]
pub trait MirrorExecutor {
    fn synchronize(
        &self,
        source: &Path,
        destination: &Path,
        dry_run: bool,
    ) -> Result<(), MirrorError>;
}
