use std::path::Path;

use color_eyre::{Result, eyre::Context};
use tracing::instrument;

use crate::ports::mirror::MirrorExecutor;

/// Mirror the staging tree into `music_dir`.
///
/// Failing to create `music_dir` is an error. A failed mirror run is only
/// logged, and reported through the returned flag, since the playlists can
/// still be brought up to date.
#[instrument(skip(mirror))]
pub fn transfer(
    staging: &Path,
    music_dir: &Path,
    dry_run: bool,
    mirror: &dyn MirrorExecutor,
) -> Result<bool> {
    std::fs::create_dir_all(music_dir)
        .with_context(|| format!("Failed to create {}", music_dir.display()))?;

    match mirror.synchronize(staging, music_dir, dry_run) {
        Ok(()) => {
            tracing::info!("Mirrored staging tree to {}", music_dir.display());
            Ok(true)
        }
        Err(e) => {
            tracing::warn!("rsync error: {}", e);
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mirror::{MirrorError, MockMirrorExecutor};
    use mockall::predicate::eq;

    #[test]
    fn test_transfer_creates_destination_and_mirrors() {
        let staging = tempfile::tempdir().unwrap();
        let usb = tempfile::tempdir().unwrap();
        let music_dir = usb.path().join("Music");

        let mut mirror = MockMirrorExecutor::new();
        mirror
            .expect_synchronize()
            .with(
                eq(staging.path().to_path_buf()),
                eq(music_dir.clone()),
                eq(true),
            )
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mirrored = transfer(staging.path(), &music_dir, true, &mirror).unwrap();

        assert!(mirrored);
        assert!(music_dir.is_dir());
    }

    #[test]
    fn test_transfer_failure_is_not_fatal() {
        let staging = tempfile::tempdir().unwrap();
        let usb = tempfile::tempdir().unwrap();

        let mut mirror = MockMirrorExecutor::new();
        mirror.expect_synchronize().times(1).returning(|_, _, _| {
            Err(MirrorError::BinaryNotFound {
                binary: "rsync".into(),
            })
        });

        let mirrored = transfer(staging.path(), &usb.path().join("Music"), false, &mirror).unwrap();
        assert!(!mirrored);
    }
}
