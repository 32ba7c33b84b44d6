use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use crate::ports::mirror::{MirrorError, MirrorExecutor};

/// Mirrors with the `rsync` binary, streaming its progress to our stdout.
#[derive(Debug, Clone)]
pub struct RsyncMirror {
    binary: String,
}

impl RsyncMirror {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl MirrorExecutor for RsyncMirror {
    fn synchronize(
        &self,
        source: &Path,
        destination: &Path,
        dry_run: bool,
    ) -> Result<(), MirrorError> {
        let program = which::which(&self.binary).map_err(|_| MirrorError::BinaryNotFound {
            binary: self.binary.clone(),
        })?;

        let args = build_rsync_args(dry_run, source, destination);
        tracing::debug!("Running {} {:?}", program.display(), args);

        let status = Command::new(&program)
            .args(&args)
            .status()
            .map_err(|source| MirrorError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        if !status.success() {
            return Err(MirrorError::Failed {
                binary: self.binary.clone(),
                status,
            });
        }
        Ok(())
    }
}

/// `-avL --progress --delete [--dry-run] <source>/ <destination>/`
///
/// Both directories get a trailing separator so rsync copies the contents of
/// `source` rather than nesting the directory itself.
pub fn build_rsync_args(dry_run: bool, source: &Path, destination: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-avL", "--progress", "--delete"]
        .into_iter()
        .map(OsString::from)
        .collect();
    if dry_run {
        args.push("--dry-run".into());
    }
    args.push(with_trailing_separator(source));
    args.push(with_trailing_separator(destination));
    args
}

fn with_trailing_separator(path: &Path) -> OsString {
    let mut arg = path.as_os_str().to_os_string();
    if !arg.to_string_lossy().ends_with(std::path::MAIN_SEPARATOR) {
        arg.push(std::path::MAIN_SEPARATOR_STR);
    }
    arg
}
