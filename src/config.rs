use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::staging::StageMode;

/// Name of the directory on the destination volume that receives both the
/// mirrored tracks and the rewritten playlists.
pub const USB_MUSIC_DIR: &str = "Music";

pub const DEFAULT_RSYNC_BINARY: &str = "rsync";

const DEFAULT_CONFIG: &str = r#"# playlist-sync configuration
#
# Every key is optional; command line flags take precedence.

# Glob matching the playlists to synchronize.
# playlist = "~/Playlists/*.m3u8"

# Mount point of the destination volume.
# usb_root = "/Volumes/UNTITLED"

# Mirror binary used for the transfer.
# rsync = "rsync"

# How tracks are staged before the transfer: "symlink" or "copy".
# stage_mode = "symlink"
"#;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} required (e.g. {example})")]
    Missing {
        name: &'static str,
        example: &'static str,
    },

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No config directory available on this platform")]
    NoConfigDir,
}

/// Values read from the optional TOML config file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    playlist: Option<String>,
    #[serde(default)]
    usb_root: Option<String>,
    #[serde(default)]
    rsync: Option<String>,
    #[serde(default)]
    stage_mode: Option<StageMode>,
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("playlist-sync").join("config.toml"))
    }

    /// Load the config at the default location, or an empty config if there
    /// is none.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Write the commented default config, leaving an existing file alone.
    /// Returns the config path.
    pub fn create_default() -> Result<PathBuf, ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigDir)?;
        if path.exists() {
            tracing::info!("Config already exists at {}", path.display());
            return Ok(path);
        }

        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG)
        };
        write().map_err(|source| ConfigError::Write {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}

/// Values supplied on the command line for a sync run. Anything left unset
/// falls back to the config file.
#[derive(Debug, Default, Clone)]
pub struct SyncOverrides {
    pub playlist: Option<String>,
    pub usb_root: Option<String>,
    pub dry_run: bool,
    pub rsync: Option<String>,
    pub stage_mode: Option<StageMode>,
}

/// Fully resolved settings for one run. Built once, then passed by reference
/// to every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub playlist_glob: String,
    pub usb_root: PathBuf,
    pub dry_run: bool,
    pub rsync_binary: String,
    pub stage_mode: StageMode,
}

impl SyncConfig {
    pub fn resolve(overrides: SyncOverrides, file: Config) -> Result<Self, ConfigError> {
        let playlist = non_empty(overrides.playlist)
            .or(non_empty(file.playlist))
            .ok_or(ConfigError::Missing {
                name: "playlist glob",
                example: "--playlist \"~/Playlists/*.m3u8\"",
            })?;
        let usb_root = non_empty(overrides.usb_root)
            .or(non_empty(file.usb_root))
            .ok_or(ConfigError::Missing {
                name: "usb root",
                example: "--usb-root /Volumes/UNTITLED",
            })?;

        Ok(Self {
            playlist_glob: expand_home(&playlist),
            usb_root: PathBuf::from(expand_home(&usb_root)),
            dry_run: overrides.dry_run,
            rsync_binary: non_empty(overrides.rsync)
                .or(non_empty(file.rsync))
                .unwrap_or_else(|| DEFAULT_RSYNC_BINARY.to_string()),
            stage_mode: overrides.stage_mode.or(file.stage_mode).unwrap_or_default(),
        })
    }

    /// `<usb_root>/Music`
    pub fn music_dir(&self) -> PathBuf {
        self.usb_root.join(USB_MUSIC_DIR)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest).to_string_lossy().into_owned();
    }
    path.to_string()
}
