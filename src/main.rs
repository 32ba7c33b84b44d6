mod collect;
mod config;
mod logging;
mod normalize;
mod pipeline;
mod playlist;
mod ports;
mod reconcile;
mod rewrite;
mod rsync;
mod staging;
mod transfer;

#[cfg(test)]
mod test_utils;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context};

use crate::{
    config::{Config, SyncConfig, SyncOverrides},
    logging::{init_tracing, shutdown_tracing},
    pipeline::run_sync,
    rsync::RsyncMirror,
    staging::StageMode,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, global = true, env = "PLAYLIST_SYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `playlist_sync=debug`
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: String,

    /// OTLP/HTTP endpoint to export traces to
    #[arg(long, global = true, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy every track referenced by the playlists onto the volume and
    /// rewrite the playlists next to them
    Sync {
        /// Glob matching the playlists to sync, e.g. "~/Playlists/*.m3u8"
        #[arg(short, long, env = "PLAYLIST_SYNC_PLAYLIST")]
        playlist: Option<String>,

        /// Root of the destination volume, e.g. /Volumes/UNTITLED
        #[arg(short, long, env = "PLAYLIST_SYNC_USB_ROOT")]
        usb_root: Option<String>,

        /// Show what would change without touching the destination
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// How tracks are staged before the transfer
        #[arg(long, value_enum)]
        stage_mode: Option<StageMode>,

        /// rsync binary to mirror with
        #[arg(long)]
        rsync: Option<String>,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let tracer_provider = init_tracing(
        env!("CARGO_PKG_NAME"),
        args.otlp_endpoint.as_deref(),
        &args.log_level,
    )?;

    let result = run(args);
    shutdown_tracing(tracer_provider);
    result
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Commands::Sync {
            playlist,
            usb_root,
            dry_run,
            stage_mode,
            rsync,
        } => {
            tracing::debug!("Loading configuration");
            let file_config = match &args.config {
                Some(path) => Config::from_file(path),
                None => Config::load(),
            }
            .wrap_err("Failed to load playlist-sync config")?;

            let config = SyncConfig::resolve(
                SyncOverrides {
                    playlist,
                    usb_root,
                    dry_run,
                    rsync,
                    stage_mode,
                },
                file_config,
            )?;

            if config.dry_run {
                tracing::info!(
                    "[DRYRUN] no changes will be made to {}",
                    config.usb_root.display()
                );
            }

            let started = Instant::now();
            let mirror = RsyncMirror::new(config.rsync_binary.clone());
            let report = run_sync(&config, &mirror, config.stage_mode.stager().as_ref())?;

            tracing::info!(
                "Sync finished in {}: {}",
                humantime::format_duration(std::time::Duration::from_secs(
                    started.elapsed().as_secs()
                )),
                report
            );
        }
        Commands::Config(config_commands) => match config_commands {
            ConfigCommands::CreateDefault => {
                let path = Config::create_default()?;
                println!("{}", path.display());
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        },
    }

    Ok(())
}
