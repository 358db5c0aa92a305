//! CLI command definitions and dispatch.
//!
//! Each group of subcommands lives in its own submodule:
//! - `browse`: catalog queries (folders, indexes, directories, now playing)
//! - `media`: streaming, downloads, cover art and scrobbling
//! - `configure`: writing the config file

mod browse;
mod configure;
mod media;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config::{self, Config};
use crate::subsonic::{StreamOptions, SubsonicClient};

pub use browse::{
    cmd_artist, cmd_artists, cmd_browse, cmd_folders, cmd_indexes, cmd_license, cmd_now_playing,
    cmd_ping,
};
pub use configure::cmd_configure;
pub use media::{cmd_cover_art, cmd_download, cmd_scrobble, cmd_stream};

/// Subsonic CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Server host and optional port (overrides the config file)
    #[arg(long, global = true, env = "SUBSONIC_HOST")]
    pub host: Option<String>,

    /// Username (overrides the config file)
    #[arg(short, long, global = true, env = "SUBSONIC_USER")]
    pub user: Option<String>,

    /// Password (overrides the config file)
    #[arg(short, long, global = true, env = "SUBSONIC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Answer from built-in sample data instead of a server
    #[arg(long, global = true)]
    pub mock: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Check that the server is reachable
    Ping,
    /// Show the server license
    License,
    /// List top-level music folders
    Folders,
    /// List the artist index
    Indexes {
        /// Only this music folder
        #[arg(long)]
        folder: Option<i64>,
        /// Only if changed since this time (milliseconds since the epoch)
        #[arg(long)]
        since: Option<i64>,
    },
    /// List artists organized by ID3 tags
    Artists {
        /// Only this music folder
        #[arg(long)]
        folder: Option<i64>,
    },
    /// Show one ID3 artist and its albums
    Artist {
        /// Artist id
        id: i64,
    },
    /// List the contents of a directory
    Browse {
        /// Directory id
        id: i64,
    },
    /// Show what is being played right now
    NowPlaying,
    /// Save a (possibly transcoded) stream of a media item to a file
    Stream {
        /// Media id
        id: i64,
        /// Output file
        #[arg(short, long)]
        out: PathBuf,
        /// Maximum bit rate in kbps
        #[arg(long)]
        max_bit_rate: Option<u32>,
        /// Target format, e.g. mp3
        #[arg(long)]
        format: Option<String>,
        /// Start offset in seconds
        #[arg(long)]
        time_offset: Option<u32>,
        /// Video size, e.g. 640x480
        #[arg(long)]
        size: Option<String>,
        /// Ask the server for an estimated content length
        #[arg(long)]
        estimate_content_length: bool,
    },
    /// Download a media item in its original format
    Download {
        /// Media id
        id: i64,
        /// Output file
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Save cover art to a file
    CoverArt {
        /// Cover art id
        id: i64,
        /// Output file
        #[arg(short, long)]
        out: PathBuf,
        /// Scale to this many pixels
        #[arg(long)]
        size: Option<u32>,
    },
    /// Register a play of a media item
    Scrobble {
        /// Media id
        id: i64,
        /// Play time (milliseconds since the epoch)
        #[arg(long)]
        time: Option<i64>,
        /// Only update "now playing" instead of submitting a play
        #[arg(long)]
        now_playing: bool,
    },
    /// Write connection settings to the config file
    Configure {
        /// Connect with https
        #[arg(long)]
        tls: bool,
        /// Request timeout in seconds (0 = none)
        #[arg(long)]
        timeout: Option<u64>,
        /// Hide video items when browsing
        #[arg(long)]
        exclude_video: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let rt = Runtime::new()?;
    let config = load_config(cli);

    if let Commands::Configure {
        tls,
        timeout,
        exclude_video,
    } = &cli.command
    {
        return cmd_configure(cli.config.as_deref(), config, *tls, *timeout, *exclude_video);
    }

    let client = rt.block_on(connect(cli, &config))?;

    match &cli.command {
        Commands::Ping => cmd_ping(&rt, &client),
        Commands::License => cmd_license(&rt, &client),
        Commands::Folders => cmd_folders(&rt, &client),
        Commands::Indexes { folder, since } => cmd_indexes(&rt, &client, *folder, *since),
        Commands::Artists { folder } => cmd_artists(&rt, &client, *folder),
        Commands::Artist { id } => cmd_artist(&rt, &client, *id),
        Commands::Browse { id } => cmd_browse(&rt, &client, *id),
        Commands::NowPlaying => cmd_now_playing(&rt, &client),
        Commands::Stream {
            id,
            out,
            max_bit_rate,
            format,
            time_offset,
            size,
            estimate_content_length,
        } => {
            let options = StreamOptions {
                max_bit_rate: *max_bit_rate,
                format: format.clone(),
                time_offset: *time_offset,
                size: size.clone(),
                estimate_content_length: estimate_content_length.then_some(true),
            };
            cmd_stream(&rt, &client, *id, &options, out)
        }
        Commands::Download { id, out } => cmd_download(&rt, &client, *id, out),
        Commands::CoverArt { id, out, size } => cmd_cover_art(&rt, &client, *id, *size, out),
        Commands::Scrobble {
            id,
            time,
            now_playing,
        } => cmd_scrobble(&rt, &client, *id, *time, !*now_playing),
        Commands::Configure { .. } => Ok(()),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Config file contents with command-line and environment overrides applied
fn load_config(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };
    config.override_server(cli.host.clone(), cli.user.clone(), cli.password.clone());
    config
}

async fn connect(cli: &Cli, config: &Config) -> anyhow::Result<SubsonicClient> {
    if cli.mock {
        return Ok(SubsonicClient::mock().await?);
    }
    let settings = config.client_settings()?;
    Ok(SubsonicClient::connect(settings).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_stream_options() {
        let cli = Cli::try_parse_from([
            "subsonic",
            "stream",
            "42",
            "--out",
            "song.mp3",
            "--max-bit-rate",
            "128",
            "--format",
            "mp3",
        ])
        .unwrap();

        match cli.command {
            Commands::Stream {
                id,
                max_bit_rate,
                format,
                time_offset,
                estimate_content_length,
                ..
            } => {
                assert_eq!(id, 42);
                assert_eq!(max_bit_rate, Some(128));
                assert_eq!(format.as_deref(), Some("mp3"));
                assert_eq!(time_offset, None);
                assert!(!estimate_content_length);
            }
            _ => panic!("expected stream command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["subsonic", "indexes", "--folder", "3", "--mock"]).unwrap();
        assert!(cli.mock);
        assert!(matches!(
            cli.command,
            Commands::Indexes {
                folder: Some(3),
                since: None
            }
        ));
    }

    #[test]
    fn test_explicit_config_path_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nhost = \"file-host\"\nusername = \"bob\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "subsonic",
            "ping",
            "--config",
            path.to_str().unwrap(),
            "--host",
            "flag-host",
        ])
        .unwrap();

        let config = load_config(&cli);
        assert_eq!(config.server.host, "flag-host");
        assert_eq!(config.server.username, "bob");
    }

    #[test]
    fn test_mock_commands_run() {
        let cli = Cli::try_parse_from(["subsonic", "browse", "1", "--mock"]).unwrap();
        assert!(run_command(&cli).is_ok());

        let cli = Cli::try_parse_from(["subsonic", "now-playing", "--mock"]).unwrap();
        assert!(run_command(&cli).is_ok());
    }
}
