//! subsonic - command-line access to a Subsonic music server.
//!
//! Connection details come from the config file, overridable per run with
//! `--host/--user/--password` or the `SUBSONIC_*` environment variables.

use clap::Parser;
use subsonic_client::cli;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging; stdout is reserved for command output
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("subsonic_client=info".parse()?))
        .init();

    cli::run_command(&args)
}
