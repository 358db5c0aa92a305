//! Command-line interface for the Subsonic client.
//!
//! Every command except `configure` connects (and pings) first, then runs a
//! single API operation and prints the result.

mod commands;

pub use commands::{Cli, Commands, run_command};
