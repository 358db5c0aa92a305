//! Subsonic client - an async client library for the Subsonic music server API.
//!
//! The library turns the server's loosely typed JSON into strongly typed
//! models (see [`model`]) and exposes one async method per API operation on
//! [`SubsonicClient`]. The `subsonic` binary is a thin CLI over the same API.

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod subsonic;
#[cfg(test)]
pub mod test_utils;

pub use error::{Error, Result};
pub use subsonic::{ClientSettings, MediaStream, StreamOptions, SubsonicClient, VideoPolicy};
