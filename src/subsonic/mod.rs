//! Subsonic REST client.
//!
//! # Architecture
//!
//! The server's JSON is a mechanical translation of its XML schema, so the
//! same field can be an object, an array or an empty string depending on how
//! many elements it held. The layers keep that mess contained:
//! - **Request** (`request.rs`) - URL construction from settings + parameters
//! - **Transport** (`transport.rs`) - Live HTTP or canned fixtures
//! - **DTO** (`dto.rs`) - Typed envelope header, untyped payload
//! - **Envelope** (`envelope.rs`) - Status / error decision
//! - **Normalize** (`normalize.rs`) - Cardinality and scalar coercion rules
//! - **Adapter** (`adapter.rs`) - Payload sections to domain models
//! - **Client** (`client.rs`) - One async method per API operation
//!
//! Only the client and the domain models are meant for callers.
//!
//! # Usage
//!
//! ```ignore
//! use subsonic_client::subsonic::{ClientSettings, SubsonicClient};
//!
//! let settings = ClientSettings::new("music.example.com:4040", "alice", "secret");
//! let client = SubsonicClient::connect(settings).await?;
//!
//! for folder in client.get_music_folders().await? {
//!     println!("{}: {}", folder.id, folder.name);
//! }
//! ```

pub mod adapter;
pub mod client;
pub mod dto;
pub mod envelope;
pub mod fixtures;
pub mod normalize;
pub mod request;
pub mod transport;

pub use client::SubsonicClient;
pub use envelope::{Envelope, RemoteError, ResponseStatus};
pub use request::{
    ApiRequest, ClientSettings, DEFAULT_API_VERSION, DEFAULT_CLIENT_NAME, StreamOptions,
    VideoPolicy,
};
pub use transport::{
    ByteStream, Fixture, FixtureTransport, HttpTransport, MediaStream, RawResponse, Transport,
};
