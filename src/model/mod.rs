//! Domain entities returned by the client.
//!
//! These are OUR types - they never expose the loosely typed JSON the server
//! sends. Every value here is built fresh per request by the adapter layer and
//! carries no reference back to the client.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Result of a `ping` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// Status string as reported ("ok")
    pub status: String,
    /// REST protocol version the server speaks
    pub server_version: String,
    /// XML namespace of the API
    pub xmlns: String,
}

/// Server license details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct License {
    pub valid: bool,
    pub email: String,
    pub key: String,
    /// When the license was issued
    pub issued: DateTime<Utc>,
    /// When the license expires, for servers that report it
    pub expires: Option<DateTime<Utc>>,
}

/// A top-level catalog root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MusicFolder {
    pub id: i64,
    pub name: String,
}

/// One alphabetic bucket of artists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexGroup {
    pub name: String,
    pub artists: Vec<IndexArtist>,
}

/// An artist inside an index bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexArtist {
    pub id: i64,
    pub name: String,
    /// Only reported by ID3 browsing
    pub album_count: Option<u32>,
    pub cover_art_id: Option<i64>,
}

/// A sub-directory inside a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    pub id: i64,
    pub parent: i64,
    pub title: String,
    pub album: String,
    pub artist: String,
    pub cover_art_id: Option<i64>,
    pub created: DateTime<Utc>,
}

/// Whether a media item is audio or video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaKind {
    #[default]
    Audio,
    Video,
}

/// A playable file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub id: i64,
    pub parent: i64,
    pub title: String,
    pub album: String,
    pub artist: Option<String>,
    pub content_type: String,
    pub suffix: String,
    /// Set only when the server would transcode this item
    pub transcoded_content_type: Option<String>,
    pub transcoded_suffix: Option<String>,
    /// File size in bytes
    pub size: i64,
    pub duration: Duration,
    /// Bit rate in kbps
    pub bit_rate: i64,
    pub track: Option<i32>,
    pub disc_number: Option<i32>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub album_id: Option<i64>,
    pub artist_id: Option<i64>,
    pub cover_art_id: Option<i64>,
    /// Server-side path, relative to the music folder
    pub path: Option<String>,
    /// Server's own classification ("music", "podcast", ...)
    pub media_type: Option<String>,
    pub created: DateTime<Utc>,
    pub kind: MediaKind,
}

impl MediaItem {
    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }
}

/// Contents of one directory: sub-directories and media, in server order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectoryListing {
    /// Id of the browsed directory, when reported
    pub id: Option<i64>,
    /// Name of the browsed directory, when reported
    pub name: Option<String>,
    /// False when the server sent no `child` key at all, as opposed to an
    /// empty one
    pub children_reported: bool,
    pub directories: Vec<Directory>,
    pub media: Vec<MediaItem>,
}

impl DirectoryListing {
    /// Whether the listing holds at least one directory or media item.
    ///
    /// See `children_reported` to tell a missing `child` key from an empty one.
    pub fn has_children(&self) -> bool {
        !self.directories.is_empty() || !self.media.is_empty()
    }

    pub fn audio(&self) -> impl Iterator<Item = &MediaItem> {
        self.media.iter().filter(|m| m.kind == MediaKind::Audio)
    }

    pub fn videos(&self) -> impl Iterator<Item = &MediaItem> {
        self.media.iter().filter(|m| m.kind == MediaKind::Video)
    }
}

/// A media item currently being played by some user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlayingEntry {
    pub item: MediaItem,
    pub minutes_ago: i32,
    pub player_id: i32,
    pub player_name: Option<String>,
    pub username: Option<String>,
}

/// An album as listed under an artist in ID3 browsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumSummary {
    pub id: i64,
    pub name: String,
    pub artist: Option<String>,
    pub artist_id: Option<i64>,
    pub cover_art_id: Option<i64>,
    pub song_count: Option<u32>,
    pub duration: Option<Duration>,
    pub created: DateTime<Utc>,
}

/// An artist with its albums (ID3 browsing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistDetail {
    pub id: i64,
    pub name: String,
    pub cover_art_id: Option<i64>,
    pub album_count: Option<u32>,
    pub albums: Vec<AlbumSummary>,
}
