//! Adapter layer: Convert Subsonic payloads to domain models
//!
//! This is the ONLY place where raw payload maps become domain types. Each
//! builder reads one item through [`Fields`], so the coercion rules are the
//! same wherever a field appears. A bad required field fails the whole call.

use serde_json::Value;

use super::envelope::Envelope;
use super::normalize::{Fields, ItemMap, normalize_list, section};
use super::request::VideoPolicy;
use crate::error::{Error, Result};
use crate::model::{
    AlbumSummary, ArtistDetail, Directory, DirectoryListing, IndexArtist, IndexGroup, License,
    MediaItem, MediaKind, MusicFolder, NowPlayingEntry, Status,
};

/// Build the ping status from the envelope header
pub fn to_status(envelope: &Envelope) -> Status {
    Status {
        status: "ok".to_string(),
        server_version: envelope.server_version.clone(),
        xmlns: envelope.xmlns.clone(),
    }
}

/// Build the license from a `getLicense` payload
pub fn to_license(payload: &ItemMap) -> Result<License> {
    let license = Fields::new("license", section(payload, "getLicense", "license")?);

    Ok(License {
        valid: license.bool("valid")?,
        email: license.text("email")?,
        key: license.text("key")?,
        issued: license.timestamp("date")?,
        expires: license.opt_timestamp("licenseExpires"),
    })
}

/// Build music folders from a `getMusicFolders` payload
pub fn to_music_folders(payload: &ItemMap) -> Result<Vec<MusicFolder>> {
    const OP: &str = "getMusicFolders";
    let container = Fields::new("music folders", section(payload, OP, "musicFolders")?);

    container
        .list(OP, "musicFolder")?
        .into_iter()
        .map(|item| build_music_folder(Fields::new("music folder", item)))
        .collect()
}

fn build_music_folder(fields: Fields<'_>) -> Result<MusicFolder> {
    Ok(MusicFolder {
        id: fields.id("id")?,
        name: fields.required_text("name")?,
    })
}

/// Build index groups from a `getIndexes` payload
pub fn to_indexes(payload: &ItemMap) -> Result<Vec<IndexGroup>> {
    to_index_groups(payload, "getIndexes", "indexes")
}

/// Build index groups from a `getArtists` payload
pub fn to_artist_indexes(payload: &ItemMap) -> Result<Vec<IndexGroup>> {
    to_index_groups(payload, "getArtists", "artists")
}

fn to_index_groups(
    payload: &ItemMap,
    operation: &'static str,
    wrapper: &str,
) -> Result<Vec<IndexGroup>> {
    let container = Fields::new("indexes", section(payload, operation, wrapper)?);

    container
        .list(operation, "index")?
        .into_iter()
        .map(|item| build_index_group(operation, Fields::new("index", item)))
        .collect()
}

fn build_index_group(operation: &'static str, fields: Fields<'_>) -> Result<IndexGroup> {
    let artists = fields
        .list(operation, "artist")?
        .into_iter()
        .map(|item| build_index_artist(Fields::new("index artist", item)))
        .collect::<Result<Vec<_>>>()?;

    Ok(IndexGroup {
        name: fields.text("name")?,
        artists,
    })
}

fn build_index_artist(fields: Fields<'_>) -> Result<IndexArtist> {
    Ok(IndexArtist {
        id: fields.id("id")?,
        name: fields.text("name")?,
        album_count: fields.opt_int("albumCount"),
        cover_art_id: fields.opt_id("coverArt"),
    })
}

/// Build a directory listing from a `getMusicDirectory` payload
pub fn to_directory_listing(payload: &ItemMap, videos: VideoPolicy) -> Result<DirectoryListing> {
    const OP: &str = "getMusicDirectory";
    let directory = Fields::new("directory", section(payload, OP, "directory")?);

    let mut listing = DirectoryListing {
        id: directory.opt_id("id"),
        name: directory.opt_text("name"),
        children_reported: directory.get("child").is_some(),
        ..Default::default()
    };

    for item in directory.list(OP, "child")? {
        let fields = Fields::new("directory entry", item);
        if fields.flag("isDir") {
            listing.directories.push(build_directory(fields)?);
            continue;
        }

        let media = build_media_item(fields)?;
        if media.kind == MediaKind::Video && videos == VideoPolicy::Exclude {
            tracing::warn!("Dropping video item {} ({}) from listing", media.id, media.title);
            continue;
        }
        listing.media.push(media);
    }

    Ok(listing)
}

fn build_directory(fields: Fields<'_>) -> Result<Directory> {
    let fields = fields.as_entity("directory");

    Ok(Directory {
        id: fields.id("id")?,
        parent: fields.id("parent")?,
        title: fields.text("title")?,
        album: fields.text("album")?,
        artist: fields.text("artist")?,
        cover_art_id: fields.opt_id("coverArt"),
        created: fields.timestamp("created")?,
    })
}

/// Build a media item (song or video) from one `child` or `entry` object.
///
/// Only identity and `created` are required. Format details some servers
/// leave out (type, suffix, size, duration, bit rate) read as zero or empty.
fn build_media_item(fields: Fields<'_>) -> Result<MediaItem> {
    let fields = fields.as_entity("media item");
    let kind = if fields.flag("isVideo") {
        MediaKind::Video
    } else {
        MediaKind::Audio
    };

    Ok(MediaItem {
        id: fields.id("id")?,
        parent: fields.id("parent")?,
        title: fields.text("title")?,
        album: fields.text("album")?,
        artist: fields.opt_text("artist"),
        content_type: fields.opt_text("contentType").unwrap_or_default(),
        suffix: fields.opt_text("suffix").unwrap_or_default(),
        transcoded_content_type: fields.opt_text("transcodedContentType"),
        transcoded_suffix: fields.opt_text("transcodedSuffix"),
        size: fields.opt_int("size").unwrap_or_default(),
        duration: fields.opt_duration("duration").unwrap_or_default(),
        bit_rate: fields.opt_int("bitRate").unwrap_or_default(),
        track: fields.opt_int("track"),
        disc_number: fields.opt_int("discNumber"),
        year: fields.opt_int("year"),
        genre: fields.opt_text("genre"),
        album_id: fields.opt_id("albumId"),
        artist_id: fields.opt_id("artistId"),
        cover_art_id: fields.opt_id("coverArt"),
        path: fields.opt_text("path"),
        media_type: fields.opt_text("type"),
        created: fields.timestamp("created")?,
        kind,
    })
}

/// Build now-playing entries from a `getNowPlaying` payload.
///
/// When nobody is playing, servers send an empty string in place of the
/// `nowPlaying` object or of its `entry` list; both mean zero entries.
pub fn to_now_playing(payload: &ItemMap) -> Result<Vec<NowPlayingEntry>> {
    const OP: &str = "getNowPlaying";

    let container = match payload.get("nowPlaying") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::String(s)) if s.is_empty() => return Ok(Vec::new()),
        Some(_) => Fields::new("now playing", section(payload, OP, "nowPlaying")?),
    };

    let entries = match container.get("entry") {
        Some(Value::String(s)) if s.is_empty() => return Ok(Vec::new()),
        other => normalize_list(other, OP, "entry")?,
    };

    entries
        .into_iter()
        .map(|item| build_now_playing_entry(Fields::new("now playing entry", item)))
        .collect()
}

fn build_now_playing_entry(fields: Fields<'_>) -> Result<NowPlayingEntry> {
    Ok(NowPlayingEntry {
        item: build_media_item(fields)?,
        minutes_ago: required_i32(&fields, "minutesAgo")?,
        player_id: required_i32(&fields, "playerId")?,
        player_name: fields.opt_text("playerName"),
        username: fields.opt_text("username"),
    })
}

/// Build an artist with albums from a `getArtist` payload
pub fn to_artist_detail(payload: &ItemMap) -> Result<ArtistDetail> {
    const OP: &str = "getArtist";
    let artist = Fields::new("artist", section(payload, OP, "artist")?);

    let albums = artist
        .list(OP, "album")?
        .into_iter()
        .map(|item| build_album_summary(Fields::new("album", item)))
        .collect::<Result<Vec<_>>>()?;

    Ok(ArtistDetail {
        id: artist.id("id")?,
        name: artist.text("name")?,
        cover_art_id: artist.opt_id("coverArt"),
        album_count: artist.opt_int("albumCount"),
        albums,
    })
}

fn build_album_summary(fields: Fields<'_>) -> Result<AlbumSummary> {
    Ok(AlbumSummary {
        id: fields.id("id")?,
        name: fields.text("name")?,
        artist: fields.opt_text("artist"),
        artist_id: fields.opt_id("artistId"),
        cover_art_id: fields.opt_id("coverArt"),
        song_count: fields.opt_int("songCount"),
        duration: fields.opt_duration("duration"),
        created: fields.timestamp("created")?,
    })
}

fn required_i32(fields: &Fields<'_>, field: &str) -> Result<i32> {
    let value = fields.int(field)?;
    i32::try_from(value)
        .map_err(|_| Error::invalid(fields.entity(), field, format!("{} out of range", value)))
}
