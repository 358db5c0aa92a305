//! Test utilities and fixtures for subsonic-client tests.
//!
//! This module provides builders for domain values and raw payloads to
//! reduce boilerplate in tests.
//!
//! # Example
//!
//! ```ignore
//! use subsonic_client::test_utils::{media_item, song_json};
//!
//! let item = media_item(1, "Wasted");
//! let raw = song_json(1);
//! ```

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};
use std::time::Duration;

use crate::model::{MediaItem, MediaKind};
use crate::subsonic::normalize::ItemMap;

/// Fixed creation time used by the builders
pub fn created() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2013, 8, 12, 0, 12, 24).single().unwrap()
}

/// Creates an audio item with the given id and title.
///
/// The item is a 3:37 mp3 at 192 kbps with no artist or track number.
pub fn media_item(id: i64, title: &str) -> MediaItem {
    MediaItem {
        id,
        parent: 0,
        title: title.to_string(),
        album: String::new(),
        artist: None,
        content_type: "audio/mpeg".to_string(),
        suffix: "mp3".to_string(),
        transcoded_content_type: None,
        transcoded_suffix: None,
        size: 5_218_306,
        duration: Duration::from_secs(217),
        bit_rate: 192,
        track: None,
        disc_number: None,
        year: None,
        genre: None,
        album_id: None,
        artist_id: None,
        cover_art_id: None,
        path: None,
        media_type: None,
        created: created(),
        kind: MediaKind::Audio,
    }
}

/// Raw `child` object for an audio item, as the server sends it
pub fn song_json(id: i64) -> Value {
    json!({
        "id": id.to_string(),
        "parent": "11",
        "title": "Song",
        "album": "Album",
        "artist": "Artist",
        "isDir": false,
        "contentType": "audio/mpeg",
        "suffix": "mp3",
        "size": 4_000_000,
        "duration": 215,
        "bitRate": 192,
        "created": "2013-08-12T00:12:24Z"
    })
}

/// Unwraps a JSON object into a payload map.
///
/// # Panics
///
/// Panics if `value` is not an object.
pub fn payload(value: Value) -> ItemMap {
    match value {
        Value::Object(map) => map,
        other => panic!("payload must be an object, got {}", other),
    }
}

/// Wraps a payload into a complete `subsonic-response` document
pub fn envelope_bytes(payload: Value) -> Vec<u8> {
    let mut inner = json!({
        "status": "ok",
        "version": "1.9.0",
        "xmlns": "http://subsonic.org/restapi"
    });
    if let (Some(inner), Value::Object(extra)) = (inner.as_object_mut(), payload) {
        inner.extend(extra);
    }
    json!({ "subsonic-response": inner }).to_string().into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subsonic::envelope;

    #[test]
    fn test_envelope_bytes_decode() {
        let bytes = envelope_bytes(json!({"nowPlaying": ""}));
        let decoded = envelope::decode(&bytes, "http://test").unwrap();
        assert!(decoded.payload.contains_key("nowPlaying"));
    }

    #[test]
    fn test_media_item_defaults() {
        let item = media_item(7, "Title");
        assert_eq!(item.id, 7);
        assert!(!item.is_video());
    }
}
