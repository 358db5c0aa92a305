//! Canned server responses for the mock client.
//!
//! Keys are produced with [`ClientSettings::url_for`], the same builder the
//! live client uses, so a fixture only answers when the client would have
//! sent exactly that request.

use super::request::{ApiRequest, ClientSettings, StreamOptions};
use super::transport::{Fixture, FixtureTransport};

/// Host used by [`mock_settings`]
pub const MOCK_HOST: &str = "__MOCK__";

/// Media id with a playable fixture for `stream` and `download`
pub const MOCK_MEDIA_ID: i64 = 1;

/// Media id whose `download` answers with a JSON error envelope
pub const MOCK_MISSING_MEDIA_ID: i64 = 404;

/// Bytes served for [`MOCK_MEDIA_ID`]
pub const MOCK_AUDIO: &[u8] = b"ID3\x03\x00\x00\x00\x00\x00\x00mock-audio";

const PING: &str = r#"{"subsonic-response":{
    "status": "ok",
    "xmlns": "http://subsonic.org/restapi",
    "version": "1.9.0"
}}"#;

const LICENSE: &str = r#"{"subsonic-response": {
    "status": "ok",
    "xmlns": "http://subsonic.org/restapi",
    "license": {
        "valid": true,
        "email": "mock@example.com",
        "date": "2014-01-01T00:00:00",
        "key": "abcdef0123456789abcdef0123456789"
    },
    "version": "1.9.0"
}}"#;

const MUSIC_FOLDERS: &str = r#"{"subsonic-response": {
    "status": "ok",
    "xmlns": "http://subsonic.org/restapi",
    "musicFolders": {"musicFolder": {
        "id": 0,
        "name": "Music"
    }},
    "version": "1.9.0"
}}"#;

const INDEXES: &str = r#"{"subsonic-response": {
    "status": "ok",
    "indexes": {
        "index": [
            {"name": "A", "artist": {"id": 1, "name": "Adventure"}},
            {"name": "B", "artist": {"id": 2, "name": "Boston"}}
        ],
        "lastModified": 1395014311154
    },
    "xmlns": "http://subsonic.org/restapi",
    "version": "1.9.0"
}}"#;

const MUSIC_DIRECTORY: &str = r#"{"subsonic-response": {
    "status": "ok",
    "directory": {
        "child": {
            "id": 405,
            "title": "2008 - Adventure",
            "created": "2013-08-12T00:12:24",
            "album": "Adventure",
            "parent": 1,
            "isDir": true,
            "artist": "Adventure",
            "coverArt": 405
        },
        "id": 3,
        "name": "Adventure"
    },
    "xmlns": "http://subsonic.org/restapi",
    "version": "1.9.0"
}}"#;

const ALBUM_DIRECTORY: &str = r#"{"subsonic-response": {
    "status": "ok",
    "directory": {
        "child": [
            {
                "id": "1",
                "parent": "405",
                "title": "Wasted",
                "album": "Adventure",
                "artist": "Adventure",
                "isDir": false,
                "coverArt": "405",
                "size": 5218306,
                "contentType": "audio/mpeg",
                "suffix": "mp3",
                "duration": 217,
                "bitRate": 192,
                "track": 1,
                "year": 2008,
                "genre": "Electronic",
                "path": "Adventure/2008 - Adventure/01 - Wasted.mp3",
                "type": "music",
                "created": "2013-08-12T00:12:24Z"
            },
            {
                "id": "2",
                "parent": "405",
                "title": "Making Of",
                "album": 1984,
                "isDir": false,
                "isVideo": true,
                "size": 90210000,
                "contentType": "video/mp4",
                "suffix": "mp4",
                "transcodedContentType": "video/x-flv",
                "transcodedSuffix": "flv",
                "duration": 600,
                "bitRate": 1200,
                "type": "video",
                "created": "2013-08-12T00:13:01Z"
            }
        ],
        "id": 405,
        "name": "2008 - Adventure"
    },
    "xmlns": "http://subsonic.org/restapi",
    "version": "1.9.0"
}}"#;

const NOW_PLAYING: &str = r#"{"subsonic-response": {
    "status": "ok",
    "nowPlaying": "",
    "xmlns": "http://subsonic.org/restapi",
    "version": "1.9.0"
}}"#;

const ARTISTS: &str = r#"{"subsonic-response": {
    "status": "ok",
    "artists": {
        "ignoredArticles": "The El La Los Las Le Les",
        "index": {
            "name": "A",
            "artist": {"id": "1", "name": "Adventure", "albumCount": 1, "coverArt": "ar-1"}
        }
    },
    "xmlns": "http://subsonic.org/restapi",
    "version": "1.9.0"
}}"#;

const ARTIST: &str = r#"{"subsonic-response": {
    "status": "ok",
    "artist": {
        "id": "1",
        "name": "Adventure",
        "albumCount": 1,
        "album": {
            "id": "405",
            "name": "Adventure",
            "artist": "Adventure",
            "artistId": "1",
            "coverArt": "405",
            "songCount": 10,
            "duration": 2412,
            "created": "2013-08-12T00:12:24.000Z"
        }
    },
    "xmlns": "http://subsonic.org/restapi",
    "version": "1.9.0"
}}"#;

const SCROBBLE: &str = r#"{"subsonic-response": {
    "status": "ok",
    "xmlns": "http://subsonic.org/restapi",
    "version": "1.9.0"
}}"#;

const NOT_FOUND: &str = r#"{"subsonic-response": {
    "status": "failed",
    "error": {"code": 70, "message": "Requested media not found"},
    "xmlns": "http://subsonic.org/restapi",
    "version": "1.9.0"
}}"#;

/// Settings pointing at the mock host, with empty credentials.
pub fn mock_settings() -> ClientSettings {
    ClientSettings::new(MOCK_HOST, "", "")
}

/// Every canned request with its response.
pub fn table() -> Vec<(ApiRequest, Fixture)> {
    vec![
        (ApiRequest::new("ping"), Fixture::json(PING)),
        (ApiRequest::new("getLicense"), Fixture::json(LICENSE)),
        (ApiRequest::new("getMusicFolders"), Fixture::json(MUSIC_FOLDERS)),
        (ApiRequest::new("getIndexes"), Fixture::json(INDEXES)),
        (
            ApiRequest::new("getMusicDirectory").param("id", 1),
            Fixture::json(MUSIC_DIRECTORY),
        ),
        (
            ApiRequest::new("getMusicDirectory").param("id", 405),
            Fixture::json(ALBUM_DIRECTORY),
        ),
        (ApiRequest::new("getNowPlaying"), Fixture::json(NOW_PLAYING)),
        (ApiRequest::new("getArtists"), Fixture::json(ARTISTS)),
        (
            ApiRequest::new("getArtist").param("id", 1),
            Fixture::json(ARTIST),
        ),
        (
            StreamOptions::default().apply(ApiRequest::new("stream").param("id", MOCK_MEDIA_ID)),
            Fixture::binary("audio/mpeg", MOCK_AUDIO),
        ),
        (
            ApiRequest::new("download").param("id", MOCK_MEDIA_ID),
            Fixture::binary("audio/mpeg", MOCK_AUDIO),
        ),
        (
            ApiRequest::new("download").param("id", MOCK_MISSING_MEDIA_ID),
            Fixture::json(NOT_FOUND),
        ),
        (
            ApiRequest::new("getCoverArt").param("id", 405),
            Fixture::binary("image/jpeg", &b"\xFF\xD8\xFF\xE0mock-cover"[..]),
        ),
        (
            ApiRequest::new("scrobble")
                .param("id", MOCK_MEDIA_ID)
                .param("submission", true),
            Fixture::json(SCROBBLE),
        ),
    ]
}

/// Build a fixture transport answering the table for `settings`.
pub fn transport_for(settings: &ClientSettings) -> FixtureTransport {
    let mut transport = FixtureTransport::new();
    for (request, fixture) in table() {
        transport.insert(settings.url_for(&request), fixture);
    }
    transport
}
