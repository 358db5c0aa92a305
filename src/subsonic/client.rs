//! Subsonic client facade
//!
//! Each operation is one round trip: build the URL, fetch through the
//! [`Transport`], decode the envelope, then hand the payload to the adapter.
//! Nothing is retried and nothing is cached between calls, so a client can be
//! cloned and shared freely across tasks.
//!
//! ## Media endpoints
//! `stream`, `download` and `getCoverArt` return binary bodies, except when
//! the server rejects the request: it then answers HTTP 200 with a JSON error
//! envelope. Such bodies are decoded and surfaced as [`Error::Remote`] before
//! the caller ever sees a byte.

use std::sync::Arc;

use super::adapter;
use super::envelope::{self, Decoded};
use super::fixtures;
use super::request::{ApiRequest, ClientSettings, StreamOptions};
use super::transport::{HttpTransport, MediaStream, Transport};
use crate::error::{Error, Result, redact_password};
use crate::model::{
    ArtistDetail, DirectoryListing, IndexGroup, License, MusicFolder, NowPlayingEntry, Status,
};

/// Client for one Subsonic server
#[derive(Clone)]
pub struct SubsonicClient {
    settings: ClientSettings,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for SubsonicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubsonicClient")
            .field("host", &self.settings.host)
            .field("username", &self.settings.username)
            .finish_non_exhaustive()
    }
}

impl SubsonicClient {
    /// Connect to a live server over HTTP.
    ///
    /// Fails if the server does not answer a `ping`.
    pub async fn connect(settings: ClientSettings) -> Result<Self> {
        let transport = HttpTransport::new(settings.timeout)?;
        Self::connect_with(settings, Arc::new(transport)).await
    }

    /// Connect through an arbitrary transport, probing it with a `ping`.
    pub async fn connect_with(
        settings: ClientSettings,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let client = Self {
            settings,
            transport,
        };

        let status = client.ping().await?;
        tracing::info!(
            "Connected to {} (API {})",
            client.settings.host,
            status.server_version
        );

        Ok(client)
    }

    /// A client answering from the built-in fixture table.
    pub async fn mock() -> Result<Self> {
        let settings = fixtures::mock_settings();
        let transport = fixtures::transport_for(&settings);
        Self::connect_with(settings, Arc::new(transport)).await
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    // ========================================================================
    // Catalog operations
    // ========================================================================

    /// Check connectivity and report the server's protocol version
    pub async fn ping(&self) -> Result<Status> {
        let decoded = self.call(ApiRequest::new("ping")).await?;
        Ok(adapter::to_status(&decoded.envelope))
    }

    pub async fn get_license(&self) -> Result<License> {
        let decoded = self.call(ApiRequest::new("getLicense")).await?;
        adapter::to_license(&decoded.payload)
    }

    /// List the configured top-level music folders
    pub async fn get_music_folders(&self) -> Result<Vec<MusicFolder>> {
        let decoded = self.call(ApiRequest::new("getMusicFolders")).await?;
        adapter::to_music_folders(&decoded.payload)
    }

    /// List the artist index, optionally for one folder and only if changed
    /// since `modified_since` (milliseconds since the epoch).
    pub async fn get_indexes(
        &self,
        folder_id: Option<i64>,
        modified_since: Option<i64>,
    ) -> Result<Vec<IndexGroup>> {
        let request = ApiRequest::new("getIndexes")
            .opt_param("musicFolderId", folder_id)
            .opt_param("ifModifiedSince", modified_since);
        let decoded = self.call(request).await?;
        adapter::to_indexes(&decoded.payload)
    }

    /// List artists organized by ID3 tags
    pub async fn get_artists(&self, folder_id: Option<i64>) -> Result<Vec<IndexGroup>> {
        let request = ApiRequest::new("getArtists").opt_param("musicFolderId", folder_id);
        let decoded = self.call(request).await?;
        adapter::to_artist_indexes(&decoded.payload)
    }

    /// One ID3 artist with its albums
    pub async fn get_artist(&self, id: i64) -> Result<ArtistDetail> {
        let decoded = self.call(ApiRequest::new("getArtist").param("id", id)).await?;
        adapter::to_artist_detail(&decoded.payload)
    }

    /// Browse one directory by id.
    ///
    /// Video items are kept or dropped according to the settings' video policy.
    pub async fn get_music_directory(&self, id: i64) -> Result<DirectoryListing> {
        let request = ApiRequest::new("getMusicDirectory").param("id", id);
        let decoded = self.call(request).await?;
        adapter::to_directory_listing(&decoded.payload, self.settings.video_policy)
    }

    /// What users are playing right now; empty when nothing is
    pub async fn get_now_playing(&self) -> Result<Vec<NowPlayingEntry>> {
        let decoded = self.call(ApiRequest::new("getNowPlaying")).await?;
        adapter::to_now_playing(&decoded.payload)
    }

    /// Register a play.
    ///
    /// `submission == false` only updates "now playing". `time` is in
    /// milliseconds since the epoch.
    pub async fn scrobble(&self, id: i64, time: Option<i64>, submission: bool) -> Result<()> {
        let request = ApiRequest::new("scrobble")
            .param("id", id)
            .opt_param("time", time)
            .param("submission", submission);
        self.call(request).await?;
        Ok(())
    }

    // ========================================================================
    // Media operations
    // ========================================================================

    /// Stream a media item, possibly transcoded
    pub async fn stream(&self, id: i64, options: &StreamOptions) -> Result<MediaStream> {
        let request = options.apply(ApiRequest::new("stream").param("id", id));
        self.open_media(request).await
    }

    /// Download a media item in its original format
    pub async fn download(&self, id: i64) -> Result<MediaStream> {
        self.open_media(ApiRequest::new("download").param("id", id))
            .await
    }

    /// Fetch cover art, optionally scaled to `size` pixels
    pub async fn get_cover_art(&self, id: i64, size: Option<u32>) -> Result<MediaStream> {
        let request = ApiRequest::new("getCoverArt")
            .param("id", id)
            .opt_param("size", size);
        self.open_media(request).await
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    async fn call(&self, request: ApiRequest) -> Result<Decoded> {
        let url = self.settings.url_for(&request);
        tracing::debug!("{}: {}", request.method, redact_password(&url));

        let response = self.transport.fetch(&url).await?;
        envelope::decode(&response.body, &url)?.into_success()
    }

    async fn open_media(&self, request: ApiRequest) -> Result<MediaStream> {
        let url = self.settings.url_for(&request);
        tracing::debug!("{}: {}", request.method, redact_password(&url));

        let stream = self.transport.open_stream(&url).await?;
        if !stream.is_json() {
            return Ok(stream);
        }

        let body = stream.collect().await?;
        envelope::decode(&body, &url)?.into_success()?;

        // A successful envelope where media was expected
        Err(Error::parse(
            &url,
            format!("{} returned a JSON document instead of media", request.method),
        ))
    }
}
