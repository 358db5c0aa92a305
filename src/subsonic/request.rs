//! Request URL construction
//!
//! Every call is an HTTP GET to `{scheme}://{host}/rest/{method}.view` with the
//! credentials and protocol parameters first, followed by the operation's own
//! parameters in insertion order. Optional parameters that are unset are left
//! out of the query string entirely.
//!
//! The fixture transport keys its canned responses by the exact URL produced
//! here, so tests and production always agree on request shapes.

use std::fmt::Display;
use std::time::Duration;

/// Default client identifier sent as `c`
pub const DEFAULT_CLIENT_NAME: &str = "subsonic-client";

/// REST protocol version sent as `v`
pub const DEFAULT_API_VERSION: &str = "1.8.0";

/// Immutable connection settings held by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Host and optional port, e.g. `music.example.com:4040`
    pub host: String,
    pub username: String,
    pub password: String,
    pub client_name: String,
    pub api_version: String,
    /// Use `https://` instead of `http://`
    pub use_tls: bool,
    /// Per-request timeout applied by the HTTP transport
    pub timeout: Option<Duration>,
    pub video_policy: VideoPolicy,
}

impl ClientSettings {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            use_tls: false,
            timeout: Some(Duration::from_secs(30)),
            video_policy: VideoPolicy::default(),
        }
    }

    fn scheme(&self) -> &'static str {
        if self.use_tls { "https" } else { "http" }
    }

    /// Build the full URL for a request.
    pub fn url_for(&self, request: &ApiRequest) -> String {
        let mut url = format!(
            "{}://{}/rest/{}.view?u={}&p={}&c={}&v={}&f=json",
            self.scheme(),
            self.host.trim_end_matches('/'),
            request.method,
            urlencoding::encode(&self.username),
            urlencoding::encode(&self.password),
            urlencoding::encode(&self.client_name),
            urlencoding::encode(&self.api_version),
        );

        for (key, value) in &request.params {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }

        url
    }
}

/// What to do with video items found while browsing directories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoPolicy {
    /// Keep them as `MediaKind::Video` items
    #[default]
    Include,
    /// Drop them from listings
    Exclude,
}

/// One API call: method name plus operation-specific parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: &'static str,
    params: Vec<(&'static str, String)>,
}

impl ApiRequest {
    pub fn new(method: &'static str) -> Self {
        Self {
            method,
            params: Vec::new(),
        }
    }

    /// Add a parameter that is always sent.
    pub fn param(mut self, key: &'static str, value: impl Display) -> Self {
        self.params.push((key, value.to_string()));
        self
    }

    /// Add a parameter only when it is set.
    pub fn opt_param<T: Display>(self, key: &'static str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }
}

/// Options for the `stream` operation. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamOptions {
    /// Maximum bit rate in kbps; the server transcodes above it
    pub max_bit_rate: Option<u32>,
    /// Target transcoding format, e.g. `mp3` or `raw`
    pub format: Option<String>,
    /// Start offset in seconds (video only on most servers)
    pub time_offset: Option<u32>,
    /// Requested video size, e.g. `640x480`
    pub size: Option<String>,
    /// Ask the server to send an estimated Content-Length
    pub estimate_content_length: Option<bool>,
}

impl StreamOptions {
    /// Append the set options to a request.
    pub fn apply(&self, request: ApiRequest) -> ApiRequest {
        request
            .opt_param("maxBitRate", self.max_bit_rate)
            .opt_param("format", self.format.as_deref())
            .opt_param("timeOffset", self.time_offset)
            .opt_param("size", self.size.as_deref())
            .opt_param("estimateContentLength", self.estimate_content_length)
    }
}
