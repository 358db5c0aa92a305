//! Transports: how request URLs become response bytes.
//!
//! The client never talks to reqwest directly. It depends on the [`Transport`]
//! trait so that tests can substitute canned responses for a live server:
//!
//! - [`HttpTransport`] performs real HTTP GETs
//! - [`FixtureTransport`] returns bytes registered for an exact URL
//!
//! Transports know nothing about the envelope; a JSON error body is just bytes
//! to them.

use std::collections::HashMap;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt, TryStreamExt};

use crate::error::{Error, Result, redact_password};

/// A fully read response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub body: Vec<u8>,
    /// Value of the Content-Type header, if any
    pub content_type: Option<String>,
}

impl RawResponse {
    /// Whether the server labelled the body as JSON.
    pub fn is_json(&self) -> bool {
        is_json_content_type(self.content_type.as_deref())
    }
}

pub(crate) fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.contains("application/json") || ct.contains("text/json"))
}

/// Chunked body of a media response
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>> + Send>>;

/// A live media response.
///
/// The caller owns the stream; dropping it releases the connection.
pub struct MediaStream {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    body: ByteStream,
}

impl MediaStream {
    pub fn new(content_type: Option<String>, content_length: Option<u64>, body: ByteStream) -> Self {
        Self {
            content_type,
            content_length,
            body,
        }
    }

    /// Build a stream over an in-memory body.
    pub fn from_bytes(content_type: Option<String>, bytes: Vec<u8>) -> Self {
        let length = bytes.len() as u64;
        let body = futures::stream::iter(std::iter::once(Ok(bytes))).boxed();
        Self::new(content_type, Some(length), body)
    }

    pub fn is_json(&self) -> bool {
        is_json_content_type(self.content_type.as_deref())
    }

    /// Next chunk of the body, or `None` at the end.
    pub async fn next_chunk(&mut self) -> Option<Result<Vec<u8>>> {
        self.body.next().await
    }

    /// Read the remaining body into memory.
    pub async fn collect(self) -> Result<Vec<u8>> {
        self.body
            .try_fold(Vec::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok::<_, Error>(acc)
            })
            .await
    }

    pub fn into_body(self) -> ByteStream {
        self.body
    }
}

impl std::fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Source of raw responses for the client.
///
/// Implementations must be usable from several tasks at once.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the whole body for a URL.
    async fn fetch(&self, url: &str) -> Result<RawResponse>;

    /// Open a body as a stream of chunks.
    async fn open_stream(&self, url: &str) -> Result<MediaStream>;
}

/// Live HTTP transport backed by reqwest.
pub struct HttpTransport {
    http_client: reqwest::Client,
}

/// User agent sent with every request
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

impl HttpTransport {
    /// Create a transport with an optional per-request timeout.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .gzip(true)
            .user_agent(USER_AGENT);

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let http_client = builder
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }

    /// Create a transport around an existing reqwest client.
    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        tracing::debug!("GET {}", redact_password(url));

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transport(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::transport(
                url,
                format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            ));
        }

        Ok(response)
    }
}

fn content_type_of(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<RawResponse> {
        let response = self.get(url).await?;
        let content_type = content_type_of(&response);

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(url, e.to_string()))?
            .to_vec();

        Ok(RawResponse { body, content_type })
    }

    async fn open_stream(&self, url: &str) -> Result<MediaStream> {
        let response = self.get(url).await?;
        let content_type = content_type_of(&response);
        let content_length = response.content_length();

        let redacted = redact_password(url);
        let body = response
            .bytes_stream()
            .map(move |chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| Error::transport(&redacted, e.to_string()))
            })
            .boxed();

        Ok(MediaStream::new(content_type, content_length, body))
    }
}

/// A canned response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub body: Vec<u8>,
    pub content_type: String,
}

impl Fixture {
    pub fn json(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            content_type: "application/json; charset=UTF-8".to_string(),
        }
    }

    pub fn binary(content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            content_type: content_type.into(),
        }
    }
}

/// Transport answering from a map of exact URL to canned response.
///
/// Unknown URLs fail like an unreachable server.
#[derive(Debug, Clone, Default)]
pub struct FixtureTransport {
    fixtures: HashMap<String, Fixture>,
}

impl FixtureTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, fixture: Fixture) {
        self.fixtures.insert(url.into(), fixture);
    }

    pub fn with(mut self, url: impl Into<String>, fixture: Fixture) -> Self {
        self.insert(url, fixture);
        self
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }

    fn lookup(&self, url: &str) -> Result<&Fixture> {
        self.fixtures
            .get(url)
            .ok_or_else(|| Error::transport(url, "no fixture registered"))
    }
}

#[async_trait]
impl Transport for FixtureTransport {
    async fn fetch(&self, url: &str) -> Result<RawResponse> {
        let fixture = self.lookup(url)?;
        Ok(RawResponse {
            body: fixture.body.clone(),
            content_type: Some(fixture.content_type.clone()),
        })
    }

    async fn open_stream(&self, url: &str) -> Result<MediaStream> {
        let fixture = self.lookup(url)?;
        Ok(MediaStream::from_bytes(
            Some(fixture.content_type.clone()),
            fixture.body.clone(),
        ))
    }
}
