//! Subsonic response envelope Data Transfer Objects
//!
//! Only the envelope header is typed here. The server converts its XML model to
//! JSON and loses type fidelity on the way: lists with one element arrive as a
//! bare object, text fields that look like numbers arrive as numbers, and
//! empty elements arrive as empty strings. The operation payload is therefore
//! kept as a raw JSON map and handed to the normalizer.
//!
//! DO NOT use these types outside the subsonic module - convert to domain types.
//!
//! Example response:
//! ```json
//! {"subsonic-response": {
//!   "status": "failed",
//!   "version": "1.9.0",
//!   "xmlns": "http://subsonic.org/restapi",
//!   "error": {"code": 70, "message": "Directory not found"}
//! }}
//! ```

use serde::Deserialize;
use serde_json::{Map, Value};

/// Key wrapping the whole response object
pub const ROOT_KEY: &str = "subsonic-response";

/// Inner response object: header fields plus the operation payload
#[derive(Debug, Clone, Deserialize)]
pub struct RawEnvelope {
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub version: Option<Value>,
    #[serde(default, rename = "serverVersion")]
    pub server_version: Option<Value>,
    #[serde(default)]
    pub xmlns: Option<Value>,
    #[serde(default)]
    pub error: Option<RawError>,
    /// Everything else: the operation-specific sections
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// Error object embedded in a failed response
#[derive(Debug, Clone, Deserialize)]
pub struct RawError {
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
}

// ============================================================================
// CONTRACT TESTS
// These verify the DTO accepts what real servers send.
// ============================================================================
