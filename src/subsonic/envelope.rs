//! Envelope decoding
//!
//! Every response is a single JSON object with one key, `subsonic-response`,
//! wrapping a header (`status`, `version`, `xmlns`, optional `error`) and the
//! operation payload. Logical failures arrive as HTTP 200 with
//! `status: "failed"`, so success is decided here and not by the transport.

use serde_json::Value;

use super::dto::{self, RawEnvelope, RawError};
use super::normalize::{ItemMap, coerce_to_string, kind_of, number_to_i64};
use crate::error::{Error, Result};

/// Overall status reported in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Ok,
    Failed,
}

/// Logical error reported by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub code: i32,
    pub message: String,
}

impl From<RemoteError> for Error {
    fn from(err: RemoteError) -> Self {
        Error::Remote {
            code: err.code,
            message: err.message,
        }
    }
}

/// Decoded response header.
///
/// `error` is populated only when `status` is [`ResponseStatus::Failed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub status: ResponseStatus,
    pub server_version: String,
    pub xmlns: String,
    pub error: Option<RemoteError>,
}

/// A decoded response: header plus the untouched payload sections
#[derive(Debug, Clone)]
pub struct Decoded {
    pub envelope: Envelope,
    pub payload: ItemMap,
}

impl Decoded {
    /// Fail with [`Error::Remote`] if the server reported an error.
    ///
    /// No partial result is ever returned alongside an error.
    pub fn into_success(self) -> Result<Decoded> {
        match self.envelope.error {
            Some(ref err) => Err(err.clone().into()),
            None => Ok(self),
        }
    }
}

/// Decode raw response bytes into an envelope and payload.
///
/// `url` is only used to give parse errors some context.
pub fn decode(bytes: &[u8], url: &str) -> Result<Decoded> {
    let document: Value =
        serde_json::from_slice(bytes).map_err(|e| Error::parse(url, e.to_string()))?;

    let inner = match document {
        Value::Object(mut root) => match root.remove(dto::ROOT_KEY) {
            Some(inner) => inner,
            // Tolerate a differently named sole wrapper key
            None if root.len() == 1 => root
                .into_iter()
                .next()
                .map(|(_, inner)| inner)
                .unwrap_or(Value::Null),
            None => return Err(Error::shape("response", dto::ROOT_KEY, "nothing")),
        },
        other => return Err(Error::shape("response", "root", kind_of(&other))),
    };

    if !inner.is_object() {
        return Err(Error::shape("response", dto::ROOT_KEY, kind_of(&inner)));
    }

    let raw: RawEnvelope =
        serde_json::from_value(inner).map_err(|e| Error::parse(url, e.to_string()))?;

    to_decoded(raw)
}

fn to_decoded(raw: RawEnvelope) -> Result<Decoded> {
    let status = match coerce_to_string(raw.status.as_ref(), "status")?.as_str() {
        "ok" => ResponseStatus::Ok,
        "failed" => ResponseStatus::Failed,
        // An error object without a usable status still means failure
        _ if raw.error.is_some() => ResponseStatus::Failed,
        _ => return Err(Error::missing("envelope", "status")),
    };

    let server_version = coerce_to_string(
        raw.version.as_ref().or(raw.server_version.as_ref()),
        "version",
    )?;
    let xmlns = coerce_to_string(raw.xmlns.as_ref(), "xmlns")?;

    let error = match (status, raw.error) {
        (_, Some(err)) => Some(to_remote_error(err)?),
        (ResponseStatus::Failed, None) => Some(RemoteError {
            code: 0,
            message: "request failed without error details".to_string(),
        }),
        (ResponseStatus::Ok, None) => None,
    };

    Ok(Decoded {
        envelope: Envelope {
            // Keep the invariant: error present iff failed
            status: if error.is_some() {
                ResponseStatus::Failed
            } else {
                status
            },
            server_version,
            xmlns,
            error,
        },
        payload: raw.payload,
    })
}

fn to_remote_error(raw: RawError) -> Result<RemoteError> {
    let code = match raw.code {
        Some(Value::Number(ref n)) => i32::try_from(number_to_i64(n)).unwrap_or_default(),
        Some(Value::String(ref s)) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    };
    let message = coerce_to_string(raw.message.as_ref(), "error.message")?;

    Ok(RemoteError { code, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://host/rest/ping.view?u=me&p=secret";

    #[test]
    fn test_decode_ok_ping() {
        let body = br#"{"subsonic-response":{
            "status": "ok",
            "xmlns": "http://subsonic.org/restapi",
            "version": "1.9.0"
        }}"#;

        let decoded = decode(body, URL).unwrap();
        assert_eq!(decoded.envelope.status, ResponseStatus::Ok);
        assert_eq!(decoded.envelope.server_version, "1.9.0");
        assert_eq!(decoded.envelope.xmlns, "http://subsonic.org/restapi");
        assert!(decoded.envelope.error.is_none());
        assert!(decoded.into_success().is_ok());
    }

    #[test]
    fn test_decode_failed_surfaces_remote_error() {
        let body = br#"{"subsonic-response":{
            "status": "failed",
            "version": "1.9.0",
            "error": {"code": 70, "message": "Directory not found"},
            "directory": {"id": 1}
        }}"#;

        let decoded = decode(body, URL).unwrap();
        assert_eq!(decoded.envelope.status, ResponseStatus::Failed);
        let err = decoded.into_success().unwrap_err();
        assert_eq!(
            err,
            Error::Remote {
                code: 70,
                message: "Directory not found".to_string()
            }
        );
    }

    #[test]
    fn test_error_wins_over_ok_status() {
        let body = br#"{"subsonic-response":{
            "status": "ok",
            "error": {"code": "10", "message": "Required parameter is missing"}
        }}"#;

        let decoded = decode(body, URL).unwrap();
        assert_eq!(decoded.envelope.status, ResponseStatus::Failed);
        assert!(matches!(
            decoded.into_success(),
            Err(Error::Remote { code: 10, .. })
        ));
    }

    #[test]
    fn test_failed_without_error_object() {
        let body = br#"{"subsonic-response":{"status": "failed"}}"#;
        let err = decode(body, URL).unwrap().into_success().unwrap_err();
        assert!(matches!(err, Error::Remote { code: 0, .. }));
    }

    #[test]
    fn test_server_version_fallback_and_extra_fields() {
        let body = br#"{"subsonic-response":{
            "status": "ok",
            "serverVersion": "0.53.0",
            "type": "navidrome",
            "openSubsonic": true
        }}"#;

        let decoded = decode(body, URL).unwrap();
        assert_eq!(decoded.envelope.server_version, "0.53.0");
        assert!(decoded.payload.contains_key("openSubsonic"));
    }

    #[test]
    fn test_malformed_json_names_url_without_password() {
        let err = decode(b"{not json", URL).unwrap_err();
        match err {
            Error::Parse { url, .. } => {
                assert!(url.contains("ping.view"));
                assert!(!url.contains("secret"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_object_root_is_shape_error() {
        assert!(matches!(
            decode(b"[1, 2]", URL),
            Err(Error::Shape { found: "array", .. })
        ));
        assert!(matches!(
            decode(br#"{"subsonic-response": "ok"}"#, URL),
            Err(Error::Shape { found: "string", .. })
        ));
    }

    #[test]
    fn test_missing_status_is_build_error() {
        let body = br#"{"subsonic-response":{"version": "1.9.0"}}"#;
        assert_eq!(
            decode(body, URL).unwrap_err(),
            Error::missing("envelope", "status")
        );
    }
}
