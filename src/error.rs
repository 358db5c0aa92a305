//! Crate-wide error types.
//!
//! Every client operation returns [`Result`]. The variants follow the path a
//! request takes: the transport may fail to reach the server, the body may not
//! be JSON, the server may report a logical failure inside a `200 OK`, and the
//! payload may not have the shape or types the entity builders need.
//!
//! Nothing is retried internally; the first error encountered aborts the call.
//!
//! # Example
//!
//! ```ignore
//! use subsonic_client::{Error, SubsonicClient};
//!
//! match client.get_music_directory(1).await {
//!     Err(Error::Remote { code: 70, .. }) => println!("no such directory"),
//!     Err(e) if e.is_transport() => println!("server unreachable: {e}"),
//!     other => { /* ... */ }
//! }
//! ```

/// Library-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the client.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Network or I/O failure reaching the server
    #[error("HTTP request failed: {message} - {url}")]
    Transport { url: String, message: String },

    /// Response bytes were not a valid JSON document
    #[error("Failed to parse response JSON: {message} - {url}")]
    Parse { url: String, message: String },

    /// Logical failure reported by the server inside a successful response
    #[error("Server error {code}: {message}")]
    Remote { code: i32, message: String },

    /// A field's JSON shape did not match any expected variant
    #[error("Unexpected shape for `{field}` in {operation}: found {found}")]
    Shape {
        operation: &'static str,
        field: String,
        found: &'static str,
    },

    /// A scalar field had a type that cannot be converted
    #[error("Cannot coerce `{field}` from {found}")]
    Coercion { field: String, found: &'static str },

    /// A required field was absent or unusable while building an entity
    #[error("Failed to build {entity}: field `{field}` {reason}")]
    Build {
        entity: &'static str,
        field: String,
        reason: String,
    },

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a transport error.
    pub fn transport(url: &str, message: impl Into<String>) -> Self {
        Self::Transport {
            url: redact_password(url),
            message: message.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(url: &str, message: impl Into<String>) -> Self {
        Self::Parse {
            url: redact_password(url),
            message: message.into(),
        }
    }

    /// Create a shape error.
    pub fn shape(operation: &'static str, field: impl Into<String>, found: &'static str) -> Self {
        Self::Shape {
            operation,
            field: field.into(),
            found,
        }
    }

    /// Create a coercion error.
    pub fn coercion(field: impl Into<String>, found: &'static str) -> Self {
        Self::Coercion {
            field: field.into(),
            found,
        }
    }

    /// A required field was not present.
    pub fn missing(entity: &'static str, field: impl Into<String>) -> Self {
        Self::Build {
            entity,
            field: field.into(),
            reason: "is missing".to_string(),
        }
    }

    /// A required field was present but could not be interpreted.
    pub fn invalid(entity: &'static str, field: impl Into<String>, detail: impl AsRef<str>) -> Self {
        Self::Build {
            entity,
            field: field.into(),
            reason: format!("is invalid: {}", detail.as_ref()),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the server could not be reached at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Whether the server answered with a logical error.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

/// Replace the value of the `p` (password) query parameter with `***`.
///
/// Credentials travel as plain query parameters, so every URL that ends up in
/// a log line or error message goes through here first.
pub fn redact_password(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let query = query
        .split('&')
        .map(|pair| {
            if pair.starts_with("p=") {
                "p=***"
            } else {
                pair
            }
        })
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", base, query)
}
