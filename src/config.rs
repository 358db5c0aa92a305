//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\subsonic-client\config.toml
//! - macOS: ~/Library/Application Support/subsonic-client/config.toml
//! - Linux: ~/.config/subsonic-client/config.toml
//!
//! The file is human-readable and editable. The `configure` command writes
//! it; every other command only reads it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;
use crate::subsonic::{ClientSettings, DEFAULT_API_VERSION, DEFAULT_CLIENT_NAME, VideoPolicy};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server address and credentials
    pub server: ServerConfig,

    /// Browsing behaviour
    pub browse: BrowseConfig,
}

/// Server connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host and optional port, e.g. "music.example.com:4040"
    pub host: String,

    pub username: String,

    /// Stored in plain text, like the server's own `p` parameter
    pub password: String,

    /// Client identifier sent with every request
    pub client_name: String,

    /// REST protocol version to announce
    pub api_version: String,

    /// Connect with https instead of http
    pub use_tls: bool,

    /// Request timeout in seconds (0 = no timeout)
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            username: String::new(),
            password: String::new(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            use_tls: false,
            timeout_secs: 30,
        }
    }
}

/// Directory browsing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowseConfig {
    /// Show video items in directory listings
    pub include_video: bool,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            include_video: true,
        }
    }
}

impl Config {
    /// Replace server fields with values given on the command line or in
    /// the environment.
    pub fn override_server(
        &mut self,
        host: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(username) = username {
            self.server.username = username;
        }
        if let Some(password) = password {
            self.server.password = password;
        }
    }

    /// Immutable settings for a client.
    ///
    /// Fails when no host is configured.
    pub fn client_settings(&self) -> Result<ClientSettings, Error> {
        let server = &self.server;
        if server.host.trim().is_empty() {
            return Err(Error::config(
                "no server host configured (run `subsonic configure` or set SUBSONIC_HOST)",
            ));
        }

        let mut settings = ClientSettings::new(&server.host, &server.username, &server.password);
        settings.client_name = server.client_name.clone();
        settings.api_version = server.api_version.clone();
        settings.use_tls = server.use_tls;
        settings.timeout = (server.timeout_secs > 0).then(|| Duration::from_secs(server.timeout_secs));
        settings.video_policy = if self.browse.include_video {
            VideoPolicy::Include
        } else {
            VideoPolicy::Exclude
        };

        Ok(settings)
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("subsonic-client"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };

    load_from(&path)
}

/// Load configuration from an explicit path, falling back to defaults
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to the default location
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)?;
    Ok(path)
}

/// Save configuration to an explicit path
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    // Serialize to pretty TOML
    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[server]"));
        assert!(toml.contains("[browse]"));
        assert!(toml.contains("client_name = \"subsonic-client\""));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
[server]
host = "music.local:4040"
username = "alice"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.server.host, "music.local:4040");
        assert_eq!(config.server.api_version, "1.8.0");
        assert_eq!(config.server.timeout_secs, 30);
        assert!(config.browse.include_video);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.server.host = "music.local".to_string();
        config.server.password = "secret".to_string();
        config.browse.include_video = false;

        save_to(&config, &path).unwrap();
        assert!(!path.with_extension("toml.tmp").exists());
        assert_eq!(load_from(&path), config);
    }

    #[test]
    fn test_load_missing_or_broken_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert_eq!(load_from(&missing), Config::default());

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[server\nhost = ").unwrap();
        assert_eq!(load_from(&broken), Config::default());
    }

    #[test]
    fn test_client_settings_requires_host() {
        let err = Config::default().client_settings().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_client_settings_conversion() {
        let mut config = Config::default();
        config.server.host = "music.local".to_string();
        config.server.use_tls = true;
        config.server.timeout_secs = 0;
        config.browse.include_video = false;

        let settings = config.client_settings().unwrap();
        assert!(settings.use_tls);
        assert_eq!(settings.timeout, None);
        assert_eq!(settings.video_policy, VideoPolicy::Exclude);
        assert_eq!(settings.client_name, "subsonic-client");
    }

    #[test]
    fn test_overrides_replace_only_given_fields() {
        let mut config = Config::default();
        config.server.host = "file-host".to_string();
        config.server.username = "file-user".to_string();

        config.override_server(None, Some("env-user".to_string()), Some("pw".to_string()));
        assert_eq!(config.server.host, "file-host");
        assert_eq!(config.server.username, "env-user");
        assert_eq!(config.server.password, "pw");
    }
}
