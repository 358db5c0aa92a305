//! Writing connection settings to the config file.

use std::path::Path;

use crate::config::{self, Config};

/// Save the effective configuration (file values plus overrides).
///
/// Host, user and password come from the global flags or `SUBSONIC_*`
/// variables, already merged into `config`.
pub fn cmd_configure(
    path: Option<&Path>,
    mut config: Config,
    tls: bool,
    timeout: Option<u64>,
    exclude_video: bool,
) -> anyhow::Result<()> {
    if tls {
        config.server.use_tls = true;
    }
    if let Some(timeout) = timeout {
        config.server.timeout_secs = timeout;
    }
    if exclude_video {
        config.browse.include_video = false;
    }

    // Validates that a host is present before anything is written
    config.client_settings()?;

    let saved = match path {
        Some(path) => {
            config::save_to(&config, path)?;
            path.to_path_buf()
        }
        None => config::save(&config)?,
    };

    println!("Saved configuration to {}", saved.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.server.host = "music.local".to_string();
        cmd_configure(Some(&path), config, true, Some(10), true).unwrap();

        let saved = config::load_from(&path);
        assert_eq!(saved.server.host, "music.local");
        assert!(saved.server.use_tls);
        assert_eq!(saved.server.timeout_secs, 10);
        assert!(!saved.browse.include_video);
    }

    #[test]
    fn test_configure_without_host_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        assert!(cmd_configure(Some(&path), Config::default(), false, None, false).is_err());
        assert!(!path.exists());
    }
}
