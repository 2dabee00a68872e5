//! TOML-based configuration for the client.
//!
//! Optional file, same conventions as the server's config: every field has a
//! serde default so a missing file or a partial file both work.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// Host name or IP address of the server.
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port the server listens on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum line length in bytes, delimiter included. Must match the
    /// server's bound.
    #[serde(default = "default_max_record_len")]
    pub max_record_len: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    5188
}
fn default_max_record_len() -> usize {
    linecast_core::DEFAULT_MAX_RECORD_LEN
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_record_len: default_max_record_len(),
        }
    }
}

/// Loads the configuration from `path`, or returns the defaults when no path
/// is given or the file does not exist yet.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(ClientConfig::default());
    };

    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: ClientConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_targets_local_reference_port() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 5188);
        assert_eq!(cfg.max_record_len, 1024);
    }

    #[test]
    fn test_partial_toml_overrides_only_named_fields() {
        let cfg: ClientConfig =
            toml::from_str("host = \"chat.example.net\"").expect("deserialize");
        assert_eq!(cfg.host, "chat.example.net");
        assert_eq!(cfg.port, 5188);
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let cfg = ClientConfig {
            host: "10.0.0.7".to_string(),
            port: 9999,
            max_record_len: 512,
        };
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: ClientConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_load_config_missing_file_returns_defaults() {
        let cfg = load_config(Some(Path::new("/nonexistent/linecast.toml"))).expect("load");
        assert_eq!(cfg, ClientConfig::default());
    }
}
