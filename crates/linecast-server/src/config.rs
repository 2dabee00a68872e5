//! TOML-based configuration for the server.
//!
//! The config file is optional: when it is absent every field falls back to
//! its default, so the server runs with no setup at all. Fields annotated
//! with `#[serde(default = "some_fn")]` use the return value of `some_fn()`
//! when the field is missing from the file, which also keeps old config files
//! working when new fields are added.
//!
//! ```toml
//! bind_address = "0.0.0.0"
//! port = 5188
//! max_connections = 2048
//! max_record_len = 1024
//! ```

use std::net::{AddrParseError, IpAddr, SocketAddr};
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

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// IP address to bind the listening socket to. `"0.0.0.0"` binds all
    /// interfaces.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// TCP port the server listens on. `0` asks the OS for an ephemeral port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Capacity of the connection table. Connections beyond this are
    /// rejected, existing ones are unaffected.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Maximum line length in bytes, delimiter included. Longer lines are a
    /// protocol violation.
    #[serde(default = "default_max_record_len")]
    pub max_record_len: usize,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5188
}
fn default_max_connections() -> usize {
    2048
}
fn default_max_record_len() -> usize {
    linecast_core::DEFAULT_MAX_RECORD_LEN
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            max_connections: default_max_connections(),
            max_record_len: default_max_record_len(),
            log_level: default_log_level(),
        }
    }
}

impl ServerConfig {
    /// Resolves the bind address and port into a socket address.
    ///
    /// # Errors
    ///
    /// Returns [`AddrParseError`] if `bind_address` is not a valid IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        let ip: IpAddr = self.bind_address.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Loads the configuration from `path`, or returns the defaults when no path
/// is given or the file does not exist yet.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(ServerConfig::default());
    };

    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: ServerConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ServerConfig::default()),
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
    fn test_default_config_matches_reference_values() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 5188);
        assert_eq!(cfg.max_connections, 2048);
        assert_eq!(cfg.max_record_len, 1024);
        assert_eq!(cfg.bind_address, "0.0.0.0");
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let mut cfg = ServerConfig::default();
        cfg.port = 9000;
        cfg.max_connections = 16;

        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: ServerConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let cfg: ServerConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, ServerConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides_only_named_fields() {
        let cfg: ServerConfig = toml::from_str("port = 7777").expect("deserialize partial");
        assert_eq!(cfg.port, 7777);
        assert_eq!(cfg.max_connections, 2048);
    }

    #[test]
    fn test_invalid_toml_returns_parse_error() {
        let result: Result<ServerConfig, toml::de::Error> = toml::from_str("[[[ not valid toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_socket_addr_combines_address_and_port() {
        let cfg = ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            port: 4242,
            ..ServerConfig::default()
        };
        let addr = cfg.socket_addr().expect("parse");
        assert_eq!(addr.to_string(), "127.0.0.1:4242");
    }

    #[test]
    fn test_socket_addr_rejects_hostnames() {
        let cfg = ServerConfig {
            bind_address: "not-an-ip".to_string(),
            ..ServerConfig::default()
        };
        assert!(cfg.socket_addr().is_err());
    }

    #[test]
    fn test_load_config_without_path_returns_defaults() {
        let cfg = load_config(None).expect("load");
        assert_eq!(cfg, ServerConfig::default());
    }

    #[test]
    fn test_load_config_missing_file_returns_defaults() {
        let path = Path::new("/nonexistent/path/linecast.toml");
        let cfg = load_config(Some(path)).expect("load");
        assert_eq!(cfg, ServerConfig::default());
    }
}
