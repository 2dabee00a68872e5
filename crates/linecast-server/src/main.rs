//! linecast-server entry point.
//!
//! Loads the optional TOML config (path taken from `LINECAST_CONFIG`),
//! applies a positional port override, binds the listener, and runs the
//! event loop until a loop-level fault.

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use linecast_server::config;
use linecast_server::ChatServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging; level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::var_os("LINECAST_CONFIG").map(PathBuf::from);
    let mut config = config::load_config(config_path.as_deref())
        .context("failed to load server configuration")?;

    // The only CLI surface: an optional positional port override.
    if let Some(arg) = std::env::args().nth(1) {
        config.port = arg
            .parse()
            .with_context(|| format!("port argument must be a number, got {arg:?}"))?;
    }

    info!(
        "starting linecast server (capacity {}, max line {} bytes)",
        config.max_connections, config.max_record_len
    );

    let server = ChatServer::bind(&config).await?;
    server.run().await?;
    Ok(())
}
