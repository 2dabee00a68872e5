//! linecast-client entry point.
//!
//! Connects to the server, then hands the terminal to a [`DuplexSession`]:
//! stdin lines go to the server, relayed lines from other clients are
//! printed to stdout.

use std::path::PathBuf;

use anyhow::Context;
use tokio::net::TcpStream;
use tracing::info;
use tracing_subscriber::EnvFilter;

use linecast_client::config;
use linecast_client::{DuplexSession, SessionEnd};

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
        .context("failed to load client configuration")?;

    // The only CLI surface: an optional positional port override.
    if let Some(arg) = std::env::args().nth(1) {
        config.port = arg
            .parse()
            .with_context(|| format!("port argument must be a number, got {arg:?}"))?;
    }

    let socket = TcpStream::connect((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to connect to {}:{}", config.host, config.port))?;
    let local = socket.local_addr()?;
    info!("connected to {}:{} from {local}", config.host, config.port);

    let session = DuplexSession::new(tokio::io::stdin(), tokio::io::stdout(), config.max_record_len);
    match session.run(socket).await? {
        SessionEnd::ServerClosed => info!("session ended: server closed the connection"),
        SessionEnd::InputClosed => info!("session ended: end of input"),
    }
    Ok(())
}
