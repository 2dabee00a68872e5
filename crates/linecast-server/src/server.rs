//! The server event loop.
//!
//! One task owns the listening socket, the [`ConnectionTable`], and every
//! per-connection buffer, so there is no locking anywhere: the only
//! suspension points are the multiplexed readiness wait and the relay writes.
//! Each pass blocks until the listener or a registered connection becomes
//! readable, handles that one source to completion, and re-blocks. The wait
//! is unbounded — the process sits idle indefinitely when nothing is ready.
//!
//! Per-connection faults (peer closure, read errors, oversized lines) tear
//! down only the affected connection. Only a failure of the accept path
//! itself is allowed to take the loop down.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::relay;
use crate::table::{Connection, ConnectionTable, Slot, TableError};

/// Error type for loop-level server faults. Everything here is fatal;
/// per-connection errors are handled inside the loop and never surface.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured bind address is not a valid IP address.
    #[error("invalid bind address {addr:?}: {source}")]
    InvalidBindAddr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// Binding the listening socket failed.
    #[error("bind failed on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// Accepting a pending connection failed for a non-transient reason.
    #[error("accept failed: {0}")]
    Accept(#[source] io::Error),
}

/// What a single wake of the readiness wait reported.
enum Wake {
    /// The listening socket delivered a new connection.
    Incoming(TcpStream, SocketAddr),
    /// A registered connection became readable.
    Readable(Slot),
}

/// The broadcast server: accepts clients and relays each received line to
/// every other connected client.
pub struct ChatServer {
    listener: TcpListener,
    table: ConnectionTable,
    max_record_len: usize,
}

impl ChatServer {
    /// Binds the listening socket described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidBindAddr`] for an unparsable bind
    /// address and [`ServerError::Bind`] when the socket cannot be bound.
    pub async fn bind(config: &ServerConfig) -> Result<Self, ServerError> {
        let addr = config
            .socket_addr()
            .map_err(|source| ServerError::InvalidBindAddr {
                addr: config.bind_address.clone(),
                source,
            })?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        Ok(Self {
            listener,
            table: ConnectionTable::new(config.max_connections),
            max_record_len: config.max_record_len,
        })
    }

    /// The address the listener is actually bound to. Useful when the
    /// configured port is `0` and the OS picked one.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the event loop until a loop-level fault occurs.
    pub async fn run(mut self) -> Result<(), ServerError> {
        if let Ok(addr) = self.local_addr() {
            info!("listening on {addr}");
        }
        loop {
            match self.next_wake().await? {
                Wake::Incoming(stream, peer) => self.accept_connection(stream, peer),
                Wake::Readable(slot) => self.service_connection(slot).await,
            }
        }
    }

    /// Blocks until the listener or any live connection is readable.
    ///
    /// The listener is polled first each pass, matching the accept-then-scan
    /// order of a classic poll loop.
    async fn next_wake(&self) -> Result<Wake, ServerError> {
        tokio::select! {
            biased;

            accepted = self.listener.accept() => {
                let (stream, peer) = accepted.map_err(ServerError::Accept)?;
                Ok(Wake::Incoming(stream, peer))
            }
            slot = readiness_scan(&self.table) => Ok(Wake::Readable(slot)),
        }
    }

    /// Registers one accepted connection, or rejects it when the table is
    /// full. Rejection drops the socket immediately and leaves every
    /// existing connection untouched.
    fn accept_connection(&mut self, stream: TcpStream, peer: SocketAddr) {
        let conn = Connection::new(stream, peer, self.max_record_len);
        match self.table.insert(conn) {
            Ok(slot) => {
                info!(
                    "client connected: {peer} (slot {slot}, {}/{} in use)",
                    self.table.len(),
                    self.table.capacity()
                );
            }
            Err(TableError::Full { capacity }) => {
                warn!("rejecting {peer}: connection table is full ({capacity} slots)");
            }
        }
    }

    /// Handles one readable connection: drain one chunk into its line
    /// reader, relay every completed record, and reap the connection on
    /// closure, read error, or protocol violation.
    async fn service_connection(&mut self, slot: Slot) {
        let mut chunk = vec![0u8; self.max_record_len];
        let n = loop {
            let Some(conn) = self.table.get_mut(slot) else {
                return;
            };
            match conn.stream().try_read(&mut chunk) {
                Ok(n) => break n,
                // The wake was spurious or another pass already drained the
                // socket; nothing to do.
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => return,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(
                        "read error on {} (slot {slot}): {e}; dropping connection",
                        conn.peer()
                    );
                    self.table.remove(slot);
                    return;
                }
            }
        };

        // A zero-byte read is orderly peer shutdown.
        if n == 0 {
            if let Some(conn) = self.table.remove(slot) {
                info!("client disconnected: {} (slot {slot})", conn.peer());
            }
            return;
        }

        if let Some(conn) = self.table.get_mut(slot) {
            conn.reader_mut().push(&chunk[..n]);
        }

        loop {
            let record = {
                let Some(conn) = self.table.get_mut(slot) else {
                    return;
                };
                match conn.reader_mut().next_record() {
                    Ok(Some(record)) => record,
                    Ok(None) => return,
                    Err(e) => {
                        warn!(
                            "protocol violation from {} (slot {slot}): {e}; dropping connection",
                            conn.peer()
                        );
                        self.table.remove(slot);
                        return;
                    }
                }
            };
            debug!("received from slot {slot}: {record}");
            relay::broadcast(&self.table, &record, slot).await;
        }
    }
}

/// Resolves to the slot of the first live connection to become readable.
/// Pends forever on an empty table so the select above waits on the listener
/// alone instead of busy-waking.
async fn readiness_scan(table: &ConnectionTable) -> Slot {
    if table.is_empty() {
        return std::future::pending().await;
    }
    let probes: Vec<_> = table
        .iter()
        .map(|(slot, conn)| {
            Box::pin(async move {
                // A readiness error is surfaced by the try_read that follows.
                let _ = conn.stream().readable().await;
                slot
            })
        })
        .collect();
    let (slot, _, _) = futures::future::select_all(probes).await;
    slot
}
