//! Fan-out of a received record to every other live connection.
//!
//! Writes are must-complete: a short write is retried until the kernel has
//! accepted every byte, and a zero-byte write is retried rather than treated
//! as closure (writes do not signal peer shutdown the way reads do). A write
//! failure to one peer never aborts delivery to the remaining peers — the
//! failed peer is reaped by the event loop on its own next readiness event.
//!
//! Writes are not queued: a peer whose socket buffer is full stalls the relay
//! until the kernel drains it, delaying service to all other connections.
//! This is an accepted limitation of the bounded scope; real backpressure
//! isolation would require write-readiness registration and per-connection
//! output queues.

use std::io;

use linecast_core::Record;
use tokio::net::TcpStream;
use tracing::warn;

use crate::table::{ConnectionTable, Slot};

/// Writes `record` to every live connection except `origin`, in ascending
/// slot order. The origin never receives its own record back.
///
/// Returns the number of peers the record was fully delivered to.
pub async fn broadcast(table: &ConnectionTable, record: &Record, origin: Slot) -> usize {
    let mut delivered = 0;
    for (slot, conn) in table.iter() {
        if slot == origin {
            continue;
        }
        match write_all_to(conn.stream(), record.as_bytes()).await {
            Ok(()) => delivered += 1,
            Err(e) => {
                // The peer will be torn down by its own read-side event.
                warn!(
                    "relay write to {} (slot {slot}) failed: {e}",
                    conn.peer()
                );
            }
        }
    }
    delivered
}

/// Writes the whole buffer through a shared stream reference, retrying short
/// writes, zero-byte writes, and interrupted writes.
pub(crate) async fn write_all_to(stream: &TcpStream, buf: &[u8]) -> io::Result<()> {
    let mut written = 0;
    while written < buf.len() {
        stream.writable().await?;
        match stream.try_write(&buf[written..]) {
            Ok(0) => continue,
            Ok(n) => written += n,
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => continue,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
