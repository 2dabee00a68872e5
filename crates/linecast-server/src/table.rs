//! Bounded registry of live client connections.
//!
//! The table is a fixed-capacity sequence of slots. A slot is either empty or
//! holds a [`Connection`]; a connection's slot index is stable for its whole
//! lifetime. Insertion is first-fit (lowest empty index), removal tombstones
//! the slot without compacting, so removing one connection never renumbers or
//! shifts any other. Iteration is in ascending slot order, which is also the
//! broadcast fan-out order: deterministic, but not fairness-guaranteed.

use std::net::SocketAddr;

use linecast_core::LineReader;
use thiserror::Error;
use tokio::net::TcpStream;

/// Index into the connection table, stable for a connection's lifetime.
pub type Slot = usize;

/// Error type for connection table operations.
#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    /// Every slot below capacity is occupied.
    #[error("connection table is full (capacity {capacity})")]
    Full { capacity: usize },
}

/// One live client connection, owned exclusively by the table.
///
/// Dropping a `Connection` closes the underlying socket.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    reader: LineReader,
}

impl Connection {
    /// Wraps an accepted socket together with its per-connection line reader.
    pub fn new(stream: TcpStream, peer: SocketAddr, max_record_len: usize) -> Self {
        Self {
            stream,
            peer,
            reader: LineReader::new(max_record_len),
        }
    }

    /// The underlying socket.
    pub fn stream(&self) -> &TcpStream {
        &self.stream
    }

    /// The peer's address, for operator-visible logging only.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// The connection's accumulation buffer.
    pub fn reader_mut(&mut self) -> &mut LineReader {
        &mut self.reader
    }
}

/// Fixed-capacity slot table mapping [`Slot`] to [`Connection`].
#[derive(Debug)]
pub struct ConnectionTable {
    slots: Vec<Option<Connection>>,
    /// One past the greatest occupied index, so scans need not visit the
    /// full capacity.
    high_water: usize,
    live: usize,
}

impl ConnectionTable {
    /// Creates an empty table with room for `capacity` connections.
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            high_water: 0,
            live: 0,
        }
    }

    /// Inserts a connection into the lowest-index empty slot.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Full`] when no slot is free. The connection is
    /// consumed either way, so on `Full` the socket is dropped — which closes
    /// it. That is the rejection path: the new peer is turned away with no
    /// effect on existing connections.
    pub fn insert(&mut self, conn: Connection) -> Result<Slot, TableError> {
        let Some(slot) = self.slots.iter().position(Option::is_none) else {
            return Err(TableError::Full {
                capacity: self.slots.len(),
            });
        };
        self.slots[slot] = Some(conn);
        self.live += 1;
        if slot + 1 > self.high_water {
            self.high_water = slot + 1;
        }
        Ok(slot)
    }

    /// Empties `slot` and returns the connection that occupied it, closing
    /// the socket once the returned value is dropped. Idempotent: removing an
    /// already-empty or out-of-range slot returns `None`.
    pub fn remove(&mut self, slot: Slot) -> Option<Connection> {
        let conn = self.slots.get_mut(slot)?.take()?;
        self.live -= 1;
        while self.high_water > 0 && self.slots[self.high_water - 1].is_none() {
            self.high_water -= 1;
        }
        Some(conn)
    }

    /// The connection in `slot`, if any.
    pub fn get(&self, slot: Slot) -> Option<&Connection> {
        self.slots.get(slot)?.as_ref()
    }

    /// Mutable access to the connection in `slot`, if any.
    pub fn get_mut(&mut self, slot: Slot) -> Option<&mut Connection> {
        self.slots.get_mut(slot)?.as_mut()
    }

    /// Iterates over live connections in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &Connection)> {
        self.slots[..self.high_water]
            .iter()
            .enumerate()
            .filter_map(|(slot, conn)| conn.as_ref().map(|c| (slot, c)))
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.live
    }

    /// True when no connection is registered.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Total slot capacity.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
