//! linecast-server library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.

pub mod config;
pub mod relay;
pub mod server;
pub mod table;

pub use config::ServerConfig;
pub use server::ChatServer;
pub use table::{Connection, ConnectionTable, Slot, TableError};
