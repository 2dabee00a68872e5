//! linecast-client library entry point.
//!
//! Re-exports all public modules so that tests and the binary entry point in
//! `main.rs` share the same module tree.

pub mod config;
pub mod session;

pub use config::ClientConfig;
pub use session::{DuplexSession, SessionEnd, SessionError};
