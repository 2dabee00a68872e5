//! # linecast-core
//!
//! Shared library for linecast containing the line-framing protocol used by
//! both the server and client applications.
//!
//! The wire format is deliberately minimal: plain text, one message per line,
//! `\n`-delimited, with a bounded maximum line length. There is no header, no
//! length prefix, and no encoding negotiation. What this crate provides is
//! the part TCP does not: extracting exactly one delimited record from a byte
//! stream without losing data that arrives after the delimiter, and rejecting
//! lines that exceed the protocol bound.
//!
//! This crate has zero dependencies on sockets or the async runtime; it
//! operates purely on byte buffers so it can be unit tested in isolation and
//! reused by any transport.

pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `linecast_core::LineReader` instead of the full module path.
pub use protocol::framing::{FramingError, LineReader};
pub use protocol::record::{Record, DEFAULT_MAX_RECORD_LEN};
