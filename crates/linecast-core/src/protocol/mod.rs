//! Protocol module containing the record type and the line-framing reader.

pub mod framing;
pub mod record;

pub use framing::{FramingError, LineReader};
pub use record::{Record, DEFAULT_MAX_RECORD_LEN};
