//! The unit of the wire protocol: one newline-terminated message.

use std::fmt;

/// Maximum record length in bytes, including the trailing `\n`.
///
/// A message that reaches this length without a delimiter is a protocol
/// violation, not a long message still in flight: this is a bounded-line
/// protocol, not an arbitrary-length stream protocol.
pub const DEFAULT_MAX_RECORD_LEN: usize = 1024;

/// One complete `\n`-terminated message.
///
/// The bytes always include the trailing delimiter, so a record can be
/// written to a peer verbatim. Ownership is transient: a record is produced
/// by a [`LineReader`](crate::LineReader), handed to the relay or display,
/// and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record(Vec<u8>);

impl Record {
    /// Wraps raw bytes as a record. The caller guarantees the final byte is
    /// the `\n` delimiter; [`LineReader`](crate::LineReader) is the only
    /// producer in this workspace.
    pub(crate) fn from_bytes(bytes: Vec<u8>) -> Self {
        debug_assert_eq!(bytes.last(), Some(&b'\n'));
        Self(bytes)
    }

    /// The full record bytes, delimiter included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Record length in bytes, delimiter included. Never zero: the shortest
    /// record is a bare `"\n"`.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True only for a record that could not have come from a `LineReader`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Record {
    /// Lossy UTF-8 rendering without the trailing delimiter, for logging.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = &self.0[..self.0.len().saturating_sub(1)];
        write!(f, "{}", String::from_utf8_lossy(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_trailing_delimiter() {
        let record = Record::from_bytes(b"hello\n".to_vec());
        assert_eq!(record.as_bytes(), b"hello\n");
        assert_eq!(record.len(), 6);
    }

    #[test]
    fn test_display_strips_delimiter() {
        let record = Record::from_bytes(b"hello\n".to_vec());
        assert_eq!(record.to_string(), "hello");
    }

    #[test]
    fn test_display_renders_non_utf8_lossily() {
        let record = Record::from_bytes(vec![0xFF, 0xFE, b'\n']);
        assert_eq!(record.to_string(), "\u{FFFD}\u{FFFD}");
    }

    #[test]
    fn test_bare_newline_is_a_valid_record() {
        let record = Record::from_bytes(b"\n".to_vec());
        assert_eq!(record.len(), 1);
        assert!(!record.is_empty());
        assert_eq!(record.to_string(), "");
    }
}
