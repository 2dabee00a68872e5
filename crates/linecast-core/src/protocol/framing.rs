//! Line extraction from a byte stream.
//!
//! Sockets provide no native line buffering: one `read` may deliver half a
//! message, one and a half messages, or several at once. [`LineReader`] sits
//! between the transport and the application, accumulating raw bytes and
//! handing back exactly one delimited [`Record`] at a time. Bytes that arrive
//! after a delimiter stay buffered for the next call, so nothing is lost
//! across partial deliveries.
//!
//! The reader owns a persistent per-connection buffer rather than peeking at
//! the kernel buffer: one `read` per chunk, and the remainder is carried here.
//! Delimiter semantics are exact — a record is the bytes up to and including
//! `\n` — and the bounded-line failure mode is preserved: once
//! `max_record_len` bytes accumulate without a delimiter the stream can never
//! again produce a valid record, and the reader reports a protocol violation
//! instead of a record.

use thiserror::Error;

use crate::protocol::record::Record;

/// Errors produced while framing a byte stream into records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FramingError {
    /// A message exceeded the maximum record length without completing.
    ///
    /// This is a protocol violation by the peer. The caller should tear down
    /// the offending connection; the violation must not affect unrelated
    /// connections or the process.
    #[error("record exceeds the maximum line length of {limit} bytes ({buffered} buffered without a delimiter)")]
    Oversized { limit: usize, buffered: usize },
}

/// Incremental line reader with a bounded accumulation buffer.
///
/// Usage is push/pull: the transport layer appends whatever bytes a read
/// delivered with [`push`](Self::push), then drains complete records with
/// [`next_record`](Self::next_record) until it returns `Ok(None)`.
///
/// # Examples
///
/// ```rust
/// use linecast_core::LineReader;
///
/// let mut reader = LineReader::new(1024);
/// reader.push(b"hel");
/// assert_eq!(reader.next_record().unwrap(), None);
/// reader.push(b"lo\nwor");
/// let record = reader.next_record().unwrap().unwrap();
/// assert_eq!(record.as_bytes(), b"hello\n");
/// // "wor" stays buffered for the next delivery.
/// assert_eq!(reader.next_record().unwrap(), None);
/// ```
#[derive(Debug)]
pub struct LineReader {
    buf: Vec<u8>,
    /// Bytes already scanned for a delimiter, so repeated `next_record`
    /// calls on a growing buffer never rescan the same prefix.
    scanned: usize,
    max_record_len: usize,
}

impl LineReader {
    /// Creates a reader that accepts records up to `max_record_len` bytes,
    /// delimiter included.
    pub fn new(max_record_len: usize) -> Self {
        Self {
            buf: Vec::new(),
            scanned: 0,
            max_record_len,
        }
    }

    /// Appends freshly read bytes to the accumulation buffer.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Extracts the next complete record, if one is buffered.
    ///
    /// Returns `Ok(None)` when no delimiter has arrived yet. Bytes following
    /// the extracted record remain buffered.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::Oversized`] when `max_record_len` bytes have
    /// accumulated without a delimiter, or when the next delimiter closes a
    /// record longer than the bound. The buffer is left untouched; the
    /// connection is beyond recovery and should be closed.
    pub fn next_record(&mut self) -> Result<Option<Record>, FramingError> {
        if let Some(offset) = self.buf[self.scanned..].iter().position(|&b| b == b'\n') {
            let end = self.scanned + offset + 1;
            if end > self.max_record_len {
                return Err(FramingError::Oversized {
                    limit: self.max_record_len,
                    buffered: end,
                });
            }
            let rest = self.buf.split_off(end);
            let line = std::mem::replace(&mut self.buf, rest);
            self.scanned = 0;
            return Ok(Some(Record::from_bytes(line)));
        }

        self.scanned = self.buf.len();
        if self.buf.len() >= self.max_record_len {
            return Err(FramingError::Oversized {
                limit: self.max_record_len,
                buffered: self.buf.len(),
            });
        }
        Ok(None)
    }

    /// Number of bytes buffered without a completed record.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// The configured record length bound, delimiter included.
    pub fn max_record_len(&self) -> usize {
        self.max_record_len
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn reader() -> LineReader {
        LineReader::new(16)
    }

    #[test]
    fn test_single_complete_line_is_one_record() {
        let mut r = reader();
        r.push(b"ping\n");
        let record = r.next_record().unwrap().expect("record");
        assert_eq!(record.as_bytes(), b"ping\n");
        assert_eq!(r.next_record().unwrap(), None);
        assert_eq!(r.buffered(), 0);
    }

    #[test]
    fn test_record_split_across_two_arrivals_is_reassembled() {
        // "hel" then "lo\n" must yield exactly one record "hello\n", not two.
        let mut r = reader();
        r.push(b"hel");
        assert_eq!(r.next_record().unwrap(), None);
        r.push(b"lo\n");
        let record = r.next_record().unwrap().expect("record");
        assert_eq!(record.as_bytes(), b"hello\n");
        assert_eq!(r.next_record().unwrap(), None);
    }

    #[test]
    fn test_two_records_in_one_arrival_are_extracted_in_order() {
        let mut r = reader();
        r.push(b"one\ntwo\n");
        assert_eq!(r.next_record().unwrap().unwrap().as_bytes(), b"one\n");
        assert_eq!(r.next_record().unwrap().unwrap().as_bytes(), b"two\n");
        assert_eq!(r.next_record().unwrap(), None);
    }

    #[test]
    fn test_bytes_after_delimiter_stay_buffered() {
        let mut r = reader();
        r.push(b"first\nsec");
        assert_eq!(r.next_record().unwrap().unwrap().as_bytes(), b"first\n");
        assert_eq!(r.next_record().unwrap(), None);
        assert_eq!(r.buffered(), 3);

        r.push(b"ond\n");
        assert_eq!(r.next_record().unwrap().unwrap().as_bytes(), b"second\n");
    }

    #[test]
    fn test_empty_line_is_a_valid_record() {
        let mut r = reader();
        r.push(b"\n");
        assert_eq!(r.next_record().unwrap().unwrap().as_bytes(), b"\n");
    }

    #[test]
    fn test_record_at_exactly_max_length_is_accepted() {
        let mut r = reader();
        // 15 payload bytes + delimiter = 16 = limit.
        r.push(&[b'a'; 15]);
        r.push(b"\n");
        let record = r.next_record().unwrap().expect("record");
        assert_eq!(record.len(), 16);
    }

    #[test]
    fn test_max_bytes_without_delimiter_is_a_protocol_violation() {
        let mut r = reader();
        r.push(&[b'a'; 16]);
        assert_eq!(
            r.next_record(),
            Err(FramingError::Oversized {
                limit: 16,
                buffered: 16
            })
        );
    }

    #[test]
    fn test_delimiter_past_the_bound_is_a_protocol_violation() {
        // One arrival can carry a whole oversized line, delimiter included.
        let mut r = reader();
        let mut bytes = vec![b'a'; 20];
        bytes.push(b'\n');
        r.push(&bytes);
        assert!(matches!(
            r.next_record(),
            Err(FramingError::Oversized { limit: 16, .. })
        ));
    }

    #[test]
    fn test_oversize_accumulates_across_arrivals() {
        let mut r = reader();
        r.push(&[b'x'; 10]);
        assert_eq!(r.next_record().unwrap(), None);
        r.push(&[b'x'; 10]);
        assert!(matches!(
            r.next_record(),
            Err(FramingError::Oversized { .. })
        ));
    }

    #[test]
    fn test_violation_is_reported_again_on_subsequent_calls() {
        // The caller tears the connection down on the first report, but a
        // second call must not silently produce a corrupt record.
        let mut r = reader();
        r.push(&[b'a'; 16]);
        assert!(r.next_record().is_err());
        assert!(r.next_record().is_err());
    }

    #[test]
    fn test_rescan_starts_where_the_last_scan_stopped() {
        // Push one byte at a time; the scanned cursor must not lose track of
        // where the delimiter eventually lands.
        let mut r = reader();
        for &b in b"abc" {
            r.push(&[b]);
            assert_eq!(r.next_record().unwrap(), None);
        }
        r.push(b"\n");
        assert_eq!(r.next_record().unwrap().unwrap().as_bytes(), b"abc\n");
    }

    #[test]
    fn test_non_utf8_bytes_pass_through_untouched() {
        let mut r = reader();
        r.push(&[0xDE, 0xAD, 0xBE, 0xEF, b'\n']);
        let record = r.next_record().unwrap().expect("record");
        assert_eq!(record.as_bytes(), &[0xDE, 0xAD, 0xBE, 0xEF, b'\n']);
    }

    #[test]
    fn test_default_limit_matches_wire_contract() {
        let r = LineReader::new(crate::DEFAULT_MAX_RECORD_LEN);
        assert_eq!(r.max_record_len(), 1024);
    }
}
