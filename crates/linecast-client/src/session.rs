//! The client control loop: one readiness wait spanning the operator's input
//! stream and the server socket.
//!
//! The session is strictly sequential — one wait, one action, repeat — with
//! no concurrent writers. Both directions run through the same
//! [`LineReader`] framing as the server: bytes from the socket become records
//! on the display, and complete lines of operator input (delimiter included)
//! go to the socket via a must-complete write.
//!
//! Termination: a zero-byte socket read means the server closed, so the
//! session prints an explicit notice and ends; end of operator input ends
//! the session without sending a trailing partial line.
//!
//! The session is generic over its three streams so tests can drive it with
//! in-memory pipes instead of a terminal and a TCP connection.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use linecast_core::{FramingError, LineReader};

/// Notice written to the display when the server closes the connection.
const SERVER_CLOSED_NOTICE: &[u8] = b"server closed\n";

/// Why the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The server closed the connection.
    ServerClosed,
    /// The operator's input stream reached end of input.
    InputClosed,
}

/// Errors that end the session abnormally.
#[derive(Debug, Error)]
pub enum SessionError {
    /// An I/O error on the socket, input stream, or display.
    #[error("session I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server sent a line exceeding the protocol bound.
    #[error("protocol violation from server: {0}")]
    Protocol(#[from] FramingError),
}

/// Dispatches between the operator's input stream and the server socket.
pub struct DuplexSession<I, D> {
    input: I,
    display: D,
    max_record_len: usize,
}

impl<I, D> DuplexSession<I, D>
where
    I: AsyncRead + Unpin,
    D: AsyncWrite + Unpin,
{
    /// Creates a session reading operator lines from `input` and rendering
    /// received records to `display`.
    pub fn new(input: I, display: D, max_record_len: usize) -> Self {
        Self {
            input,
            display,
            max_record_len,
        }
    }

    /// Runs the session over `socket` until either side closes.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] for stream failures and
    /// [`SessionError::Protocol`] if the server sends an oversized line.
    pub async fn run<S>(self, socket: S) -> Result<SessionEnd, SessionError>
    where
        S: AsyncRead + AsyncWrite,
    {
        let Self {
            mut input,
            mut display,
            max_record_len,
        } = self;
        let (mut sock_rd, mut sock_wr) = tokio::io::split(socket);

        let mut inbound = LineReader::new(max_record_len);
        let mut outbound = LineReader::new(max_record_len);
        let mut sock_buf = vec![0u8; max_record_len];
        let mut input_buf = vec![0u8; max_record_len];

        loop {
            tokio::select! {
                read = sock_rd.read(&mut sock_buf) => {
                    let n = read?;
                    if n == 0 {
                        display.write_all(SERVER_CLOSED_NOTICE).await?;
                        display.flush().await?;
                        return Ok(SessionEnd::ServerClosed);
                    }
                    inbound.push(&sock_buf[..n]);
                    while let Some(record) = inbound.next_record()? {
                        display.write_all(record.as_bytes()).await?;
                    }
                    display.flush().await?;
                }
                read = input.read(&mut input_buf) => {
                    let n = read?;
                    if n == 0 {
                        // End of input. A buffered fragment never got its
                        // delimiter and must not be sent.
                        if outbound.buffered() > 0 {
                            debug!(
                                "discarding {} bytes of partial input at end of input",
                                outbound.buffered()
                            );
                        }
                        return Ok(SessionEnd::InputClosed);
                    }
                    outbound.push(&input_buf[..n]);
                    while let Some(line) = outbound.next_record()? {
                        sock_wr.write_all(line.as_bytes()).await?;
                    }
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
