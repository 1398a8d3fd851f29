//! Subscriber handshake
//!
//! A new connection sends exactly one message: its filter pattern,
//! optionally followed by a newline.
//!
//! ```text
//! Subscriber                               Relay
//!   |                                        |
//!   |------- pattern [\n] ----------------->|  one read, bounded size
//!   |                                        |
//!   |        [compiles]                      |
//!   |<------ record\n ----------------------|  no acknowledgement,
//!   |<------ record\n ----------------------|  records only
//!   |                                        |
//!   |        [fails]                         |
//!   |<------ error text --------------------|
//!   |<------ close -------------------------|
//! ```
//!
//! A rejected subscriber can tell the difference because a successful
//! handshake never sends anything before the first matching record.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::registry::Pattern;

/// Reason a handshake was rejected
///
/// The `Display` text is what the subscriber receives before the relay
/// closes the connection.
#[derive(Debug)]
pub enum HandshakeError {
    /// Reading the pattern message failed
    Read(io::Error),
    /// The connection closed before any bytes arrived
    Closed,
    /// The pattern message is not UTF-8
    InvalidUtf8(std::str::Utf8Error),
    /// The pattern does not compile
    Pattern(regex::Error),
}

impl std::fmt::Display for HandshakeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandshakeError::Read(e) => write!(f, "{}", e),
            HandshakeError::Closed => {
                write!(f, "connection closed before a pattern was received")
            }
            HandshakeError::InvalidUtf8(e) => write!(f, "pattern is not valid UTF-8: {}", e),
            HandshakeError::Pattern(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for HandshakeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HandshakeError::Read(e) => Some(e),
            HandshakeError::Closed => None,
            HandshakeError::InvalidUtf8(e) => Some(e),
            HandshakeError::Pattern(e) => Some(e),
        }
    }
}

/// Compile a raw pattern message, stripping one trailing newline
pub fn parse_pattern(message: &[u8]) -> Result<Pattern, HandshakeError> {
    let message = message.strip_suffix(b"\n").unwrap_or(message);
    let expr = std::str::from_utf8(message).map_err(HandshakeError::InvalidUtf8)?;

    Pattern::compile(expr).map_err(HandshakeError::Pattern)
}

/// Read the pattern message with a single read into `buf`
///
/// The message is limited to `buf.len()` bytes; anything the subscriber
/// sends beyond one read is never looked at.
pub async fn read_pattern<S>(conn: &mut S, buf: &mut [u8]) -> Result<Pattern, HandshakeError>
where
    S: AsyncRead + Unpin,
{
    let n = conn.read(buf).await.map_err(HandshakeError::Read)?;
    if n == 0 {
        return Err(HandshakeError::Closed);
    }

    parse_pattern(&buf[..n])
}

/// Send the rejection text and shut the connection down
///
/// Failures are ignored: the peer may already be gone, and the connection
/// is dropped either way.
pub async fn reject<S>(conn: &mut S, err: &HandshakeError)
where
    S: AsyncWrite + Unpin,
{
    if let Err(e) = conn.write_all(err.to_string().as_bytes()).await {
        tracing::debug!(error = %e, "Could not send handshake error");
        return;
    }
    let _ = conn.shutdown().await;
}

/// Run the handshake on a new connection
///
/// On success the connection is handed back with its compiled pattern. On
/// failure the subscriber has been sent the error text and the connection
/// is closed when it is dropped.
pub async fn perform_handshake<S>(
    mut conn: S,
    buf: &mut [u8],
) -> Result<(S, Pattern), HandshakeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match read_pattern(&mut conn, buf).await {
        Ok(pattern) => Ok((conn, pattern)),
        Err(e) => {
            reject(&mut conn, &e).await;
            Err(e)
        }
    }
}
