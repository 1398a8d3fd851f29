//! Relay subscriber
//!
//! Connects with a bounded number of attempts, sends the pattern, then
//! copies everything the relay sends to an output until the relay closes
//! the connection.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::UnixStream;

use crate::client::config::ClientConfig;
use crate::error::{Error, Result};

/// Subscriber client for a running relay
#[derive(Debug, Clone)]
pub struct Tailer {
    config: ClientConfig,
}

impl Tailer {
    /// Create a tailer with the given configuration
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Connect to the relay socket, retrying with a fixed delay
    pub async fn connect(&self) -> Result<UnixStream> {
        let path = &self.config.socket_path;
        let mut attempt = 1;

        loop {
            match UnixStream::connect(path).await {
                Ok(stream) => return Ok(stream),
                Err(source) if attempt >= self.config.max_attempts => {
                    return Err(Error::Connect {
                        path: path.clone(),
                        source,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        attempt,
                        max_attempts = self.config.max_attempts,
                        error = %e,
                        "Connect failed, retrying"
                    );
                    attempt += 1;
                    tokio::time::sleep(self.config.retry_delay).await;
                }
            }
        }
    }

    /// Connect and send the pattern
    ///
    /// The pattern is newline-terminated so that an empty pattern still
    /// produces a non-empty handshake message.
    pub async fn subscribe(&self) -> Result<UnixStream> {
        let mut stream = self.connect().await?;

        let mut message = Vec::with_capacity(self.config.pattern.len() + 1);
        message.extend_from_slice(self.config.pattern.as_bytes());
        message.push(b'\n');
        stream.write_all(&message).await?;

        tracing::debug!(pattern = %self.config.pattern, "Subscribed");
        Ok(stream)
    }

    /// Subscribe and copy the relay's output to `out` until it closes
    ///
    /// Returns the number of bytes copied. A rejected pattern shows up as
    /// the relay's error text followed by the connection closing.
    pub async fn run<O>(&self, out: &mut O) -> Result<u64>
    where
        O: AsyncWrite + Unpin,
    {
        let mut stream = self.subscribe().await?;
        let copied = tokio::io::copy(&mut stream, out).await?;
        out.flush().await?;

        tracing::debug!(bytes = copied, "Relay closed the connection");
        Ok(copied)
    }
}
