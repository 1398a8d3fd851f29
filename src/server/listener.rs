//! Subscriber connection acceptor
//!
//! Accepts connections on the Unix socket one at a time, runs the pattern
//! handshake, and registers successful subscribers.

use std::path::{Path, PathBuf};

use tokio::net::UnixListener;

use crate::error::{Error, Result};
use crate::registry::{SubscriberId, SubscriberRegistry};
use crate::server::config::RelayConfig;
use crate::server::handshake::perform_handshake;

/// Accept loop for subscriber connections
///
/// Handshakes run inline on the accept loop, with no timeout. A subscriber
/// that connects and never sends its pattern holds up later subscribers,
/// but never the source reader or already registered subscribers.
#[derive(Debug)]
pub struct Acceptor {
    listener: UnixListener,
    socket_path: PathBuf,
    /// Handshake read buffer, reused across connections
    buf: Vec<u8>,
}

impl Acceptor {
    /// Bind the listening socket, replacing any existing file at the path
    pub fn bind(config: &RelayConfig) -> Result<Self> {
        let socket_path = config.socket_path.clone();

        match std::fs::remove_file(&socket_path) {
            Ok(()) => {
                tracing::debug!(path = %socket_path.display(), "Removed stale socket file");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(Error::Bind {
                    path: socket_path,
                    source,
                })
            }
        }

        let listener = UnixListener::bind(&socket_path).map_err(|source| Error::Bind {
            path: socket_path.clone(),
            source,
        })?;

        Ok(Self {
            listener,
            socket_path,
            buf: vec![0u8; config.max_handshake_size],
        })
    }

    /// Get the socket path
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Accept one connection and try to register it
    ///
    /// Returns `Ok(None)` when the handshake was rejected. Only a failure of
    /// the listener itself is an error.
    pub async fn accept_one(
        &mut self,
        registry: &SubscriberRegistry,
    ) -> Result<Option<SubscriberId>> {
        let (stream, _addr) = self.listener.accept().await.map_err(Error::Accept)?;

        match perform_handshake(stream, &mut self.buf).await {
            Ok((stream, pattern)) => Ok(Some(registry.register(stream, pattern).await)),
            Err(e) => {
                tracing::debug!(error = %e, "Handshake rejected");
                Ok(None)
            }
        }
    }

    /// Run the accept loop
    ///
    /// Returns only when accepting fails, which is fatal for the relay.
    pub async fn run(mut self, registry: &SubscriberRegistry) -> Result<()> {
        loop {
            self.accept_one(registry).await?;
        }
    }
}
