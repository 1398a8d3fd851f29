//! The relay: source reader and acceptor running side by side
//!
//! The reader runs as its own task; the acceptor runs on the caller's task.
//! They share the subscriber registry and nothing else. Whichever fails
//! first ends the relay; neither ever finishes on its own.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::registry::SubscriberRegistry;
use crate::server::{Acceptor, RelayConfig};
use crate::source::{PipeSource, SourceReader};

/// Log fan-out relay
pub struct Relay {
    config: RelayConfig,
    registry: Arc<SubscriberRegistry>,
}

impl Relay {
    /// Create a relay with the given configuration
    pub fn new(config: RelayConfig) -> Self {
        Self {
            config,
            registry: Arc::new(SubscriberRegistry::new()),
        }
    }

    /// Get a reference to the subscriber registry
    pub fn registry(&self) -> &Arc<SubscriberRegistry> {
        &self.registry
    }

    /// Run the relay
    ///
    /// Opens the source (waiting for a writer), binds the socket, then
    /// reads and accepts until a fatal error. There is no graceful
    /// shutdown; the returned error is always one of the fatal cases.
    pub async fn run(&self) -> Result<()> {
        let source =
            PipeSource::open(&self.config.source_path, self.config.max_record_size).await?;
        let acceptor = Acceptor::bind(&self.config)?;

        tracing::info!(
            path = %acceptor.socket_path().display(),
            "Waiting for connections"
        );

        let reader = SourceReader::new(source, Arc::clone(&self.registry));
        let mut reader_task = tokio::spawn(reader.run());

        let result = tokio::select! {
            joined = &mut reader_task => match joined {
                Ok(result) => result,
                Err(e) => Err(Error::ReaderTask(e.to_string())),
            },
            result = acceptor.run(&self.registry) => result,
        };

        reader_task.abort();
        result
    }
}
