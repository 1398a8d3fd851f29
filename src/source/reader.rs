//! Source reader loop
//!
//! Reads records from the pipe one at a time and dispatches each to the
//! registry. Dispatch of record N finishes before record N+1 is read, so
//! every subscriber sees records in source order.

use std::sync::Arc;

use tokio::io::AsyncWrite;
use tokio::net::UnixStream;

use crate::error::Result;
use crate::registry::{DispatchReport, SubscriberRegistry};

use super::pipe::PipeSource;

/// Drives records from a `PipeSource` into a `SubscriberRegistry`
pub struct SourceReader<W = UnixStream> {
    source: PipeSource,
    registry: Arc<SubscriberRegistry<W>>,
    records_read: u64,
}

impl<W: AsyncWrite + Unpin> SourceReader<W> {
    /// Create a reader over an already opened source
    pub fn new(source: PipeSource, registry: Arc<SubscriberRegistry<W>>) -> Self {
        Self {
            source,
            registry,
            records_read: 0,
        }
    }

    /// Number of records read so far
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Read one record and dispatch it
    pub async fn step(&mut self) -> Result<DispatchReport> {
        let record = self.source.next_record().await?;
        self.records_read += 1;

        Ok(self.registry.dispatch(record.as_bytes()).await)
    }

    /// Run until the source can no longer be opened
    pub async fn run(mut self) -> Result<()> {
        tracing::debug!(path = %self.source.path().display(), "Source reader started");

        loop {
            let report = self.step().await?;

            if report.evicted > 0 {
                tracing::debug!(
                    records = self.records_read,
                    evicted = report.evicted,
                    "Subscribers removed during dispatch"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;
    use crate::registry::Pattern;
    use crate::server::DEFAULT_MAX_RECORD_SIZE;
    use crate::source::pipe::tests::{make_fifo, open_writer, send};

    #[tokio::test]
    async fn test_step_dispatches_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let fifo = make_fifo(dir.path());

        let writer_path = fifo.clone();
        let writer = tokio::spawn(async move {
            let mut writer = open_writer(&writer_path).await;
            send(&mut writer, b"a1\nb2\na3\n").await;
            writer
        });

        let registry = Arc::new(SubscriberRegistry::new());
        let (server, mut client) = UnixStream::pair().unwrap();
        registry
            .register(server, Pattern::compile("^a").unwrap())
            .await;

        let source = PipeSource::open(&fifo, DEFAULT_MAX_RECORD_SIZE).await.unwrap();
        let mut reader = SourceReader::new(source, Arc::clone(&registry));

        assert_eq!(reader.step().await.unwrap().delivered, 1);
        assert_eq!(reader.step().await.unwrap().matched, 0);
        assert_eq!(reader.step().await.unwrap().delivered, 1);
        assert_eq!(reader.records_read(), 3);

        let mut buf = [0u8; 6];
        client.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"a1\na3\n");

        drop(writer.await.unwrap());
    }

    #[tokio::test]
    async fn test_no_redelivery_after_writer_churn() {
        let dir = tempfile::tempdir().unwrap();
        let fifo = make_fifo(dir.path());

        let writer_path = fifo.clone();
        let writers = tokio::spawn(async move {
            let mut first = open_writer(&writer_path).await;
            send(&mut first, b"old\n").await;
            drop(first);

            let mut second = open_writer(&writer_path).await;
            send(&mut second, b"new\n").await;
            second
        });

        let registry = Arc::new(SubscriberRegistry::new());
        let (server, mut client) = UnixStream::pair().unwrap();
        let id = registry.register(server, Pattern::compile("").unwrap()).await;

        let source = PipeSource::open(&fifo, DEFAULT_MAX_RECORD_SIZE).await.unwrap();
        let mut reader = SourceReader::new(source, Arc::clone(&registry));
        reader.step().await.unwrap();
        reader.step().await.unwrap();

        let mut buf = [0u8; 8];
        client.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"old\nnew\n");

        // Closing the subscriber shows nothing else was queued for it
        registry.remove(id).await;
        let mut rest = Vec::new();
        client.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());

        drop(writers.await.unwrap());
    }
}
