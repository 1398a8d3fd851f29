//! Subscriber registry implementation
//!
//! The central registry that owns every live subscriber and fans records
//! out to the ones whose pattern matches.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::AsyncWrite;
use tokio::net::UnixStream;
use tokio::sync::Mutex;

use super::entry::{Subscriber, SubscriberId, SubscriberStats};
use super::pattern::Pattern;

/// Outcome of dispatching one record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Subscribers whose pattern matched
    pub matched: usize,
    /// Subscribers the record was written to
    pub delivered: usize,
    /// Subscribers removed because the write failed
    pub evicted: usize,
}

/// Central registry for all live subscribers
///
/// Thread-safe via a single `Mutex`. Registration and dispatch are fully
/// serialized; there is no per-entry locking.
pub struct SubscriberRegistry<W = UnixStream> {
    /// Map of subscriber ID to subscriber entry
    subscribers: Mutex<HashMap<SubscriberId, Subscriber<W>>>,

    /// Next ID to hand out
    next_id: AtomicU64,
}

impl<W> SubscriberRegistry<W> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a subscriber connection with its pattern
    ///
    /// The registry takes ownership of the connection; it stays open until
    /// the subscriber is removed.
    pub async fn register(&self, conn: W, pattern: Pattern) -> SubscriberId {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut subscribers = self.subscribers.lock().await;

        tracing::info!(
            subscriber = %id,
            pattern = %pattern,
            subscribers = subscribers.len() + 1,
            "Subscriber registered"
        );

        subscribers.insert(id, Subscriber::new(conn, pattern));
        id
    }

    /// Remove a subscriber and close its connection
    ///
    /// Returns `false` if the subscriber was already gone.
    pub async fn remove(&self, id: SubscriberId) -> bool {
        self.subscribers.lock().await.remove(&id).is_some()
    }

    /// Check whether a subscriber is still registered
    pub async fn contains(&self, id: SubscriberId) -> bool {
        self.subscribers.lock().await.contains_key(&id)
    }

    /// Number of live subscribers
    pub async fn len(&self) -> usize {
        self.subscribers.lock().await.len()
    }

    /// Whether there are no live subscribers
    pub async fn is_empty(&self) -> bool {
        self.subscribers.lock().await.is_empty()
    }

    /// Get statistics for one subscriber
    pub async fn stats(&self, id: SubscriberId) -> Option<SubscriberStats> {
        self.subscribers.lock().await.get(&id).map(Subscriber::stats)
    }
}

impl<W: AsyncWrite + Unpin> SubscriberRegistry<W> {
    /// Deliver a record to every subscriber whose pattern matches
    ///
    /// The record is written with a trailing newline. Writes happen one
    /// after another while the lock is held. A subscriber whose write fails
    /// is removed, and its connection closed, before the lock is released.
    /// Broken pipes are expected and silent; other failures are logged.
    pub async fn dispatch(&self, record: &[u8]) -> DispatchReport {
        let mut report = DispatchReport::default();
        let mut subscribers = self.subscribers.lock().await;

        if subscribers.is_empty() {
            return report;
        }

        let line = terminated(record);
        let mut failed = Vec::new();

        for (id, subscriber) in subscribers.iter_mut() {
            if !subscriber.pattern().is_match(record) {
                continue;
            }
            report.matched += 1;

            match subscriber.deliver(&line).await {
                Ok(()) => report.delivered += 1,
                Err(failure) => {
                    if !failure.is_disconnect() {
                        tracing::warn!(
                            subscriber = %id,
                            error = %failure,
                            "Error writing to subscriber, removing"
                        );
                    }
                    failed.push(*id);
                }
            }
        }

        for id in failed {
            subscribers.remove(&id);
            report.evicted += 1;
        }

        report
    }
}

impl<W> Default for SubscriberRegistry<W> {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy a record into a buffer with the trailing line terminator
fn terminated(record: &[u8]) -> Bytes {
    let mut line = BytesMut::with_capacity(record.len() + 1);
    line.put_slice(record);
    line.put_u8(b'\n');
    line.freeze()
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::pin::Pin;
    use std::sync::{Arc, Mutex as StdMutex};

    use tokio::io::AsyncReadExt;

    use super::*;

    type DynWriter = Pin<Box<dyn AsyncWrite + Send>>;

    /// Log sink shared between the test and the installed subscriber
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<StdMutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn warn_lines(&self) -> usize {
            let logs = self.0.lock().unwrap();
            String::from_utf8_lossy(&logs)
                .lines()
                .filter(|line| line.contains("WARN"))
                .count()
        }

        fn install(&self) -> tracing::subscriber::DefaultGuard {
            let sink = self.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_writer(move || sink.clone())
                .with_ansi(false)
                .with_max_level(tracing::Level::DEBUG)
                .finish();
            tracing::subscriber::set_default(subscriber)
        }
    }

    async fn read_available(stream: &mut UnixStream, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        stream.read_exact(&mut buf).await.unwrap();
        buf
    }

    #[tokio::test]
    async fn test_register_and_dispatch() {
        let registry = SubscriberRegistry::new();
        let (server, mut client) = UnixStream::pair().unwrap();

        let id = registry
            .register(server, Pattern::compile("^a").unwrap())
            .await;
        assert!(registry.contains(id).await);
        assert_eq!(registry.len().await, 1);

        let report = registry.dispatch(b"a1").await;
        assert_eq!(
            report,
            DispatchReport {
                matched: 1,
                delivered: 1,
                evicted: 0
            }
        );

        let report = registry.dispatch(b"b2").await;
        assert_eq!(report.matched, 0);

        registry.dispatch(b"a3").await;

        assert_eq!(read_available(&mut client, 6).await, b"a1\na3\n");
        assert_eq!(registry.stats(id).await.unwrap().delivered, 2);
    }

    #[tokio::test]
    async fn test_filtering_per_subscriber() {
        let registry = SubscriberRegistry::new();
        let (s1, mut c1) = UnixStream::pair().unwrap();
        let (s2, mut c2) = UnixStream::pair().unwrap();

        registry.register(s1, Pattern::compile("^a").unwrap()).await;
        registry.register(s2, Pattern::compile("").unwrap()).await;

        for record in [&b"a1"[..], b"b2", b"a3"] {
            registry.dispatch(record).await;
        }

        assert_eq!(read_available(&mut c1, 6).await, b"a1\na3\n");
        assert_eq!(read_available(&mut c2, 9).await, b"a1\nb2\na3\n");
    }

    #[tokio::test]
    async fn test_broken_pipe_evicts_subscriber() {
        let registry = SubscriberRegistry::new();
        let (gone, gone_client) = UnixStream::pair().unwrap();
        let (alive, mut alive_client) = UnixStream::pair().unwrap();

        let gone_id = registry.register(gone, Pattern::compile("").unwrap()).await;
        let alive_id = registry
            .register(alive, Pattern::compile("").unwrap())
            .await;

        drop(gone_client);

        let report = registry.dispatch(b"x").await;
        assert_eq!(report.matched, 2);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.evicted, 1);

        assert!(!registry.contains(gone_id).await);
        assert!(registry.contains(alive_id).await);

        // No further attempts are made against the removed subscriber
        let report = registry.dispatch(b"y").await;
        assert_eq!(report.matched, 1);
        assert_eq!(report.evicted, 0);

        assert_eq!(read_available(&mut alive_client, 4).await, b"x\ny\n");
    }

    #[tokio::test]
    async fn test_write_error_isolated() {
        let registry: SubscriberRegistry<DynWriter> = SubscriberRegistry::new();

        let failing = tokio_test::io::Builder::new()
            .write_error(io::Error::other("device unavailable"))
            .build();
        let (healthy, mut healthy_client) = UnixStream::pair().unwrap();

        let failing_id = registry
            .register(Box::pin(failing), Pattern::compile("").unwrap())
            .await;
        registry
            .register(Box::pin(healthy), Pattern::compile("").unwrap())
            .await;

        let report = registry.dispatch(b"first").await;
        assert_eq!(report.delivered, 1);
        assert_eq!(report.evicted, 1);
        assert!(!registry.contains(failing_id).await);

        registry.dispatch(b"second").await;

        assert_eq!(
            read_available(&mut healthy_client, 13).await,
            b"first\nsecond\n"
        );
    }

    #[tokio::test]
    async fn test_remove_closes_connection() {
        let registry = SubscriberRegistry::new();
        let (server, mut client) = UnixStream::pair().unwrap();

        let id = registry.register(server, Pattern::compile("").unwrap()).await;

        assert!(registry.remove(id).await);
        assert!(!registry.remove(id).await);
        assert!(registry.is_empty().await);

        let mut buf = Vec::new();
        let n = client.read_to_end(&mut buf).await.unwrap();
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn test_dispatch_without_subscribers() {
        let registry: SubscriberRegistry = SubscriberRegistry::new();

        let report = registry.dispatch(b"nobody listening").await;
        assert_eq!(report, DispatchReport::default());
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let registry = SubscriberRegistry::new();
        let (a, _ca) = UnixStream::pair().unwrap();
        let (b, _cb) = UnixStream::pair().unwrap();

        let id_a = registry.register(a, Pattern::compile("").unwrap()).await;
        registry.remove(id_a).await;
        let id_b = registry.register(b, Pattern::compile("").unwrap()).await;

        assert_ne!(id_a, id_b);
    }

    #[tokio::test]
    async fn test_broken_pipe_eviction_is_silent() {
        let logs = CapturedLogs::default();
        let _guard = logs.install();

        let registry = SubscriberRegistry::new();
        let (gone, gone_client) = UnixStream::pair().unwrap();
        let id = registry.register(gone, Pattern::compile("").unwrap()).await;
        drop(gone_client);

        let report = registry.dispatch(b"x").await;
        assert_eq!(report.evicted, 1);
        assert!(!registry.contains(id).await);
        assert_eq!(logs.warn_lines(), 0);
    }

    #[tokio::test]
    async fn test_other_write_failure_warns_once() {
        let logs = CapturedLogs::default();
        let _guard = logs.install();

        let registry: SubscriberRegistry<DynWriter> = SubscriberRegistry::new();
        let failing = tokio_test::io::Builder::new()
            .write_error(io::Error::other("device unavailable"))
            .build();
        let id = registry
            .register(Box::pin(failing), Pattern::compile("").unwrap())
            .await;

        let report = registry.dispatch(b"x").await;
        assert_eq!(report.evicted, 1);
        assert!(!registry.contains(id).await);

        // Later records find no subscriber and log nothing more
        registry.dispatch(b"y").await;
        assert_eq!(logs.warn_lines(), 1);
    }
}
