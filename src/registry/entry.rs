//! Subscriber entry types
//!
//! This module defines the per-subscriber state stored in the registry.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::error::WriteFailure;
use super::pattern::Pattern;

/// Unique identifier for a registered subscriber
///
/// Identifiers are never reused within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub(super) u64);

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Entry for a single subscriber in the registry
///
/// The pattern is fixed at creation. Dropping the entry closes the
/// connection.
pub struct Subscriber<W> {
    /// Delivery side of the subscriber connection
    conn: W,

    /// Filter applied to every record
    pattern: Pattern,

    /// Records written successfully
    delivered: u64,
}

impl<W> Subscriber<W> {
    /// Create a new subscriber entry
    pub(super) fn new(conn: W, pattern: Pattern) -> Self {
        Self {
            conn,
            pattern,
            delivered: 0,
        }
    }

    /// The subscriber's filter pattern
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Snapshot of this subscriber's statistics
    pub fn stats(&self) -> SubscriberStats {
        SubscriberStats {
            pattern: self.pattern.as_str().to_owned(),
            delivered: self.delivered,
        }
    }
}

impl<W: AsyncWrite + Unpin> Subscriber<W> {
    /// Write one newline-terminated record to the connection
    pub(super) async fn deliver(&mut self, line: &[u8]) -> Result<(), WriteFailure> {
        self.conn.write_all(line).await?;
        self.conn.flush().await?;
        self.delivered += 1;
        Ok(())
    }
}

impl<W> std::fmt::Debug for Subscriber<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("pattern", &self.pattern.as_str())
            .field("delivered", &self.delivered)
            .finish_non_exhaustive()
    }
}

/// Statistics for a subscriber
#[derive(Debug, Clone)]
pub struct SubscriberStats {
    /// Pattern source text
    pub pattern: String,
    /// Records delivered
    pub delivered: u64,
}
