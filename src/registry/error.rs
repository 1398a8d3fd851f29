//! Delivery failure classification
//!
//! Every write failure evicts the subscriber. The classification only
//! decides whether the failure is worth a diagnostic.

use std::io;

/// A failed write to a subscriber connection
#[derive(Debug)]
pub enum WriteFailure {
    /// The subscriber closed its read side (broken pipe)
    Disconnected(io::Error),
    /// Any other write error
    Failed(io::Error),
}

impl WriteFailure {
    /// Whether this failure is the expected result of a subscriber going away
    pub fn is_disconnect(&self) -> bool {
        matches!(self, WriteFailure::Disconnected(_))
    }
}

impl From<io::Error> for WriteFailure {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::BrokenPipe {
            WriteFailure::Disconnected(e)
        } else {
            WriteFailure::Failed(e)
        }
    }
}

impl std::fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteFailure::Disconnected(e) => write!(f, "subscriber disconnected: {}", e),
            WriteFailure::Failed(e) => write!(f, "write failed: {}", e),
        }
    }
}

impl std::error::Error for WriteFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WriteFailure::Disconnected(e) | WriteFailure::Failed(e) => Some(e),
        }
    }
}
