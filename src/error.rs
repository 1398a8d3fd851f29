//! Crate-level error types
//!
//! Only failures that end the relay (or the subscriber client) surface
//! here. Per-subscriber and per-connection failures are handled where they
//! occur.

use std::path::PathBuf;

/// Fatal relay error
#[derive(Debug)]
pub enum Error {
    /// The source path could not be opened
    SourceOpen {
        /// Source path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// The listening socket could not be bound
    Bind {
        /// Socket path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// The listener failed to accept a connection
    Accept(std::io::Error),
    /// A subscriber client could not reach the relay
    Connect {
        /// Socket path
        path: PathBuf,
        /// Error from the last attempt
        source: std::io::Error,
    },
    /// Other I/O error
    Io(std::io::Error),
    /// The source reader task ended abnormally
    ReaderTask(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::SourceOpen { path, source } => {
                write!(f, "failed to open source {}: {}", path.display(), source)
            }
            Error::Bind { path, source } => {
                write!(f, "failed to bind socket {}: {}", path.display(), source)
            }
            Error::Accept(e) => write!(f, "failed to accept connection: {}", e),
            Error::Connect { path, source } => {
                write!(f, "failed to connect to {}: {}", path.display(), source)
            }
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::ReaderTask(msg) => write!(f, "source reader stopped: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::SourceOpen { source, .. }
            | Error::Bind { source, .. }
            | Error::Connect { source, .. } => Some(source),
            Error::Accept(e) | Error::Io(e) => Some(e),
            Error::ReaderTask(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

/// Result alias for relay operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_path() {
        let err = Error::SourceOpen {
            path: PathBuf::from("/var/run/fifo.pipe"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };

        let text = err.to_string();
        assert!(text.starts_with("failed to open source /var/run/fifo.pipe: "));
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error as _;

        let err = Error::Accept(std::io::Error::other("listener gone"));
        assert!(err.source().is_some());

        let err = Error::ReaderTask("panicked".into());
        assert!(err.source().is_none());
    }
}
