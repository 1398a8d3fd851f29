//! Relay configuration

use std::path::{Path, PathBuf};

/// Default named pipe to read records from
pub const DEFAULT_SOURCE_PATH: &str = "/var/run/fifo.pipe";

/// Default socket path for subscriber connections
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/log.socket";

/// Largest pattern message read during a handshake
pub const DEFAULT_MAX_HANDSHAKE_SIZE: usize = 64 * 1024;

/// Largest record read from the source, excluding the line terminator
///
/// Longer lines are split into consecutive records of at most this size.
pub const DEFAULT_MAX_RECORD_SIZE: usize = 64 * 1024;

/// Relay configuration options
///
/// Built once at startup and passed by reference to the reader and the
/// acceptor. Paths are only validated by the open and bind calls.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Named pipe to read records from
    pub source_path: PathBuf,

    /// Unix socket path to accept subscribers on
    pub socket_path: PathBuf,

    /// Maximum size of the handshake pattern message in bytes
    pub max_handshake_size: usize,

    /// Maximum size of a single record in bytes
    pub max_record_size: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_SOURCE_PATH),
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            max_handshake_size: DEFAULT_MAX_HANDSHAKE_SIZE,
            max_record_size: DEFAULT_MAX_RECORD_SIZE,
        }
    }
}

impl RelayConfig {
    /// Create a config with custom source and socket paths
    pub fn new<S: AsRef<Path>, L: AsRef<Path>>(source_path: S, socket_path: L) -> Self {
        Self {
            source_path: source_path.as_ref().to_path_buf(),
            socket_path: socket_path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Set the source path
    pub fn source_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source_path = path.as_ref().to_path_buf();
        self
    }

    /// Set the socket path
    pub fn socket_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.socket_path = path.as_ref().to_path_buf();
        self
    }

    /// Set the maximum handshake size (at least one byte)
    pub fn max_handshake_size(mut self, size: usize) -> Self {
        self.max_handshake_size = size.max(1);
        self
    }

    /// Set the maximum record size (at least one byte)
    pub fn max_record_size(mut self, size: usize) -> Self {
        self.max_record_size = size.max(1);
        self
    }
}
