//! Client configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::server::DEFAULT_SOCKET_PATH;

/// Pattern sent when none is given; matches every record
pub const DEFAULT_PATTERN: &str = ".*";

/// Subscriber client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Relay socket path
    pub socket_path: PathBuf,

    /// Filter pattern sent during the handshake
    pub pattern: String,

    /// Connection attempts before giving up (at least 1)
    pub max_attempts: u32,

    /// Fixed delay between connection attempts
    pub retry_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            pattern: DEFAULT_PATTERN.to_string(),
            max_attempts: 5,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl ClientConfig {
    /// Create a config for the given socket path
    pub fn new<P: AsRef<Path>>(socket_path: P) -> Self {
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Set the filter pattern
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Set the number of connection attempts
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the delay between connection attempts
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}
