//! Subscriber-facing server
//!
//! Configuration, the pattern handshake, and the accept loop that turns
//! raw connections into registered subscribers.

pub mod config;
pub mod handshake;
pub mod listener;

pub use config::{
    RelayConfig, DEFAULT_MAX_HANDSHAKE_SIZE, DEFAULT_MAX_RECORD_SIZE, DEFAULT_SOCKET_PATH,
    DEFAULT_SOURCE_PATH,
};
pub use handshake::HandshakeError;
pub use listener::Acceptor;
