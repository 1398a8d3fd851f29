//! # logmux
//!
//! A local log fan-out relay. Newline-delimited records are read from a
//! named pipe and republished over a Unix socket to every subscriber whose
//! regular expression matches the record.
//!
//! ```text
//!   writer ──► FIFO ──► SourceReader ──► SubscriberRegistry ──► subscriber
//!                                              ▲          └──► subscriber
//!                                              │
//!                       socket ──► Acceptor ───┘ (handshake: pattern)
//! ```
//!
//! The reader and the acceptor share nothing but the registry lock.

pub mod client;
pub mod error;
pub mod registry;
pub mod relay;
pub mod server;
pub mod source;

pub use error::{Error, Result};
pub use registry::{Pattern, SubscriberRegistry};
pub use relay::Relay;
pub use server::RelayConfig;
