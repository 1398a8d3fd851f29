//! Subscriber client
//!
//! Connects to a running relay, sends a pattern, and streams whatever the
//! relay sends back:
//! - Tailing filtered logs to a terminal
//! - Feeding relay output into another program

pub mod config;
pub mod tailer;

pub use config::{ClientConfig, DEFAULT_PATTERN};
pub use tailer::Tailer;
