//! Relay binary: read records from a named pipe and fan them out to
//! subscribers on a Unix socket.
//!
//! Run with: logmux [--log-fifo PATH] [--socket PATH]
//!
//! Feed it from any program that writes lines:
//!   mkfifo /var/run/fifo.pipe
//!   some-daemon > /var/run/fifo.pipe
//!
//! Then subscribe with a pattern:
//!   logmux-tail --regexp 'level=error'

use std::path::PathBuf;

use clap::Parser;
use logmux::server::{
    DEFAULT_MAX_HANDSHAKE_SIZE, DEFAULT_MAX_RECORD_SIZE, DEFAULT_SOCKET_PATH, DEFAULT_SOURCE_PATH,
};
use logmux::{Relay, RelayConfig};

#[derive(Parser)]
#[command(name = "logmux")]
#[command(version)]
#[command(about = "Fan out lines from a named pipe to filtered Unix socket subscribers")]
struct Cli {
    /// Named pipe to read from
    #[arg(long, default_value = DEFAULT_SOURCE_PATH)]
    log_fifo: PathBuf,

    /// Socket for local connections
    #[arg(long, default_value = DEFAULT_SOCKET_PATH)]
    socket: PathBuf,

    /// Largest pattern message accepted from a subscriber, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_HANDSHAKE_SIZE)]
    max_handshake_size: usize,

    /// Longest record read from the pipe, in bytes; longer lines are split
    #[arg(long, default_value_t = DEFAULT_MAX_RECORD_SIZE)]
    max_record_size: usize,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("logmux=info")),
        )
        .init();

    let config = RelayConfig::new(&cli.log_fifo, &cli.socket)
        .max_handshake_size(cli.max_handshake_size)
        .max_record_size(cli.max_record_size);
    let relay = Relay::new(config);

    if let Err(e) = relay.run().await {
        tracing::error!(error = %e, "Relay stopped");
        std::process::exit(1);
    }
}
