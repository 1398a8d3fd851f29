//! Subscriber binary: stream matching lines from a running relay to stdout.
//!
//! Run with: logmux-tail [--socket PATH] [--regexp PATTERN]

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use logmux::client::{ClientConfig, Tailer, DEFAULT_PATTERN};
use logmux::server::DEFAULT_SOCKET_PATH;

#[derive(Parser)]
#[command(name = "logmux-tail")]
#[command(version)]
#[command(about = "Stream log lines matching a regular expression from logmux")]
struct Cli {
    /// Socket to communicate with logmux
    #[arg(long, default_value = DEFAULT_SOCKET_PATH)]
    socket: PathBuf,

    /// Regular expression against which log entries are matched
    #[arg(long, default_value = DEFAULT_PATTERN)]
    regexp: String,

    /// Connection attempts before giving up
    #[arg(long, default_value_t = 5)]
    attempts: u32,

    /// Milliseconds to wait between connection attempts
    #[arg(long, default_value_t = 1000)]
    retry_delay_ms: u64,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("logmux=warn")),
        )
        .init();

    let config = ClientConfig::new(&cli.socket)
        .pattern(cli.regexp)
        .max_attempts(cli.attempts)
        .retry_delay(Duration::from_millis(cli.retry_delay_ms));

    let mut stdout = tokio::io::stdout();
    if let Err(e) = Tailer::new(config).run(&mut stdout).await {
        tracing::error!(error = %e, "Tail failed");
        std::process::exit(1);
    }
}
