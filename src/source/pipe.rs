//! Named-pipe record source
//!
//! A FIFO reports end-of-stream every time its last writer closes. That is
//! normal writer churn, not a failure, so the source closes its handle and
//! opens the path again. Opening a FIFO for reading waits until a writer
//! appears, which is what paces the loop.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::BufReader;

use crate::error::{Error, Result};

use super::record::Record;
use super::scanner::RecordScanner;

/// Restartable record stream over a named pipe
#[derive(Debug)]
pub struct PipeSource {
    /// Path to the FIFO
    path: PathBuf,

    /// Scanner over the currently open handle, `None` between close and reopen
    scanner: Option<RecordScanner<BufReader<File>>>,

    /// Longest record handed to the scanner
    max_record_size: usize,

    /// Number of times the path has been opened
    opens: u64,
}

impl PipeSource {
    /// Open the source path
    ///
    /// Blocks until a writer has the pipe open. An error here is fatal for
    /// the relay. Lines longer than `max_record_size` are split.
    pub async fn open(path: impl Into<PathBuf>, max_record_size: usize) -> Result<Self> {
        let mut source = Self {
            path: path.into(),
            scanner: None,
            max_record_size,
            opens: 0,
        };
        source.open_stream().await?;

        tracing::info!(path = %source.path.display(), "Source opened");

        Ok(source)
    }

    /// Path being read
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of reopens after end-of-stream
    pub fn reopen_count(&self) -> u64 {
        self.opens.saturating_sub(1)
    }

    /// Read the next record, reopening the pipe as often as needed
    ///
    /// Only a failed reopen returns an error.
    pub async fn next_record(&mut self) -> Result<Record> {
        loop {
            if let Some(scanner) = self.scanner.as_mut() {
                match scanner.next_record().await {
                    Ok(Some(record)) => return Ok(record),
                    Ok(None) => {
                        tracing::debug!(
                            path = %self.path.display(),
                            "Source reached end of stream"
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %self.path.display(),
                            error = %e,
                            "Error reading source, reopening"
                        );
                    }
                }
            }

            // Close before reopening. There is deliberately no delay and no
            // attempt limit here: the open itself waits for the next writer,
            // and any backoff would only add latency to the next record.
            self.scanner = None;
            self.open_stream().await?;

            tracing::debug!(
                path = %self.path.display(),
                reopens = self.reopen_count(),
                "Source reopened"
            );
        }
    }

    async fn open_stream(&mut self) -> Result<()> {
        let file = File::open(&self.path).await.map_err(|source| Error::SourceOpen {
            path: self.path.clone(),
            source,
        })?;

        self.scanner = Some(RecordScanner::new(BufReader::new(file), self.max_record_size));
        self.opens += 1;
        Ok(())
    }
}
