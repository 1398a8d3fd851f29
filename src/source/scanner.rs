//! Line scanning

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::record::Record;

/// Capacity the line buffer returns to after an oversized line
const INITIAL_CAPACITY: usize = 4 * 1024;

/// Splits a byte stream into records at `\n`
///
/// A trailing line without a terminator is still returned as a record
/// before end-of-stream is reported. A line longer than the maximum record
/// size is split into consecutive records of at most that size, so the
/// line buffer never holds more than one record.
#[derive(Debug)]
pub struct RecordScanner<R> {
    reader: R,
    buf: Vec<u8>,
    max_record_size: usize,
    /// Set while the remainder of a split line is still being read
    oversized: bool,
}

impl<R: AsyncBufRead + Unpin> RecordScanner<R> {
    /// Create a scanner over a buffered reader
    pub fn new(reader: R, max_record_size: usize) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            max_record_size: max_record_size.max(1),
            oversized: false,
        }
    }

    /// Read the next record
    ///
    /// Returns `Ok(None)` at end-of-stream.
    pub async fn next_record(&mut self) -> io::Result<Option<Record>> {
        self.buf.clear();

        let split = loop {
            let available = self.reader.fill_buf().await?;
            if available.is_empty() {
                if self.buf.is_empty() {
                    if self.oversized {
                        self.oversized = false;
                        self.buf.shrink_to(INITIAL_CAPACITY);
                    }
                    return Ok(None);
                }
                break false;
            }

            // One byte past the limit so a terminator right at the limit
            // still ends the line instead of starting an empty record.
            let room = self.max_record_size - self.buf.len();
            let window = &available[..available.len().min(room + 1)];

            if let Some(pos) = window.iter().position(|&b| b == b'\n') {
                self.buf.extend_from_slice(&window[..=pos]);
                self.reader.consume(pos + 1);
                break false;
            }

            if room == 0 {
                break true;
            }

            let take = window.len().min(room);
            self.buf.extend_from_slice(&window[..take]);
            self.reader.consume(take);
        };

        let record = Record::from_line(&self.buf);

        if split {
            if !self.oversized {
                tracing::warn!(
                    max_record_size = self.max_record_size,
                    "Record exceeds maximum size, splitting"
                );
                self.oversized = true;
            }
        } else if self.oversized {
            self.oversized = false;
            self.buf.clear();
            self.buf.shrink_to(INITIAL_CAPACITY);
        }

        Ok(Some(record))
    }
}
