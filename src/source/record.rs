//! Source records

use bytes::Bytes;

/// One line of input, without its line terminator
///
/// The contents are opaque bytes; nothing assumes UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    data: Bytes,
}

impl Record {
    /// Create a record from raw bytes
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Build a record from a scanned line, dropping `\n` and a preceding `\r`
    pub fn from_line(line: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(trim_line_end(line)))
    }

    /// Record contents
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the record is an empty line
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Strip one trailing `\n` and then one trailing `\r`
fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
