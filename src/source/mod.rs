//! Record source
//!
//! The source side of the relay: a named pipe scanned for newline-delimited
//! records, reopened whenever its writer goes away, and a reader loop that
//! hands every record to the subscriber registry.
//!
//! - `record`: the `Record` type and line-terminator trimming
//! - `scanner`: line scanning over any buffered async reader
//! - `pipe`: the named-pipe source with transparent reopen
//! - `reader`: the read-and-dispatch loop

pub mod pipe;
pub mod reader;
pub mod record;
pub mod scanner;

pub use pipe::PipeSource;
pub use reader::SourceReader;
pub use record::Record;
pub use scanner::RecordScanner;
